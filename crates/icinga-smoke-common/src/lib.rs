//! # Icinga Smoke Common
//!
//! Ambient plumbing shared by the smoke harness crates: logging setup and
//! the layered configuration loader.

pub mod config;
pub mod logging;

pub use config::{ConfigLoader, ConfigurationError};
