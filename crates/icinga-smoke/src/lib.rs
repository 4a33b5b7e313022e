//! # Icinga Smoke
//!
//! Smoke-test harness for an Icinga 2 / Icinga Web 2 installation. Each
//! iteration drops a host definition into `conf.d`, restarts Icinga 2,
//! removes it again, then creates and deletes hosts through the core REST
//! API while polling both query interfaces for every host.
//!
//! The harness observes rather than asserts: each iteration produces an
//! [`workflow::IterationReport`] and the caller decides whether soft
//! failures matter (see [`config::Config::strict`]).

pub mod cli;
pub mod client;
pub mod conf_file;
pub mod config;
pub mod credentials;
pub mod error;
pub mod token;
pub mod workflow;

pub use error::{Result, SmokeError};
pub use workflow::{IterationReport, RunSummary, SmokeRunner};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
