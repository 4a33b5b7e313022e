//! Error types for the smoke harness
//!
//! Only unrecoverable conditions are errors. Non-200 mutation statuses and
//! missing hosts are recorded in the iteration report instead.

use std::path::PathBuf;
use thiserror::Error;

/// Unrecoverable smoke-run error
#[derive(Debug, Error)]
pub enum SmokeError {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] icinga_smoke_common::ConfigurationError),

    /// A `user:pass` credential string is malformed
    #[error("Invalid credentials for {target}: {reason}")]
    Credentials { target: String, reason: String },

    /// The OS random source failed
    #[error("Failed to generate random host name: {0}")]
    Token(#[from] rand::Error),

    /// conf.d file could not be written or removed
    #[error("Config file error at {}: {source}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP client could not be built or a URL is invalid
    #[error("HTTP client error: {message}")]
    HttpClient { message: String },

    /// A request failed at the transport level
    #[error("{operation} request failed: {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    /// The run was cancelled during an iteration
    #[error("Smoke run cancelled")]
    Cancelled,

    /// Strict mode turned soft failures into an error
    #[error("Iteration {iteration} recorded soft failures: {}", failures.join("; "))]
    SoftFailure {
        iteration: u64,
        failures: Vec<String>,
    },
}

impl SmokeError {
    /// Whether the error came from the remote side rather than local setup
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SmokeError::Transport { .. } | SmokeError::SoftFailure { .. }
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SmokeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_failure_message_lists_failures() {
        let err = SmokeError::SoftFailure {
            iteration: 2,
            failures: vec!["create 'a' returned 500".into(), "'b' absent in Icinga 2".into()],
        };
        assert_eq!(
            err.to_string(),
            "Iteration 2 recorded soft failures: create 'a' returned 500; 'b' absent in Icinga 2"
        );
        assert!(err.is_remote());
    }

    #[test]
    fn test_config_file_error_includes_path() {
        let err = SmokeError::ConfigFile {
            path: PathBuf::from("/etc/icinga2/conf.d/ABC.conf"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("/etc/icinga2/conf.d/ABC.conf"));
        assert!(!err.is_remote());
    }
}
