//! Layered configuration loading
//!
//! Every binary layers its configuration the same way: serialized defaults,
//! then an optional TOML file, then prefixed environment variables (`__`
//! separates nested keys). Command-line overrides are applied by the caller
//! on top of the extracted value.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The layered sources could not be merged into the target type
    #[error("Failed to parse configuration: {details}")]
    ParseError { details: String },

    /// An explicitly requested file does not exist
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// A value parsed but is not usable
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Loads a configuration type from defaults, a TOML file and the environment
pub trait ConfigLoader: Serialize + DeserializeOwned + Default {
    /// Environment prefix, e.g. `ICINGA_SMOKE_`
    const ENV_PREFIX: &'static str;

    /// Load with an optional file; a missing optional file is not an error.
    fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Self::extract(Self::figment()),
        }
    }

    /// Load with a file that must exist.
    fn load_from_file(path: &Path) -> Result<Self, ConfigurationError> {
        if !path.exists() {
            return Err(ConfigurationError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        debug!("Loading configuration from {}", path.display());
        let figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"));

        Self::extract(figment)
    }

    /// Defaults merged with the environment only.
    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigurationError> {
        figment.extract().map_err(|e| ConfigurationError::ParseError {
            details: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        retries: u32,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                name: "default".to_string(),
                retries: 3,
            }
        }
    }

    impl ConfigLoader for Sample {
        const ENV_PREFIX: &'static str = "ICINGA_SMOKE_COMMON_TEST_";
    }

    #[test]
    fn test_defaults_without_file() {
        let sample = Sample::load(None).unwrap();
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "retries = 7").unwrap();

        let sample = Sample::load(Some(file.path())).unwrap();
        assert_eq!(sample.name, "default");
        assert_eq!(sample.retries, 7);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Sample::load(Some(Path::new("/nonexistent/icinga-smoke.toml")));
        assert!(matches!(
            result.unwrap_err(),
            ConfigurationError::FileNotFound { .. }
        ));
    }

    #[test]
    fn test_type_mismatch_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "retries = \"many\"").unwrap();

        let result = Sample::load(Some(file.path()));
        assert!(matches!(
            result.unwrap_err(),
            ConfigurationError::ParseError { .. }
        ));
    }
}
