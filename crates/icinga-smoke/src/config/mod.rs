//! Configuration for the smoke harness
//!
//! Sources, lowest priority first: built-in defaults, optional TOML file,
//! `ICINGA_SMOKE_*` environment variables, command-line flags.

mod hosts;

pub use hosts::HostTemplate;

use crate::credentials::Credentials;
use crate::error::Result;
use icinga_smoke_common::{ConfigLoader, ConfigurationError as ConfigError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Icinga 2 core API endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreApiConfig {
    /// `host:port` of the REST API
    pub host: String,

    /// `user:pass` for Basic auth
    pub auth: String,

    /// Use HTTPS (certificate verification is disabled)
    pub tls: bool,

    /// Optional request timeout in seconds; none by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for CoreApiConfig {
    fn default() -> Self {
        Self {
            host: "localhost:5665".to_string(),
            auth: "root:icinga".to_string(),
            tls: true,
            timeout_secs: None,
        }
    }
}

/// Icinga Web 2 endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebApiConfig {
    /// `host:port` of the web front-end
    pub host: String,

    /// `user:pass` for Basic auth
    pub auth: String,

    /// Use HTTPS
    pub tls: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for WebApiConfig {
    fn default() -> Self {
        Self {
            host: "10.211.55.14:80".to_string(),
            auth: "icingaadmin:icinga".to_string(),
            tls: false,
            timeout_secs: None,
        }
    }
}

/// Fixed waits that give Icinga 2 time to reload and schedule checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayConfig {
    /// After the restart that picks up the new conf.d file
    pub restart_ms: u64,

    /// After the restart that drops the conf.d file again
    pub reload_ms: u64,

    /// After each API host creation, before polling
    pub check_ms: u64,

    /// After deleting the API hosts, before the next iteration
    pub cleanup_ms: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            restart_ms: 30_000,
            reload_ms: 20_000,
            check_ms: 10_000,
            cleanup_ms: 30_000,
        }
    }
}

impl DelayConfig {
    pub fn restart(&self) -> Duration {
        Duration::from_millis(self.restart_ms)
    }

    pub fn reload(&self) -> Duration {
        Duration::from_millis(self.reload_ms)
    }

    pub fn check(&self) -> Duration {
        Duration::from_millis(self.check_ms)
    }

    pub fn cleanup(&self) -> Duration {
        Duration::from_millis(self.cleanup_ms)
    }

    /// Total wait of one iteration that creates `hosts` API hosts
    pub fn iteration_total(&self, hosts: usize) -> Duration {
        self.restart() + self.reload() + self.check() * hosts as u32 + self.cleanup()
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Icinga 2 conf.d directory; `~` and `$VAR` are expanded
    pub conf_dir: PathBuf,

    /// Treat non-200 mutations and hosts missing after creation as errors
    pub strict: bool,

    /// Stop after this many iterations; run forever when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u64>,

    /// Icinga 2 core API
    pub core: CoreApiConfig,

    /// Icinga Web 2
    pub web: WebApiConfig,

    /// Settle waits
    pub delays: DelayConfig,

    /// Hosts created through the API each iteration
    pub hosts: Vec<HostTemplate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            conf_dir: PathBuf::from("/etc/icinga2/conf.d"),
            strict: false,
            iterations: None,
            core: CoreApiConfig::default(),
            web: WebApiConfig::default(),
            delays: DelayConfig::default(),
            hosts: HostTemplate::defaults(),
        }
    }
}

impl ConfigLoader for Config {
    const ENV_PREFIX: &'static str = "ICINGA_SMOKE_";
}

impl Config {
    /// Load configuration from an optional file and the environment
    pub fn load(config_path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        <Config as ConfigLoader>::load(config_path)
    }

    /// Generate example configuration file
    pub fn generate_example() -> std::result::Result<String, ConfigError> {
        toml::to_string_pretty(&Self::default()).map_err(|e| ConfigError::ParseError {
            details: format!("Failed to serialize config: {e}"),
        })
    }

    pub fn core_credentials(&self) -> Result<Credentials> {
        Credentials::parse("Icinga 2", &self.core.auth)
    }

    pub fn web_credentials(&self) -> Result<Credentials> {
        Credentials::parse("Icinga Web 2", &self.web.auth)
    }

    /// conf.d path with `~` and environment variables expanded
    pub fn expanded_conf_dir(&self) -> std::result::Result<PathBuf, ConfigError> {
        let raw = self.conf_dir.to_string_lossy();
        shellexpand::full(&raw)
            .map(|expanded| PathBuf::from(expanded.into_owned()))
            .map_err(|e| ConfigError::InvalidValue {
                key: "conf_dir".to_string(),
                reason: e.to_string(),
            })
    }

    /// Core API endpoint with `$VAR` references in its host expanded
    pub fn expanded_core(&self) -> std::result::Result<CoreApiConfig, ConfigError> {
        Ok(CoreApiConfig {
            host: expand_host("core.host", &self.core.host)?,
            ..self.core.clone()
        })
    }

    /// Web endpoint with `$VAR` references in its host expanded
    pub fn expanded_web(&self) -> std::result::Result<WebApiConfig, ConfigError> {
        Ok(WebApiConfig {
            host: expand_host("web.host", &self.web.host)?,
            ..self.web.clone()
        })
    }

    /// Check values that parse but cannot drive a run
    pub fn validate(&self) -> Result<()> {
        self.core_credentials()?;
        self.web_credentials()?;

        if self.hosts.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "hosts".to_string(),
                reason: "at least one host template is required".to_string(),
            }
            .into());
        }

        let generated = self.hosts.iter().filter(|h| h.name.is_none()).count();
        if generated > 1 {
            return Err(ConfigError::InvalidValue {
                key: "hosts".to_string(),
                reason: "only one host template may use the generated name".to_string(),
            }
            .into());
        }

        if self.iterations == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "iterations".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

fn expand_host(key: &str, raw: &str) -> std::result::Result<String, ConfigError> {
    shellexpand::env(raw)
        .map(|expanded| expanded.into_owned())
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SmokeError;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.core.host, "localhost:5665");
        assert_eq!(config.core.auth, "root:icinga");
        assert!(config.core.tls);
        assert_eq!(config.web.host, "10.211.55.14:80");
        assert_eq!(config.web.auth, "icingaadmin:icinga");
        assert!(!config.web.tls);
        assert_eq!(config.conf_dir, PathBuf::from("/etc/icinga2/conf.d"));
        assert_eq!(config.hosts.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_iteration_waits_100_seconds() {
        let config = Config::default();
        assert_eq!(
            config.delays.iteration_total(config.hosts.len()),
            Duration::from_secs(100)
        );
    }

    #[test]
    fn test_example_round_trips() {
        let example = Config::generate_example().unwrap();
        let parsed: Config = toml::from_str(&example).unwrap();
        assert_eq!(parsed.core.host, "localhost:5665");
        assert_eq!(parsed.delays, DelayConfig::default());
        assert_eq!(parsed.hosts, HostTemplate::defaults());
    }

    #[test]
    fn test_file_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
conf_dir = "/tmp/conf.d"
strict = true

[core]
host = "icinga.example:5665"

[delays]
restart_ms = 5
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.core.host, "icinga.example:5665");
        assert_eq!(config.core.auth, "root:icinga");
        assert_eq!(config.conf_dir, PathBuf::from("/tmp/conf.d"));
        assert_eq!(config.delays.restart_ms, 5);
        assert_eq!(config.delays.reload_ms, 20_000);
        assert!(config.strict);
    }

    #[test]
    fn test_validate_rejects_bad_credentials() {
        let mut config = Config::default();
        config.web.auth = "icingaadmin".to_string();
        assert!(matches!(
            config.validate().unwrap_err(),
            SmokeError::Credentials { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_two_generated_names() {
        let mut config = Config::default();
        config.hosts = vec![HostTemplate::default(), HostTemplate::default()];
        assert!(matches!(
            config.validate().unwrap_err(),
            SmokeError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_iterations() {
        let config = Config {
            iterations: Some(0),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_conf_dir_expansion() {
        let config = Config {
            conf_dir: PathBuf::from("/srv/icinga/conf.d"),
            ..Config::default()
        };
        assert_eq!(
            config.expanded_conf_dir().unwrap(),
            PathBuf::from("/srv/icinga/conf.d")
        );

        let config = Config {
            conf_dir: PathBuf::from("$ICINGA_SMOKE_TEST_SURELY_UNSET_VAR/conf.d"),
            ..Config::default()
        };
        assert!(config.expanded_conf_dir().is_err());
    }

    #[test]
    fn test_endpoint_host_expansion() {
        std::env::set_var("ICINGA_SMOKE_TEST_I2_NODE", "icinga-master");
        std::env::set_var("ICINGA_SMOKE_TEST_IW2_PORT", "8080");

        let mut config = Config::default();
        config.core.host = "$ICINGA_SMOKE_TEST_I2_NODE:5665".to_string();
        config.web.host = "web.example:${ICINGA_SMOKE_TEST_IW2_PORT}".to_string();

        let core = config.expanded_core().unwrap();
        assert_eq!(core.host, "icinga-master:5665");
        assert_eq!(core.auth, "root:icinga");
        assert!(core.tls);
        assert_eq!(config.expanded_web().unwrap().host, "web.example:8080");

        config.web.host = "$ICINGA_SMOKE_TEST_SURELY_UNSET_HOST:80".to_string();
        assert!(matches!(
            config.expanded_web().unwrap_err(),
            ConfigError::InvalidValue { key, .. } if key == "web.host"
        ));
    }
}
