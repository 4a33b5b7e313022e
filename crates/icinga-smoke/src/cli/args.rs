use crate::config::Config;
use crate::error::SmokeError;
use crate::workflow::SmokeRunner;
use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use icinga_smoke_common::logging::LogFormat;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Icinga smoke test - exercises conf.d reloads and the host REST API
#[derive(Parser, Debug)]
#[command(
    name = "icinga-smoke",
    version,
    about = "Smoke test for the Icinga 2 conf.d reload path and REST API",
    long_about = "Repeatedly writes a host definition into the Icinga 2 conf.d directory, \
restarts Icinga 2, removes the file, restarts again, creates and deletes hosts through \
the REST API, and polls Icinga 2 and Icinga Web 2 for each host after every change.

ICINGA_SMOKE_* environment variables override the config file, and flags override both."
)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Icinga 2 API host and port [default: localhost:5665]
    #[arg(long = "i2Host", value_name = "HOST:PORT")]
    pub i2_host: Option<String>,

    /// Icinga 2 API authentication [default: root:icinga]
    #[arg(long = "i2Auth", value_name = "USER:PASS")]
    pub i2_auth: Option<String>,

    /// Icinga Web 2 host and port [default: 10.211.55.14:80]
    #[arg(long = "iw2Host", value_name = "HOST:PORT")]
    pub iw2_host: Option<String>,

    /// Icinga Web 2 authentication [default: icingaadmin:icinga]
    #[arg(long = "iw2Auth", value_name = "USER:PASS")]
    pub iw2_auth: Option<String>,

    /// Icinga 2 conf.d absolute path [default: /etc/icinga2/conf.d]
    #[arg(long = "cnfdPath", value_name = "DIR")]
    pub cnfd_path: Option<PathBuf>,

    /// Stop after this many iterations instead of looping forever
    #[arg(long, value_name = "N")]
    pub iterations: Option<u64>,

    /// Fail on non-200 mutations and hosts missing after creation
    #[arg(long)]
    pub strict: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    pub gen_config: bool,

    /// Log output format (compact or json)
    #[arg(long, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,
}

impl Args {
    /// Apply flags on top of file and environment configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.i2_host {
            config.core.host = host.clone();
        }
        if let Some(auth) = &self.i2_auth {
            config.core.auth = auth.clone();
        }
        if let Some(host) = &self.iw2_host {
            config.web.host = host.clone();
        }
        if let Some(auth) = &self.iw2_auth {
            config.web.auth = auth.clone();
        }
        if let Some(path) = &self.cnfd_path {
            config.conf_dir = path.clone();
        }
        if self.iterations.is_some() {
            config.iterations = self.iterations;
        }
        if self.strict {
            config.strict = true;
        }
    }

    /// Execute the smoke run
    pub async fn run(self) -> Result<()> {
        if self.gen_config {
            println!("{}", Config::generate_example()?);
            return Ok(());
        }

        let mut config =
            Config::load(self.config.as_deref()).context("Failed to load configuration")?;
        self.apply_overrides(&mut config);

        let cancel = CancellationToken::new();
        let runner = SmokeRunner::from_config(&config, cancel.clone())?;

        info!(
            "Smoke testing Icinga 2 at {} and Icinga Web 2 at {} using {}",
            config.core.host,
            config.web.host,
            config.conf_dir.display()
        );

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, stopping smoke run");
                    cancel.cancel();
                }
                Err(e) => warn!("Failed to listen for interrupt: {}", e),
            }
        });

        runner
            .run(config.iterations)
            .await
            .map_err(|e| {
                let context = failure_context(&e);
                anyhow::Error::new(e).context(context)
            })?;
        Ok(())
    }
}

/// Tell Icinga-side failures apart from problems on this machine
fn failure_context(err: &SmokeError) -> &'static str {
    if err.is_remote() {
        "Icinga did not behave as expected"
    } else {
        "Smoke run failed before reaching Icinga"
    }
}
