//! The smoke loop
//!
//! One iteration is a fixed linear sequence:
//!
//! 1. generate a host token and write `<conf_dir>/<token>.conf`
//! 2. restart Icinga 2, wait `restart`
//! 3. remove the file, restart again, wait `reload`
//! 4. poll Icinga Web 2 for the token
//! 5. for each host template: create it, wait `check`, poll web then core
//! 6. delete every templated host, wait `cleanup`
//!
//! Waits are fixed; nothing is derived from observed state. Cancellation
//! interrupts both waits and in-flight requests. Transport and
//! filesystem errors abort the iteration immediately without cleaning up
//! hosts or files that were already created.

mod report;

pub use report::{IterationReport, RunSummary};

use crate::client::{CoreApiClient, WebApiClient};
use crate::conf_file::{remove_host_config, write_host_config};
use crate::config::{Config, DelayConfig, HostTemplate};
use crate::error::{Result, SmokeError};
use crate::token::generate_host_token;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Drives smoke iterations against one Icinga 2 / Icinga Web 2 pair
#[derive(Debug)]
pub struct SmokeRunner {
    core: CoreApiClient,
    web: WebApiClient,
    conf_dir: PathBuf,
    delays: DelayConfig,
    hosts: Vec<HostTemplate>,
    strict: bool,
    cancel: CancellationToken,
}

impl SmokeRunner {
    /// Runner with default delays and host templates
    pub fn new(core: CoreApiClient, web: WebApiClient, conf_dir: impl Into<PathBuf>) -> Self {
        Self {
            core,
            web,
            conf_dir: conf_dir.into(),
            delays: DelayConfig::default(),
            hosts: HostTemplate::defaults(),
            strict: false,
            cancel: CancellationToken::new(),
        }
    }

    /// Build clients and settings from a validated config
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Result<Self> {
        config.validate()?;

        let core = CoreApiClient::new(&config.expanded_core()?)?;
        let web = WebApiClient::new(&config.expanded_web()?)?;

        Ok(Self::new(core, web, config.expanded_conf_dir()?)
            .with_delays(config.delays)
            .with_hosts(config.hosts.clone())
            .strict(config.strict)
            .with_cancellation(cancel))
    }

    pub fn with_delays(mut self, delays: DelayConfig) -> Self {
        self.delays = delays;
        self
    }

    pub fn with_hosts(mut self, hosts: Vec<HostTemplate>) -> Self {
        self.hosts = hosts;
        self
    }

    /// End the run on the first iteration with soft failures
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run until `max_iterations` complete or the token is cancelled.
    ///
    /// Unrecoverable errors end the run. In strict mode an iteration with
    /// soft failures ends it with [`SmokeError::SoftFailure`].
    pub async fn run(&self, max_iterations: Option<u64>) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        loop {
            if max_iterations.is_some_and(|max| summary.iterations >= max) {
                break;
            }
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let iteration = summary.iterations + 1;
            match self.run_iteration(iteration).await {
                Ok(report) => {
                    summary.record(&report);
                    let failures = report.soft_failures();
                    for failure in &failures {
                        warn!("Iteration {}: {}", iteration, failure);
                    }
                    if self.strict && !failures.is_empty() {
                        return Err(SmokeError::SoftFailure {
                            iteration,
                            failures,
                        });
                    }
                }
                Err(SmokeError::Cancelled) => {
                    warn!(
                        "Iteration {} cancelled; hosts or config files it created may remain",
                        iteration
                    );
                    summary.cancelled = true;
                    break;
                }
                Err(e) => {
                    error!("Iteration {} aborted: {}", iteration, e);
                    return Err(e);
                }
            }
        }

        info!(
            "Smoke run finished after {} iteration(s): {} successful and {} failed mutation(s), {} soft failure(s)",
            summary.iterations,
            summary.successful_mutations,
            summary.failed_mutations,
            summary.soft_failures
        );
        Ok(summary)
    }

    /// Execute one iteration of the fixed sequence
    pub async fn run_iteration(&self, iteration: u64) -> Result<IterationReport> {
        let token = generate_host_token()?;
        info!("Starting iteration {} with host '{}'", iteration, token);

        let config_file = write_host_config(&self.conf_dir, &token)?;
        let mut report = IterationReport::new(iteration, token.clone(), config_file.clone());

        report
            .mutations
            .push(self.interruptible(self.core.restart_process()).await?);
        self.settle(
            self.delays.restart(),
            "Waiting while Icinga 2 process is restarting",
            &mut report,
        )
        .await?;

        remove_host_config(&config_file)?;
        report
            .mutations
            .push(self.interruptible(self.core.restart_process()).await?);
        self.settle(
            self.delays.reload(),
            "Waiting while Icinga 2 process is restarting",
            &mut report,
        )
        .await?;

        report.after_reload = Some(self.interruptible(self.web.query_host(&token)).await?);

        for template in &self.hosts {
            let name = template.object_name(&token);
            report
                .mutations
                .push(self.interruptible(self.core.create_host(name, template)).await?);

            self.settle(
                self.delays.check(),
                &format!("Waiting until '{name}' object of type Host is checked"),
                &mut report,
            )
            .await?;

            report
                .after_create
                .push(self.interruptible(self.web.query_host(name)).await?);
            report
                .after_create
                .push(self.interruptible(self.core.query_host(name)).await?);
        }

        for template in &self.hosts {
            let name = template.object_name(&token);
            report
                .mutations
                .push(self.interruptible(self.core.delete_host(name)).await?);
        }

        self.settle(
            self.delays.cleanup(),
            "Waiting until all deleted hosts are also removed from IDO",
            &mut report,
        )
        .await?;

        Ok(report)
    }

    /// Requests carry no timeout by default, so each one is raced against
    /// the cancellation token.
    async fn interruptible<T>(&self, request: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(SmokeError::Cancelled),
            result = request => result,
        }
    }

    async fn settle(
        &self,
        delay: Duration,
        reason: &str,
        report: &mut IterationReport,
    ) -> Result<()> {
        info!("{}", reason);
        tokio::select! {
            _ = self.cancel.cancelled() => Err(SmokeError::Cancelled),
            _ = tokio::time::sleep(delay) => {
                report.waited += delay;
                Ok(())
            }
        }
    }
}
