//! What one iteration observed, and totals across a run

use crate::client::{MutationKind, MutationOutcome, Observation};
use std::path::PathBuf;
use std::time::Duration;

/// Everything recorded during one iteration
#[derive(Debug, Clone)]
pub struct IterationReport {
    /// 1-based iteration number
    pub iteration: u64,
    /// Generated host name
    pub token: String,
    /// conf.d file written and removed during the iteration
    pub config_file: PathBuf,
    /// Restarts, creations and deletions, in call order
    pub mutations: Vec<MutationOutcome>,
    /// Web poll of the token after the conf.d file was removed
    pub after_reload: Option<Observation>,
    /// Web and core polls after each API creation, in call order
    pub after_create: Vec<Observation>,
    /// Sum of settle waits
    pub waited: Duration,
}

impl IterationReport {
    pub(crate) fn new(iteration: u64, token: String, config_file: PathBuf) -> Self {
        Self {
            iteration,
            token,
            config_file,
            mutations: Vec::new(),
            after_reload: None,
            after_create: Vec::new(),
            waited: Duration::ZERO,
        }
    }

    fn of_kind(&self, kind: MutationKind) -> impl Iterator<Item = &MutationOutcome> {
        self.mutations.iter().filter(move |m| m.kind == kind)
    }

    pub fn restarts(&self) -> impl Iterator<Item = &MutationOutcome> {
        self.of_kind(MutationKind::Restart)
    }

    pub fn created(&self) -> impl Iterator<Item = &MutationOutcome> {
        self.of_kind(MutationKind::Create)
    }

    pub fn deleted(&self) -> impl Iterator<Item = &MutationOutcome> {
        self.of_kind(MutationKind::Delete)
    }

    /// Human-readable soft failures: non-200 mutations, hosts missing after a
    /// successful creation, and the conf.d host still visible after removal.
    ///
    /// A host not yet propagated and a host that never existed look the same
    /// to both query interfaces, so a missing host is only a hint.
    pub fn soft_failures(&self) -> Vec<String> {
        let mut failures: Vec<String> = self
            .mutations
            .iter()
            .filter(|m| !m.succeeded())
            .map(|m| format!("{} '{}' returned {}", m.kind, m.object, m.status))
            .collect();

        if let Some(observation) = &self.after_reload {
            if observation.presence.is_found() {
                failures.push(format!(
                    "'{}' still present in {} after its config file was removed",
                    observation.object, observation.api
                ));
            }
        }

        for observation in &self.after_create {
            let created = self
                .created()
                .any(|m| m.object == observation.object && m.succeeded());
            if created && !observation.presence.is_found() {
                failures.push(format!(
                    "'{}' absent in {} after creation",
                    observation.object, observation.api
                ));
            }
        }

        failures
    }
}

/// Totals across a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Iterations that ran to completion
    pub iterations: u64,
    pub successful_mutations: usize,
    pub failed_mutations: usize,
    pub soft_failures: usize,
    /// The run stopped on its cancellation token
    pub cancelled: bool,
}

impl RunSummary {
    pub(crate) fn record(&mut self, report: &IterationReport) {
        self.iterations += 1;
        let ok = report.mutations.iter().filter(|m| m.succeeded()).count();
        self.successful_mutations += ok;
        self.failed_mutations += report.mutations.len() - ok;
        self.soft_failures += report.soft_failures().len();
    }
}
