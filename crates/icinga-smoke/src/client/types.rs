//! Request and response types shared by both API clients

use crate::config::HostTemplate;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which query interface an observation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiKind {
    /// Icinga 2 core REST API
    Core,
    /// Icinga Web 2 front-end
    Web,
}

impl fmt::Display for ApiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiKind::Core => f.write_str("Icinga 2"),
            ApiKind::Web => f.write_str("Icinga Web 2"),
        }
    }
}

/// The one attribute read from query responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostRecord {
    #[serde(default)]
    pub host_name: String,
}

/// Whether a queried host was reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    /// Reported under this host name
    Found(String),
    Absent,
}

impl Presence {
    pub fn is_found(&self) -> bool {
        matches!(self, Presence::Found(_))
    }
}

impl From<HostRecord> for Presence {
    fn from(record: HostRecord) -> Self {
        if record.host_name.is_empty() {
            Presence::Absent
        } else {
            Presence::Found(record.host_name)
        }
    }
}

/// Result of one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub api: ApiKind,
    /// Name that was queried
    pub object: String,
    pub presence: Presence,
}

/// State-changing calls against the core API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Restart,
    Create,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationKind::Restart => f.write_str("restart"),
            MutationKind::Create => f.write_str("create"),
            MutationKind::Delete => f.write_str("delete"),
        }
    }
}

/// Status of one mutation; only 200 counts as success
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub kind: MutationKind,
    pub object: String,
    pub status: StatusCode,
}

impl MutationOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == StatusCode::OK
    }
}

/// PUT body for host creation: `{"attrs": {...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostAttrs {
    pub attrs: HostAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostAttributes {
    pub check_command: String,
    pub address: String,
    pub display_name: String,
    pub vars: HostVars,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostVars {
    pub os: String,
}

impl From<&HostTemplate> for HostAttrs {
    fn from(template: &HostTemplate) -> Self {
        Self {
            attrs: HostAttributes {
                check_command: template.check_command.clone(),
                address: template.address.clone(),
                display_name: template.display_name.clone(),
                vars: HostVars {
                    os: template.os.clone(),
                },
            },
        }
    }
}
