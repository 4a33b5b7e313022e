//! Static attribute payloads for hosts created through the core API

use serde::{Deserialize, Serialize};

/// One host created through the API per iteration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostTemplate {
    /// Object name; the iteration's generated token when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub check_command: String,
    pub address: String,
    pub display_name: String,
    /// Value of `vars.os`
    pub os: String,
}

impl Default for HostTemplate {
    fn default() -> Self {
        Self {
            name: None,
            check_command: "hostalive".to_string(),
            address: "10.211.55.14".to_string(),
            display_name: "icingaservice".to_string(),
            os: "Linux".to_string(),
        }
    }
}

impl HostTemplate {
    /// The generated-name host followed by the fixed `icinga2` host
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::default(),
            Self {
                name: Some("icinga2".to_string()),
                display_name: "newicingaservice".to_string(),
                os: "MacOS".to_string(),
                ..Self::default()
            },
        ]
    }

    /// Object name for this iteration
    pub fn object_name<'a>(&'a self, token: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(token)
    }
}
