//! HTTP clients for the Icinga 2 core API and Icinga Web 2
//!
//! Every request carries HTTP Basic auth plus
//! `Accept: application/json` and
//! `Content-Type: application/x-www-form-urlencoded`, including the JSON PUT
//! body, which Icinga 2 accepts regardless of the declared content type.
//!
//! Transport failures are returned as [`SmokeError::Transport`]. HTTP status
//! codes are never errors: mutations return a [`MutationOutcome`] and polls
//! an [`Observation`].

mod core_api;
mod types;
mod web_api;

pub use core_api::CoreApiClient;
pub use types::{
    ApiKind, HostAttributes, HostAttrs, HostRecord, HostVars, MutationKind, MutationOutcome,
    Observation, Presence,
};
pub use web_api::WebApiClient;

use crate::credentials::Credentials;
use crate::error::{Result, SmokeError};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};
use std::time::Duration;
use tracing::{debug, info, warn};

pub(crate) const ACCEPT_JSON: &str = "application/json";
pub(crate) const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Build a reqwest client. No timeout is applied unless one is given.
pub(crate) fn build_http_client(
    accept_invalid_certs: bool,
    timeout: Option<Duration>,
) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(accept_invalid_certs);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().map_err(|e| SmokeError::HttpClient {
        message: format!("Failed to build HTTP client: {e}"),
    })
}

/// `scheme://host:port` without a trailing slash, validated by `url`.
pub(crate) fn base_url(host: &str, tls: bool) -> Result<String> {
    let scheme = if tls { "https" } else { "http" };
    let raw = format!("{scheme}://{host}");

    let parsed = url::Url::parse(&raw).map_err(|e| SmokeError::HttpClient {
        message: format!("Invalid endpoint '{host}': {e}"),
    })?;
    if parsed.host_str().is_none() || parsed.path() != "/" {
        return Err(SmokeError::HttpClient {
            message: format!("Invalid endpoint '{host}': expected host:port"),
        });
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Attach credentials and the fixed headers
pub(crate) fn authorize(request: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
    request
        .basic_auth(&credentials.username, Some(&credentials.password))
        .header(ACCEPT, ACCEPT_JSON)
        .header(CONTENT_TYPE, FORM_URLENCODED)
}

/// Send, mapping transport failures to [`SmokeError::Transport`]
pub(crate) async fn send(request: RequestBuilder, operation: &str) -> Result<Response> {
    request.send().await.map_err(|source| SmokeError::Transport {
        operation: operation.to_string(),
        source,
    })
}

/// Drain the body of a mutation response and log its outcome
pub(crate) async fn finish_mutation(
    response: Response,
    kind: MutationKind,
    object: &str,
) -> MutationOutcome {
    let outcome = MutationOutcome {
        kind,
        object: object.to_string(),
        status: response.status(),
    };

    // Body content is irrelevant; reading it lets the connection be reused.
    let _ = response.bytes().await;

    match (kind, outcome.succeeded()) {
        (MutationKind::Restart, true) => info!("Icinga 2 process restart accepted"),
        (MutationKind::Restart, false) => warn!(
            "Failed to restart Icinga 2 process: status {}",
            outcome.status
        ),
        (MutationKind::Create, true) => info!(
            "Host '{}' object of type Host successfully created via API",
            object
        ),
        (MutationKind::Create, false) => warn!(
            "Failed to create '{}' object of type Host: status {}",
            object, outcome.status
        ),
        (MutationKind::Delete, true) => {
            info!("Host '{}' object of type Host successfully deleted", object)
        }
        (MutationKind::Delete, false) => warn!(
            "Failed to delete '{}' object of type Host: status {}",
            object, outcome.status
        ),
    }

    outcome
}

/// Decode a query response into a fresh [`HostRecord`] and log presence
pub(crate) async fn read_presence(
    response: Response,
    api: ApiKind,
    object: &str,
    operation: &str,
) -> Result<Observation> {
    let status = response.status();
    let body = response.bytes().await.map_err(|source| SmokeError::Transport {
        operation: operation.to_string(),
        source,
    })?;

    let record = match serde_json::from_slice::<HostRecord>(&body) {
        Ok(record) => record,
        Err(e) => {
            debug!(
                "Undecodable {} response for '{}' (status {}): {}",
                api, object, status, e
            );
            HostRecord::default()
        }
    };

    let presence = Presence::from(record);
    match &presence {
        Presence::Found(host_name) => {
            info!("Host '{}' object can be found in {}", host_name, api)
        }
        Presence::Absent => info!("Host '{}' object doesn't exist in {}", object, api),
    }

    Ok(Observation {
        api,
        object: object.to_string(),
        presence,
    })
}
