//! Icinga 2 core REST API client

use super::{
    authorize, base_url, build_http_client, finish_mutation, read_presence, send, ApiKind,
    HostAttrs, MutationKind, MutationOutcome, Observation,
};
use crate::config::{CoreApiConfig, HostTemplate};
use crate::credentials::Credentials;
use crate::error::{Result, SmokeError};
use std::time::Duration;
use tracing::{debug, info};

/// Client for `/v1/actions` and `/v1/objects/hosts`
#[derive(Debug, Clone)]
pub struct CoreApiClient {
    http_client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl CoreApiClient {
    /// Build from config. Certificate verification is disabled for TLS
    /// endpoints since Icinga 2 ships a self-signed CA.
    pub fn new(config: &CoreApiConfig) -> Result<Self> {
        let credentials = Credentials::parse("Icinga 2", &config.auth)?;
        let http_client = build_http_client(true, config.timeout_secs.map(Duration::from_secs))?;

        Ok(Self {
            http_client,
            base_url: base_url(&config.host, config.tls)?,
            credentials,
        })
    }

    /// Create a client with a custom HTTP client
    pub fn with_client(
        base_url: impl Into<String>,
        credentials: Credentials,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `/v1/actions/restart-process` with an empty body
    pub async fn restart_process(&self) -> Result<MutationOutcome> {
        let url = format!("{}/v1/actions/restart-process", self.base_url);
        info!("Sending API request to restart Icinga 2 process");

        let request = authorize(self.http_client.post(&url), &self.credentials).body("");
        let response = send(request, "restart-process").await?;
        Ok(finish_mutation(response, MutationKind::Restart, "restart-process").await)
    }

    /// PUT `/v1/objects/hosts/<name>` with the template's attributes
    pub async fn create_host(&self, name: &str, template: &HostTemplate) -> Result<MutationOutcome> {
        let url = format!("{}/v1/objects/hosts/{}", self.base_url, name);
        let body = serde_json::to_vec(&HostAttrs::from(template)).map_err(|e| {
            SmokeError::HttpClient {
                message: format!("Failed to encode host '{name}': {e}"),
            }
        })?;
        debug!("Creating host '{}' via {}", name, url);

        let request = authorize(self.http_client.put(&url), &self.credentials).body(body);
        let response = send(request, "create host").await?;
        Ok(finish_mutation(response, MutationKind::Create, name).await)
    }

    /// GET `/v1/objects/hosts/<name>?pretty=1`
    pub async fn query_host(&self, name: &str) -> Result<Observation> {
        let url = format!("{}/v1/objects/hosts/{}", self.base_url, name);

        let request = authorize(self.http_client.get(&url), &self.credentials)
            .query(&[("pretty", "1")]);
        let response = send(request, "query host").await?;
        read_presence(response, ApiKind::Core, name, "query host").await
    }

    /// DELETE `/v1/objects/hosts/<name>?cascade=1`
    pub async fn delete_host(&self, name: &str) -> Result<MutationOutcome> {
        let url = format!("{}/v1/objects/hosts/{}", self.base_url, name);

        let request = authorize(self.http_client.delete(&url), &self.credentials)
            .query(&[("cascade", "1")]);
        let response = send(request, "delete host").await?;
        Ok(finish_mutation(response, MutationKind::Delete, name).await)
    }
}
