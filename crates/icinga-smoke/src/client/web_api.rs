//! Icinga Web 2 monitoring list client

use super::{authorize, base_url, build_http_client, read_presence, send, ApiKind, Observation};
use crate::config::WebApiConfig;
use crate::credentials::Credentials;
use crate::error::Result;
use std::time::Duration;

/// Queries `/icingaweb2/monitoring/list/hosts`
#[derive(Debug, Clone)]
pub struct WebApiClient {
    http_client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl WebApiClient {
    pub fn new(config: &WebApiConfig) -> Result<Self> {
        let credentials = Credentials::parse("Icinga Web 2", &config.auth)?;
        let http_client = build_http_client(false, config.timeout_secs.map(Duration::from_secs))?;

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

    /// GET `list/hosts?host=<name>&modifyFilter=1`
    pub async fn query_host(&self, name: &str) -> Result<Observation> {
        let url = format!("{}/icingaweb2/monitoring/list/hosts", self.base_url);

        let request = authorize(self.http_client.get(&url), &self.credentials)
            .query(&[("host", name), ("modifyFilter", "1")]);
        let response = send(request, "list hosts").await?;
        read_presence(response, ApiKind::Web, name, "list hosts").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Presence;
    use crate::error::SmokeError;
    use serde_json::json;
    use wiremock::matchers::{basic_auth, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> WebApiClient {
        WebApiClient::with_client(
            server.uri(),
            Credentials::parse("Icinga Web 2", "icingaadmin:icinga").unwrap(),
            reqwest::Client::new(),
        )
    }

    #[tokio::test]
    async fn test_query_host_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/icingaweb2/monitoring/list/hosts"))
            .and(query_param("host", "ABC123"))
            .and(query_param("modifyFilter", "1"))
            .and(basic_auth("icingaadmin", "icinga"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"host_name": "ABC123"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let observation = client_for(&mock_server).query_host("ABC123").await.unwrap();
        assert_eq!(observation.api, ApiKind::Web);
        assert_eq!(observation.object, "ABC123");
        assert_eq!(observation.presence, Presence::Found("ABC123".to_string()));
    }

    #[tokio::test]
    async fn test_query_host_empty_name() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/icingaweb2/monitoring/list/hosts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"host_name": ""})))
            .mount(&mock_server)
            .await;

        let observation = client_for(&mock_server).query_host("ABC123").await.unwrap();
        assert_eq!(observation.presence, Presence::Absent);
    }

    #[tokio::test]
    async fn test_html_login_page_is_absent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/icingaweb2/monitoring/list/hosts"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body>Login</body></html>"),
            )
            .mount(&mock_server)
            .await;

        let observation = client_for(&mock_server).query_host("ABC123").await.unwrap();
        assert!(!observation.presence.is_found());
    }

    #[test]
    fn test_new_from_config() {
        let client = WebApiClient::new(&WebApiConfig::default()).unwrap();
        assert_eq!(client.base_url(), "http://10.211.55.14:80");

        let bad = WebApiConfig {
            auth: "icingaadmin".to_string(),
            ..WebApiConfig::default()
        };
        assert!(matches!(
            WebApiClient::new(&bad).unwrap_err(),
            SmokeError::Credentials { .. }
        ));
    }
}
