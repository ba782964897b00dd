use alertwatch_core::{ActiveAlert, AlertSource, FetchError};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::ClientError;
use crate::types::{ActiveAlertsResponse, AlertRecord};
use crate::Result;

pub const DEFAULT_BASE_URL: &str = "https://api.alerts.in.ua";

const ACTIVE_ALERTS_PATH: &str = "/v1/alerts/active.json";

// ─── AlertsClient ─────────────────────────────────────────────────────────

/// Bearer-token client for the alerts.in.ua REST API.
#[derive(Debug, Clone)]
pub struct AlertsClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl AlertsClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full list of currently active alert records.
    ///
    /// 401 and 403 map to [`ClientError::Unauthorized`]; every other
    /// non-success status is [`ClientError::Status`].
    pub async fn active_alerts(&self) -> Result<Vec<AlertRecord>> {
        let url = format!("{}{ACTIVE_ALERTS_PATH}", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::Unauthorized(status.as_u16()));
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ActiveAlertsResponse =
            serde_json::from_str(&body).map_err(|source| ClientError::Parse { body, source })?;
        debug!(alerts = parsed.alerts.len(), "fetched active alerts");
        Ok(parsed.alerts)
    }
}

#[async_trait]
impl AlertSource for AlertsClient {
    async fn fetch_active_alerts(&self) -> std::result::Result<Vec<ActiveAlert>, FetchError> {
        let records = self.active_alerts().await?;
        let alerts = records
            .iter()
            .map(ActiveAlert::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(alerts)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    async fn serve(status: usize, body: &str) -> (mockito::ServerGuard, mockito::Mock) {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", ACTIVE_ALERTS_PATH)
            .match_header("authorization", "Bearer secret")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        (server, mock)
    }

    #[tokio::test]
    async fn fetches_and_converts_active_alerts() {
        let (server, mock) = serve(
            200,
            r#"{"alerts": [{"location_uid": "34"}, {"location_uid": "14", "alert_type": "air_raid"}]}"#,
        )
        .await;
        let client = AlertsClient::with_base_url("secret", server.url());

        let alerts = client.fetch_active_alerts().await.unwrap();
        assert_eq!(alerts, vec![ActiveAlert::new(34), ActiveAlert::new(14)]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authorization_error() {
        let (server, _mock) = serve(401, r#"{"message": "Unauthorized"}"#).await;
        let client = AlertsClient::with_base_url("secret", server.url());

        let err = client.fetch_active_alerts().await.unwrap_err();
        assert!(err.is_authorization(), "got {err:?}");
    }

    #[tokio::test]
    async fn forbidden_maps_to_authorization_error() {
        let (server, _mock) = serve(403, "").await;
        let client = AlertsClient::with_base_url("secret", server.url());
        assert!(matches!(
            client.active_alerts().await,
            Err(ClientError::Unauthorized(403))
        ));
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let (server, _mock) = serve(502, "bad gateway").await;
        let client = AlertsClient::with_base_url("secret", server.url());

        let err = client.fetch_active_alerts().await.unwrap_err();
        assert!(matches!(err, FetchError::Transient(msg) if msg.contains("502")));
    }

    #[tokio::test]
    async fn malformed_body_is_transient() {
        let (server, _mock) = serve(200, "<html>").await;
        let client = AlertsClient::with_base_url("secret", server.url());

        assert!(matches!(
            client.active_alerts().await,
            Err(ClientError::Parse { .. })
        ));
        let err = client.fetch_active_alerts().await.unwrap_err();
        assert!(!err.is_authorization());
    }

    #[tokio::test]
    async fn bad_location_uid_is_transient() {
        let (server, _mock) = serve(200, r#"{"alerts": [{"location_uid": "n/a"}]}"#).await;
        let client = AlertsClient::with_base_url("secret", server.url());

        let err = client.fetch_active_alerts().await.unwrap_err();
        assert!(matches!(err, FetchError::Transient(msg) if msg.contains("n/a")));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = AlertsClient::with_base_url("t", "http://localhost:9/");
        assert_eq!(client.base_url(), "http://localhost:9");
    }
}
