use alertwatch_core::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API token rejected (HTTP {0})")]
    Unauthorized(u16),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse active alerts: {source}\n  body: {body}")]
    Parse {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid location_uid: {0}")]
    InvalidLocationUid(String),
}

impl From<ClientError> for FetchError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized(_) => FetchError::Authorization(err.to_string()),
            other => FetchError::Transient(other.to_string()),
        }
    }
}
