use thiserror::Error;
use tokio_tungstenite::tungstenite;

use super::{PublishError, ValidationError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("WebSocket handshake failed: {source}")]
    Handshake {
        #[source]
        source: Box<tungstenite::Error>,
    },
    #[error("Failed to read run config: {source}")]
    ReadConfig {
        #[source]
        source: Box<tungstenite::Error>,
    },
    #[error("Observer closed the connection before sending a run config.")]
    ClosedBeforeConfig,
    #[error("Run config frame was not valid UTF-8: {source}")]
    ConfigNotUtf8 {
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("Failed to decode run config: {source}")]
    DecodeConfig {
        #[source]
        source: serde_json::Error,
    },
    #[error("Rejected run config: {source}")]
    RejectedConfig {
        #[source]
        source: ValidationError,
    },
    #[error("Failed to build HTTP client: {source}")]
    BuildClient {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to send final result: {source}")]
    SendResult {
        #[source]
        source: PublishError,
    },
    #[error("Progress publisher task failed: {source}")]
    PublisherJoin {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl SessionError {
    /// True for failures that happen before a run starts, where no result is sent.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            SessionError::ReadConfig { .. }
                | SessionError::ClosedBeforeConfig
                | SessionError::ConfigNotUtf8 { .. }
                | SessionError::DecodeConfig { .. }
                | SessionError::RejectedConfig { .. }
        )
    }
}
