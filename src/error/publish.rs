use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Serialization error during {context}: {source}")]
    Serialize {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Observer write failed: {source}")]
    Write {
        #[source]
        source: Box<tungstenite::Error>,
    },
}

impl From<tungstenite::Error> for PublishError {
    fn from(source: tungstenite::Error) -> Self {
        PublishError::Write {
            source: Box::new(source),
        }
    }
}
