// Error types for the push channel

use thiserror::Error;

/// Connection-level failure; always handled by closing and reconnecting.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        TransportError(err.to_string())
    }
}

/// Everything that can go wrong between the wire and the state store.
/// None of these are fatal; the client surfaces them as status and carries on.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Connect, read or write failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Payload was not a JSON object of the expected shape.
    #[error("failed to parse message: {0}")]
    Parse(#[from] serde_json::Error),

    /// The far end sent `{"error": "..."}`.
    #[error("remote error: {0}")]
    Remote(String),
}
