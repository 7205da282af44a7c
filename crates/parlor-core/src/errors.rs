//! Relay error types.

use thiserror::Error;

/// Errors raised while moving a [`ChatMessage`](crate::ChatMessage) between
/// the wire and the broadcast loop.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The connection was already closed locally.
    #[error("connection closed")]
    Closed,
    /// The underlying transport failed to send or close.
    #[error("transport error: {0}")]
    Transport(String),
    /// A message could not be serialized to JSON.
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
    /// An inbound frame was not a valid message (bad JSON, unknown `type`).
    #[error("malformed message: {0}")]
    Decode(#[source] serde_json::Error),
}

impl RelayError {
    /// Wrap any displayable transport failure.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
