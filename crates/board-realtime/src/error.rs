//! Realtime error types.
//!
//! None of these reach socket callers: transport problems surface as a
//! `Disconnected` transition instead.

use thiserror::Error;

/// Realtime error type.
#[derive(Error, Debug)]
pub enum RealtimeError {
    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The handshake request could not be built
    #[error("Handshake error: {0}")]
    Handshake(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using RealtimeError.
pub type RealtimeResult<T> = Result<T, RealtimeError>;
