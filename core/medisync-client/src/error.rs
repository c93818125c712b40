//! Error types for the client layer.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur talking to the blob proxy.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connection refused, DNS, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The proxy answered with a non-success status. `message` is the
    /// server-supplied error string when the body carried one.
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The local fallback store failed.
    #[error("local store error: {0}")]
    LocalStore(#[from] medisync_store::StoreError),
}
