//! Error types for blob storage.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in blob store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying storage failure (I/O, permissions).
    #[error("storage error: {0}")]
    Storage(String),

    /// Stored bytes were not valid JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
