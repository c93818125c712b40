//! Client configuration and sync targets.

use serde::{Deserialize, Serialize};

/// Default debounce window for autosave, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Identifies one slot in the remote key-value namespace.
///
/// Immutable for the lifetime of a [`crate::SyncedResource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncTarget {
    /// Store (namespace) name.
    pub store: String,
    /// Key within the store.
    pub key: String,
}

impl SyncTarget {
    /// Creates a target for `(store, key)`.
    pub fn new(store: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            store: store.into(),
            key: key.into(),
        }
    }
}

/// Sync behavior options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Arm a debounced autosave on every `update`.
    pub auto_sync: bool,
    /// Coalescing window for autosave, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            auto_sync: false,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// Configuration for the blob API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the blob proxy (e.g. `http://localhost:8888`).
    pub api_base: String,
    /// Value for the `Origin` request header. The proxy is
    /// origin-gated; browsers add this header implicitly, a native
    /// client has to send it itself.
    pub origin: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8888".to_string(),
            origin: None,
        }
    }
}
