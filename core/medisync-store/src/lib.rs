//! Namespace-scoped JSON blob storage for MediSync.
//!
//! A blob store is a flat key-value namespace: each value is an
//! arbitrary JSON document addressed by a `(store, key)` pair. The
//! [`BlobStore`] trait is the seam between the HTTP proxy (or the
//! client-side fallback chain) and whatever actually holds the bytes;
//! which implementation backs it is decided once, at composition time.
//!
//! Two implementations ship with this crate:
//!
//! - [`MemoryBlobStore`] — `HashMap` behind a `RwLock`, for tests and
//!   local development.
//! - [`LocalBlobStore`] — one directory per store, one JSON file per
//!   key, for durable single-node deployments and as the client's
//!   offline fallback.

mod error;
mod local;
mod memory;

pub use error::{StoreError, StoreResult};
pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use async_trait::async_trait;
use serde_json::Value;

/// Abstract JSON blob store interface.
///
/// `delete` is idempotent: removing an absent key succeeds.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetches the value stored under `(store, key)`, or `None` if absent.
    async fn get(&self, store: &str, key: &str) -> StoreResult<Option<Value>>;

    /// Stores `value` verbatim under `(store, key)`, replacing any
    /// previous value.
    async fn set(&self, store: &str, key: &str, value: Value) -> StoreResult<()>;

    /// Removes the value under `(store, key)` if present.
    async fn delete(&self, store: &str, key: &str) -> StoreResult<()>;
}
