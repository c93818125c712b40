//! Storage backends for synced resources.
//!
//! A [`ResourceBackend`] is one slot's worth of load/save/remove,
//! with the target baked in. Which backend a resource uses is a
//! construction-time strategy choice: remote-only, remote with local
//! fallback, or in-memory for tests.

use crate::api::BlobApiClient;
use crate::config::SyncTarget;
use crate::error::ClientResult;
use async_trait::async_trait;
use medisync_store::{BlobStore, LocalBlobStore};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// One remote slot's load/save/remove operations.
#[async_trait]
pub trait ResourceBackend: Send + Sync {
    /// Loads the current value, `None` if the slot is empty.
    async fn load(&self) -> ClientResult<Option<Value>>;

    /// Persists `value` to the slot.
    async fn save(&self, value: &Value) -> ClientResult<()>;

    /// Clears the slot.
    async fn remove(&self) -> ClientResult<()>;
}

/// Backend that talks to the blob proxy over HTTP.
pub struct RemoteBackend {
    api: BlobApiClient,
    target: SyncTarget,
}

impl RemoteBackend {
    /// Creates a backend for `target` on the given proxy client.
    pub fn new(api: BlobApiClient, target: SyncTarget) -> Self {
        Self { api, target }
    }

    /// The slot this backend reads and writes.
    pub fn target(&self) -> &SyncTarget {
        &self.target
    }
}

#[async_trait]
impl ResourceBackend for RemoteBackend {
    async fn load(&self) -> ClientResult<Option<Value>> {
        self.api.get_json(&self.target).await
    }

    async fn save(&self, value: &Value) -> ClientResult<()> {
        self.api.set_json(&self.target, value).await
    }

    async fn remove(&self) -> ClientResult<()> {
        self.api.delete(&self.target).await
    }
}

/// Backend that falls back to a local file store when the primary
/// backend fails.
///
/// A failed primary load is answered from the local copy; a failed
/// primary save or remove is applied to the local copy and reported as
/// success. The fallback value is trusted for the rest of the session;
/// the next successful primary load replaces it.
pub struct FallbackBackend {
    primary: Arc<dyn ResourceBackend>,
    local: LocalBlobStore,
    target: SyncTarget,
}

impl FallbackBackend {
    /// Wraps `primary` with a local secondary store for `target`.
    pub fn new(primary: Arc<dyn ResourceBackend>, local: LocalBlobStore, target: SyncTarget) -> Self {
        Self {
            primary,
            local,
            target,
        }
    }
}

#[async_trait]
impl ResourceBackend for FallbackBackend {
    async fn load(&self) -> ClientResult<Option<Value>> {
        match self.primary.load().await {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("Primary load failed, reading local fallback: {e}");
                Ok(self.local.get(&self.target.store, &self.target.key).await?)
            }
        }
    }

    async fn save(&self, value: &Value) -> ClientResult<()> {
        match self.primary.save(value).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Primary save failed, writing local fallback: {e}");
                self.local
                    .set(&self.target.store, &self.target.key, value.clone())
                    .await?;
                Ok(())
            }
        }
    }

    async fn remove(&self) -> ClientResult<()> {
        match self.primary.remove().await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Primary remove failed, deleting local fallback: {e}");
                self.local.delete(&self.target.store, &self.target.key).await?;
                Ok(())
            }
        }
    }
}

/// In-memory backend holding a single slot. The mock strategy
/// implementation, for tests and local development.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slot: RwLock<Option<Value>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with `value`.
    pub fn with_value(value: Value) -> Self {
        Self {
            slot: RwLock::new(Some(value)),
        }
    }
}

#[async_trait]
impl ResourceBackend for MemoryBackend {
    async fn load(&self) -> ClientResult<Option<Value>> {
        Ok(self.slot.read().await.clone())
    }

    async fn save(&self, value: &Value) -> ClientResult<()> {
        *self.slot.write().await = Some(value.clone());
        Ok(())
    }

    async fn remove(&self) -> ClientResult<()> {
        *self.slot.write().await = None;
        Ok(())
    }
}
