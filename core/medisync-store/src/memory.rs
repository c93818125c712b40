//! In-memory blob store.

use crate::error::StoreResult;
use crate::BlobStore;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory blob store backed by a `HashMap`.
///
/// Nothing survives the process; use it for tests and as the mock
/// strategy during local development.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    slots: RwLock<HashMap<(String, String), Value>>,
}

impl MemoryBlobStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values across all namespaces.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    /// Returns whether the store holds no values.
    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, store: &str, key: &str) -> StoreResult<Option<Value>> {
        let slots = self.slots.read().await;
        Ok(slots.get(&(store.to_string(), key.to_string())).cloned())
    }

    async fn set(&self, store: &str, key: &str, value: Value) -> StoreResult<()> {
        let mut slots = self.slots.write().await;
        slots.insert((store.to_string(), key.to_string()), value);
        Ok(())
    }

    async fn delete(&self, store: &str, key: &str) -> StoreResult<()> {
        let mut slots = self.slots.write().await;
        slots.remove(&(store.to_string(), key.to_string()));
        Ok(())
    }
}
