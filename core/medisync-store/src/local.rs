//! File-backed blob store.
//!
//! One directory per store, one `<key>.json` file per key. Directories
//! are created lazily on the first write to a store.

use crate::error::{StoreError, StoreResult};
use crate::BlobStore;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Blob store that persists each value as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Creates a store rooted at `root`. The directory itself is only
    /// created when the first value is written.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, store: &str, key: &str) -> PathBuf {
        // Store and key become path components; strip separators so a
        // key like "a/b" cannot escape the store directory.
        self.root
            .join(sanitize(store))
            .join(format!("{}.json", sanitize(key)))
    }

    async fn ensure_store_dir(&self, store: &str) -> StoreResult<()> {
        let dir = self.root.join(sanitize(store));
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .await
                .map_err(|e| StoreError::Storage(format!("failed to create store dir: {e}")))?;
            info!("Created blob store directory: {:?}", dir);
        }
        Ok(())
    }
}

fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| if c == '/' || c == '\\' || c == '.' { '_' } else { c })
        .collect()
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn get(&self, store: &str, key: &str) -> StoreResult<Option<Value>> {
        let path = self.file_path(store, key);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)
            .await
            .map_err(|e| StoreError::Storage(format!("failed to read blob: {e}")))?;
        let value = serde_json::from_slice(&bytes)?;
        Ok(Some(value))
    }

    async fn set(&self, store: &str, key: &str, value: Value) -> StoreResult<()> {
        self.ensure_store_dir(store).await?;
        let path = self.file_path(store, key);

        debug!("Writing blob: {:?}", path);
        let bytes = serde_json::to_vec(&value)?;
        fs::write(&path, bytes)
            .await
            .map_err(|e| StoreError::Storage(format!("failed to write blob: {e}")))?;
        Ok(())
    }

    async fn delete(&self, store: &str, key: &str) -> StoreResult<()> {
        let path = self.file_path(store, key);
        if !path.exists() {
            // Deleting an absent key is not an error.
            return Ok(());
        }

        debug!("Deleting blob: {:?}", path);
        fs::remove_file(&path)
            .await
            .map_err(|e| StoreError::Storage(format!("failed to delete blob: {e}")))?;
        Ok(())
    }
}
