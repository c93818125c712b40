//! HTTP client for the blob proxy REST surface.

use crate::config::{ClientConfig, SyncTarget};
use crate::error::{ClientError, ClientResult};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Thin reqwest wrapper over the proxy's `(store, key, operation)`
/// routes.
#[derive(Debug, Clone)]
pub struct BlobApiClient {
    config: ClientConfig,
    client: Client,
}

impl BlobApiClient {
    /// Creates a client for the proxy at `config.api_base`.
    pub fn new(config: ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create HTTP client");

        Self { config, client }
    }

    /// The configured base URL.
    pub fn api_base(&self) -> &str {
        &self.config.api_base
    }

    fn blob_url(&self, target: &SyncTarget, operation: &str) -> String {
        format!(
            "{}/api/blobs/{}/{}/{}",
            self.config.api_base, target.store, target.key, operation
        )
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let mut request = self.client.request(method, url);
        if let Some(origin) = &self.config.origin {
            request = request.header("Origin", origin);
        }
        request
    }

    /// Fetches the JSON value for `target`. A `null` body maps to `None`.
    pub async fn get_json(&self, target: &SyncTarget) -> ClientResult<Option<Value>> {
        debug!("Loading blob: {}/{}", target.store, target.key);

        let response = self
            .request(Method::GET, self.blob_url(target, "get"))
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("load failed: {e}")))?;

        if !response.status().is_success() {
            return Err(remote_error(response, "Failed to load data").await);
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ClientError::Network(format!("failed to parse response: {e}")))?;

        Ok(if value.is_null() { None } else { Some(value) })
    }

    /// Stores `value` verbatim under `target`.
    pub async fn set_json(&self, target: &SyncTarget, value: &Value) -> ClientResult<()> {
        debug!("Saving blob: {}/{}", target.store, target.key);

        let response = self
            .request(Method::POST, self.blob_url(target, "set"))
            .json(value)
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("save failed: {e}")))?;

        if !response.status().is_success() {
            return Err(remote_error(response, "Failed to save data").await);
        }

        Ok(())
    }

    /// Deletes the value under `target`.
    pub async fn delete(&self, target: &SyncTarget) -> ClientResult<()> {
        debug!("Deleting blob: {}/{}", target.store, target.key);

        let response = self
            .request(Method::DELETE, self.blob_url(target, "delete"))
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("delete failed: {e}")))?;

        if !response.status().is_success() {
            return Err(remote_error(response, "Failed to delete data").await);
        }

        Ok(())
    }
}

/// Builds a [`ClientError::Remote`] from a non-success response,
/// preferring the server's `{"error": …}` message over `fallback`.
async fn remote_error(response: Response, fallback: &str) -> ClientError {
    let status = response.status().as_u16();
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("error")?.as_str().map(str::to_string))
        .unwrap_or_else(|| fallback.to_string());

    ClientError::Remote { status, message }
}
