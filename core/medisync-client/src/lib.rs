//! Client-side synchronized resource layer for MediSync.
//!
//! Keeps a piece of application state consistent between an in-memory
//! value, the remote blob proxy, and (optionally) a local fallback
//! store, while coalescing rapid mutations into debounced network
//! writes.
//!
//! # Components
//!
//! - **[`BlobApiClient`]**: reqwest wrapper over the proxy's
//!   `(store, key, operation)` REST routes.
//! - **[`ResourceBackend`]**: the strategy seam — remote, remote with
//!   local fallback, or in-memory.
//! - **[`SyncedResource`]**: the generic engine holding the typed
//!   value, the loading/error/dirty flags, and the debounced autosave
//!   timer.
//!
//! # Example
//!
//! ```no_run
//! use medisync_client::{medicine_resource, ClientConfig, MedicineData, SyncOptions};
//!
//! # async fn run() {
//! let resource = medicine_resource(
//!     ClientConfig::default(),
//!     SyncOptions { auto_sync: true, ..Default::default() },
//! );
//!
//! resource.load().await;
//! resource.update(MedicineData {
//!     last_meal_time: "12:00".to_string(),
//!     last_medicine_time: "13:00".to_string(),
//! });
//! // The debounce timer fires the save once updates go quiet.
//! # }
//! ```

mod api;
mod backend;
mod config;
mod error;
mod medicine;
mod resource;

pub use api::BlobApiClient;
pub use backend::{FallbackBackend, MemoryBackend, RemoteBackend, ResourceBackend};
pub use config::{ClientConfig, SyncOptions, SyncTarget, DEFAULT_DEBOUNCE_MS};
pub use error::{ClientError, ClientResult};
pub use medicine::{medicine_resource, MedicineData, MedicineResource, MEDICINE_KEY, MEDICINE_STORE};
pub use resource::SyncedResource;
