//! Medicine-tracker domain wrapper.
//!
//! The domain layer is a thin typed alias over the generic engine:
//! one record type, one fixed slot, nothing else.

use crate::api::BlobApiClient;
use crate::backend::RemoteBackend;
use crate::config::{ClientConfig, SyncOptions, SyncTarget};
use crate::resource::SyncedResource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Store name holding the medicine record.
pub const MEDICINE_STORE: &str = "medicine-data-store";
/// Key of the single medicine record.
pub const MEDICINE_KEY: &str = "data";

/// The tracked record: when the last meal and the last dose happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineData {
    pub last_meal_time: String,
    pub last_medicine_time: String,
}

/// A synced medicine record.
pub type MedicineResource = SyncedResource<MedicineData>;

/// Creates a [`MedicineResource`] bound to the fixed medicine slot on
/// the proxy at `config.api_base`.
pub fn medicine_resource(config: ClientConfig, options: SyncOptions) -> MedicineResource {
    let api = BlobApiClient::new(config);
    let backend = RemoteBackend::new(api, SyncTarget::new(MEDICINE_STORE, MEDICINE_KEY));
    SyncedResource::new(Arc::new(backend), options)
}
