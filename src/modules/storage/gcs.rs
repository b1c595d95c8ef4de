//! Google Cloud Storage

use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};
use tracing::info;

use super::error::{StorageError, StorageResult};
use super::object_store_storage::ObjectStoreStorage;
use super::provider::ProviderKind;
use crate::core::config::GcsConfig;

pub type GcsStorage = ObjectStoreStorage<GoogleCloudStorage>;

impl GcsStorage {
    /// Build the client. Without `GCS_KEY_FILE`, credentials come from the
    /// standard `GOOGLE_*` environment variables or the metadata server.
    pub fn new(config: &GcsConfig) -> StorageResult<Self> {
        let mut builder = GoogleCloudStorageBuilder::from_env().with_bucket_name(&config.bucket);

        if let Some(key_file) = &config.key_file {
            builder = builder.with_service_account_path(key_file.to_string_lossy());
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::Credential(format!("GCS: {}", e)))?;

        info!(
            "GCS storage initialized for bucket: {}, project: {}",
            config.bucket,
            config.project_id.as_deref().unwrap_or("-")
        );

        Ok(Self::with_store(
            ProviderKind::Gcs,
            store,
            format!("gs://{}", config.bucket),
        ))
    }
}
