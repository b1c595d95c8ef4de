//! Storage gateway
//!
//! Owns the single active provider for the process and forwards every call
//! to it unchanged. The provider is chosen once, at construction.

use tracing::info;

use super::azure::AzureBlobStorage;
use super::error::StorageResult;
use super::gcs::GcsStorage;
use super::local::LocalStorage;
use super::path;
use super::provider::{
    ByteStream, ListedFile, Metadata, ProviderKind, StorageProvider, UploadFile, UploadResult,
    DEFAULT_SIGNED_URL_EXPIRY_SECS,
};
use super::s3::S3Storage;
use crate::core::config::{ProviderConfig, StorageConfig};

/// Construct the provider described by `config`
pub async fn build_provider(config: &ProviderConfig) -> StorageResult<Box<dyn StorageProvider>> {
    Ok(match config {
        ProviderConfig::Local(cfg) => Box::new(LocalStorage::new(cfg).await?),
        ProviderConfig::S3(cfg) => Box::new(S3Storage::new(cfg)?),
        ProviderConfig::Azure(cfg) => Box::new(AzureBlobStorage::new(cfg)?),
        ProviderConfig::Gcs(cfg) => Box::new(GcsStorage::new(cfg)?),
    })
}

pub struct StorageGateway {
    provider: Box<dyn StorageProvider>,
}

impl StorageGateway {
    pub fn new(provider: Box<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    pub async fn from_config(config: &StorageConfig) -> StorageResult<Self> {
        Self::for_provider(&config.provider).await
    }

    pub async fn for_provider(config: &ProviderConfig) -> StorageResult<Self> {
        let provider = build_provider(config).await?;
        info!("Storage gateway using '{}' provider", provider.kind());
        Ok(Self::new(provider))
    }

    pub fn provider_kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    pub async fn upload(
        &self,
        file: UploadFile,
        path: &str,
        metadata: Option<&Metadata>,
    ) -> StorageResult<UploadResult> {
        let empty = Metadata::new();
        self.provider
            .upload(file, path, metadata.unwrap_or(&empty))
            .await
    }

    pub async fn download(&self, path: &str) -> StorageResult<ByteStream> {
        self.provider.download(path).await
    }

    pub async fn delete(&self, path: &str) -> StorageResult<bool> {
        self.provider.delete(path).await
    }

    /// Signed URL valid for `expires_in_secs`, one hour when `None`
    pub async fn get_signed_url(
        &self,
        path: &str,
        expires_in_secs: Option<u64>,
    ) -> StorageResult<String> {
        self.provider
            .get_signed_url(
                path,
                expires_in_secs.unwrap_or(DEFAULT_SIGNED_URL_EXPIRY_SECS),
            )
            .await
    }

    pub async fn list(&self, prefix: Option<&str>) -> StorageResult<Vec<ListedFile>> {
        self.provider.list(prefix.unwrap_or("")).await
    }

    pub async fn move_file(&self, old_path: &str, new_path: &str) -> StorageResult<bool> {
        self.provider.move_file(old_path, new_path).await
    }

    pub fn generate_file_path(
        &self,
        organization_id: &str,
        entity_id: &str,
        document_type: &str,
        file_name: &str,
    ) -> String {
        path::generate_file_path(organization_id, entity_id, document_type, file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::LocalStorageConfig;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_from_config_selects_local_provider() {
        let dir = TempDir::new().unwrap();
        let config = StorageConfig {
            provider: ProviderConfig::Local(LocalStorageConfig::new(dir.path().join("uploads"))),
        };

        let gateway = StorageGateway::from_config(&config).await.unwrap();
        assert_eq!(gateway.provider_kind(), ProviderKind::Local);
        assert!(dir.path().join("uploads").is_dir());
    }

    #[tokio::test]
    async fn test_signed_url_defaults_expiry() {
        let dir = TempDir::new().unwrap();
        let gateway = StorageGateway::for_provider(&ProviderConfig::Local(
            LocalStorageConfig::new(dir.path()),
        ))
        .await
        .unwrap();

        let url = gateway.get_signed_url("org1/a_1.txt", None).await.unwrap();
        assert_eq!(url, "/uploads/org1/a_1.txt");
    }

    #[tokio::test]
    async fn test_generate_file_path_is_namespaced() {
        let dir = TempDir::new().unwrap();
        let gateway = StorageGateway::for_provider(&ProviderConfig::Local(
            LocalStorageConfig::new(dir.path()),
        ))
        .await
        .unwrap();

        let path = gateway.generate_file_path("org1", "entity1", "policy", "test.txt");
        assert!(path.starts_with("org1/entity1/policy/test_"));
        assert!(path.ends_with(".txt"));
    }
}
