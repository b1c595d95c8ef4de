//! Provider over any signing `ObjectStore` backend
//!
//! Azure Blob and GCS differ only in how the client is built and how an
//! object's URL is written, so both are this type with a different store.

use async_trait::async_trait;
use object_store::signer::Signer;
use object_store::ObjectStore;
use tracing::debug;

use super::error::StorageResult;
use super::object_store_ops as ops;
use super::provider::{
    ByteStream, ListedFile, Metadata, ProviderKind, StorageProvider, UploadFile, UploadResult,
};

pub struct ObjectStoreStorage<S> {
    kind: ProviderKind,
    store: S,
    base_url: String,
}

impl<S> ObjectStoreStorage<S> {
    /// `base_url` is the container or bucket root object URLs are built from
    pub fn with_store(kind: ProviderKind, store: S, base_url: impl Into<String>) -> Self {
        Self {
            kind,
            store,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn object_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl<S> StorageProvider for ObjectStoreStorage<S>
where
    S: ObjectStore + Signer,
{
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn upload(
        &self,
        file: UploadFile,
        path: &str,
        metadata: &Metadata,
    ) -> StorageResult<UploadResult> {
        ops::put(&self.store, self.kind, path, &file, metadata)
            .await
            .map_err(|e| e.logged(self.kind, "upload", path))?;

        debug!("Uploaded '{}' to {}", path, self.base_url);

        Ok(UploadResult {
            path: path.to_string(),
            url: self.object_url(path),
            size: file.size,
        })
    }

    async fn download(&self, path: &str) -> StorageResult<ByteStream> {
        ops::get(&self.store, self.kind, path)
            .await
            .map_err(|e| e.logged(self.kind, "download", path))
    }

    async fn delete(&self, path: &str) -> StorageResult<bool> {
        ops::delete(&self.store, self.kind, path)
            .await
            .map_err(|e| e.logged(self.kind, "delete", path))?;

        debug!("Deleted '{}' from {}", path, self.base_url);
        Ok(true)
    }

    async fn get_signed_url(&self, path: &str, expires_in_secs: u64) -> StorageResult<String> {
        ops::signed_get_url(&self.store, self.kind, path, expires_in_secs)
            .await
            .map_err(|e| e.logged(self.kind, "get_signed_url", path))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<ListedFile>> {
        ops::list(&self.store, self.kind, prefix)
            .await
            .map_err(|e| e.logged(self.kind, "list", prefix))
    }

    async fn move_file(&self, old_path: &str, new_path: &str) -> StorageResult<bool> {
        ops::copy_then_delete(&self.store, self.kind, old_path, new_path)
            .await
            .map_err(|e| e.logged(self.kind, "move", old_path))?;

        debug!(
            "Moved '{}' to '{}' in {}",
            old_path, new_path, self.base_url
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_joins_base_and_path() {
        let storage = ObjectStoreStorage::with_store(ProviderKind::Gcs, (), "gs://grc-documents/");
        assert_eq!(
            storage.object_url("/org1/e1/policy/p_1.pdf"),
            "gs://grc-documents/org1/e1/policy/p_1.pdf"
        );
    }
}
