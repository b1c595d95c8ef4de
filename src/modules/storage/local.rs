//! Local filesystem storage
//!
//! Files live under a root directory and are served by the application at
//! `{public_url_prefix}/{path}`. Metadata is not persisted.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use super::error::{StorageError, StorageResult};
use super::provider::{
    ByteStream, ListedFile, Metadata, ProviderKind, StorageProvider, UploadFile, UploadResult,
};
use crate::core::config::LocalStorageConfig;

const PROVIDER: ProviderKind = ProviderKind::Local;

pub struct LocalStorage {
    root: PathBuf,
    public_url_prefix: String,
}

impl LocalStorage {
    /// Create the storage, making sure the root directory exists
    pub async fn new(config: &LocalStorageConfig) -> StorageResult<Self> {
        fs::create_dir_all(&config.upload_path).await.map_err(|e| {
            StorageError::Config(format!(
                "Failed to create upload directory '{}': {}",
                config.upload_path.display(),
                e
            ))
        })?;

        debug!(
            "Local storage initialized at '{}'",
            config.upload_path.display()
        );

        Ok(Self {
            root: config.upload_path.clone(),
            public_url_prefix: config.public_url_prefix.trim_end_matches('/').to_string(),
        })
    }

    /// Application-relative URL a stored file is served from
    pub fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_url_prefix, path.trim_start_matches('/'))
    }

    /// Resolve a storage path under the root, refusing anything that escapes it
    fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();

        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(StorageError::InvalidPath(format!(
                        "'{}' must stay inside the upload directory",
                        path
                    )))
                }
            }
        }

        Ok(resolved)
    }

    async fn write_file(&self, target: &Path, file: &UploadFile) -> std::io::Result<()> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut handle = fs::File::create(target).await?;
        handle.write_all(&file.data).await?;
        handle.flush().await
    }

    async fn walk(&self, start: PathBuf) -> std::io::Result<Vec<ListedFile>> {
        let mut files = Vec::new();
        let mut pending = vec![start];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };

            while let Some(entry) = entries.next_entry().await? {
                let metadata = entry.metadata().await?;
                let entry_path = entry.path();

                if metadata.is_dir() {
                    pending.push(entry_path);
                    continue;
                }

                let relative = entry_path
                    .strip_prefix(&self.root)
                    .unwrap_or(&entry_path)
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");

                let last_modified = metadata
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

                files.push(ListedFile::new(relative, metadata.len(), last_modified));
            }
        }

        Ok(files)
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    fn kind(&self) -> ProviderKind {
        PROVIDER
    }

    async fn upload(
        &self,
        file: UploadFile,
        path: &str,
        _metadata: &Metadata,
    ) -> StorageResult<UploadResult> {
        let target = self
            .resolve(path)
            .map_err(|e| e.logged(PROVIDER, "upload", path))?;

        self.write_file(&target, &file)
            .await
            .map_err(|e| StorageError::from_io(path, e).logged(PROVIDER, "upload", path))?;

        debug!("Uploaded '{}' ({} bytes) to local storage", path, file.size);

        Ok(UploadResult {
            path: path.to_string(),
            url: self.public_url(path),
            size: file.size,
        })
    }

    async fn download(&self, path: &str) -> StorageResult<ByteStream> {
        let target = self
            .resolve(path)
            .map_err(|e| e.logged(PROVIDER, "download", path))?;

        let handle = fs::File::open(&target)
            .await
            .map_err(|e| StorageError::from_io(path, e).logged(PROVIDER, "download", path))?;

        let owned_path = path.to_string();
        let stream = ReaderStream::new(handle)
            .map(move |chunk| chunk.map_err(|e| StorageError::from_io(&owned_path, e)));

        Ok(stream.boxed())
    }

    async fn delete(&self, path: &str) -> StorageResult<bool> {
        let target = self
            .resolve(path)
            .map_err(|e| e.logged(PROVIDER, "delete", path))?;

        // A missing file is an error here, not a no-op
        fs::remove_file(&target)
            .await
            .map_err(|e| StorageError::from_io(path, e).logged(PROVIDER, "delete", path))?;

        debug!("Deleted '{}' from local storage", path);
        Ok(true)
    }

    async fn get_signed_url(&self, path: &str, expires_in_secs: u64) -> StorageResult<String> {
        // Local URLs are static and never expire
        debug!(
            "Local storage ignores signed URL expiry ({}s) for '{}'",
            expires_in_secs, path
        );
        Ok(self.public_url(path))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<ListedFile>> {
        let start = self
            .resolve(prefix)
            .map_err(|e| e.logged(PROVIDER, "list", prefix))?;

        // A prefix naming a stored file lists just that file
        match fs::metadata(&start).await {
            Ok(metadata) if metadata.is_file() => {
                let last_modified = metadata
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
                let path = prefix.trim_matches('/').to_string();
                return Ok(vec![ListedFile::new(path, metadata.len(), last_modified)]);
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::from_io(prefix, e).logged(PROVIDER, "list", prefix))
            }
        }

        self.walk(start)
            .await
            .map_err(|e| StorageError::from_io(prefix, e).logged(PROVIDER, "list", prefix))
    }

    async fn move_file(&self, old_path: &str, new_path: &str) -> StorageResult<bool> {
        let source = self
            .resolve(old_path)
            .map_err(|e| e.logged(PROVIDER, "move", old_path))?;
        let destination = self
            .resolve(new_path)
            .map_err(|e| e.logged(PROVIDER, "move", new_path))?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::from_io(new_path, e).logged(PROVIDER, "move", new_path))?;
        }

        fs::rename(&source, &destination)
            .await
            .map_err(|e| StorageError::from_io(old_path, e).logged(PROVIDER, "move", old_path))?;

        debug!("Moved '{}' to '{}' in local storage", old_path, new_path);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use tempfile::TempDir;

    async fn storage() -> (TempDir, LocalStorage) {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(&LocalStorageConfig::new(dir.path()))
            .await
            .unwrap();
        (dir, storage)
    }

    async fn read_all(stream: ByteStream) -> Vec<u8> {
        let chunks: Vec<_> = stream.try_collect().await.unwrap();
        chunks.concat()
    }

    #[tokio::test]
    async fn test_upload_creates_parent_directories() {
        let (dir, storage) = storage().await;
        let file = UploadFile::new(b"evidence".to_vec(), "text/plain", "e.txt");

        let result = storage
            .upload(file, "org1/entity1/evidence/e_1.txt", &Metadata::new())
            .await
            .unwrap();

        assert_eq!(result.url, "/uploads/org1/entity1/evidence/e_1.txt");
        assert_eq!(result.size, 8);
        assert!(dir.path().join("org1/entity1/evidence/e_1.txt").is_file());
    }

    #[tokio::test]
    async fn test_download_returns_uploaded_bytes() {
        let (_dir, storage) = storage().await;
        let content = vec![7u8; 200_000];
        storage
            .upload(
                UploadFile::new(content.clone(), "application/pdf", "big.pdf"),
                "org1/big_1.pdf",
                &Metadata::new(),
            )
            .await
            .unwrap();

        let stream = storage.download("org1/big_1.pdf").await.unwrap();
        assert_eq!(read_all(stream).await, content);
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_not_found() {
        let (_dir, storage) = storage().await;
        let err = storage.delete("org1/nothing.txt").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_paths_cannot_escape_root() {
        let (_dir, storage) = storage().await;
        let file = UploadFile::new(b"x".to_vec(), "text/plain", "x.txt");

        let err = storage
            .upload(file, "../outside.txt", &Metadata::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_list_missing_prefix_is_empty() {
        let (_dir, storage) = storage().await;
        assert!(storage.list("org-unknown").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_file_prefix_returns_that_file() {
        let (_dir, storage) = storage().await;
        let path = "org1/entity1/policy/test_1700000000000.txt";
        storage
            .upload(
                UploadFile::new(b"policy".to_vec(), "text/plain", "test.txt"),
                path,
                &Metadata::new(),
            )
            .await
            .unwrap();

        let listed = storage.list(path).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].path, path);
        assert_eq!(listed[0].name, "test_1700000000000.txt");
        assert_eq!(listed[0].size, 6);

        assert!(storage.list("org1/entity1/pol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signed_url_is_static_public_url() {
        let (_dir, storage) = storage().await;
        let url = storage.get_signed_url("org1/a_1.txt", 60).await.unwrap();
        assert_eq!(url, "/uploads/org1/a_1.txt");
    }
}
