//! Storage provider contract
//!
//! Every backend (local disk, S3, Azure Blob, GCS) implements [`StorageProvider`]
//! with the same externally observable behavior, so callers never branch on the
//! active backend.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use super::error::{StorageError, StorageResult};

/// Default lifetime of a signed URL (1 hour)
pub const DEFAULT_SIGNED_URL_EXPIRY_SECS: u64 = 3600;

/// Caller-supplied key/value pairs attached to an uploaded object
pub type Metadata = HashMap<String, String>;

/// Streamed file content returned by `download`
pub type ByteStream = BoxStream<'static, StorageResult<Bytes>>;

/// Identifies a storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Local,
    S3,
    Azure,
    Gcs,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Local => "local",
            ProviderKind::S3 => "s3",
            ProviderKind::Azure => "azure",
            ProviderKind::Gcs => "gcs",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(ProviderKind::Local),
            "s3" => Ok(ProviderKind::S3),
            "azure" => Ok(ProviderKind::Azure),
            "gcs" => Ok(ProviderKind::Gcs),
            other => Err(StorageError::Config(format!(
                "Unknown storage provider '{}'. Expected one of: local, s3, azure, gcs",
                other
            ))),
        }
    }
}

/// File content plus the attributes the caller declared for it
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub data: Bytes,
    pub content_type: String,
    pub original_name: String,
    pub size: u64,
}

impl UploadFile {
    pub fn new(
        data: impl Into<Bytes>,
        content_type: impl Into<String>,
        original_name: impl Into<String>,
    ) -> Self {
        let data = data.into();
        let size = data.len() as u64;
        Self {
            data,
            content_type: content_type.into(),
            original_name: original_name.into(),
            size,
        }
    }
}

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Provider-relative path the file was stored at
    pub path: String,
    /// Provider locator (`/uploads/..`, `s3://..`, `gs://..` or an Azure blob URL)
    pub url: String,
    pub size: u64,
}

/// One entry returned by `list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedFile {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

impl ListedFile {
    pub fn new(path: String, size: u64, last_modified: DateTime<Utc>) -> Self {
        let name = file_name_of(&path).to_string();
        Self {
            name,
            path,
            size,
            last_modified,
        }
    }
}

/// Final segment of a `/`-separated path
pub fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Uniform capability set implemented by every storage backend.
///
/// Implementations hold no long-lived handles: each call opens, acts, and
/// releases within itself. Failures are logged with operation, path and
/// provider, then returned unchanged.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Store `file` at `path`, creating intermediate directories or prefixes.
    ///
    /// `metadata` becomes object metadata where the backend supports it.
    async fn upload(
        &self,
        file: UploadFile,
        path: &str,
        metadata: &Metadata,
    ) -> StorageResult<UploadResult>;

    /// Stream the content stored at `path`; `NotFound` if absent
    async fn download(&self, path: &str) -> StorageResult<ByteStream>;

    /// Remove the file at `path`. Returns `true` on confirmed deletion.
    async fn delete(&self, path: &str) -> StorageResult<bool>;

    /// URL granting read access to `path` for `expires_in_secs`
    async fn get_signed_url(&self, path: &str, expires_in_secs: u64) -> StorageResult<String>;

    /// Everything stored under `prefix`, recursively. Order is unspecified.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<ListedFile>>;

    /// Relocate a file. Not atomic: a failure after the copy step leaves
    /// the file present at both paths.
    async fn move_file(&self, old_path: &str, new_path: &str) -> StorageResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_file_keeps_bytes_buffer() {
        let body = Bytes::from(vec![3u8; 4096]);
        let file = UploadFile::new(body.clone(), "application/pdf", "evidence.pdf");

        assert_eq!(file.size, 4096);
        assert_eq!(file.data.as_ptr(), body.as_ptr());
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("local".parse::<ProviderKind>().unwrap(), ProviderKind::Local);
        assert_eq!(" S3 ".parse::<ProviderKind>().unwrap(), ProviderKind::S3);
        assert_eq!("Azure".parse::<ProviderKind>().unwrap(), ProviderKind::Azure);
        assert_eq!("gcs".parse::<ProviderKind>().unwrap(), ProviderKind::Gcs);
        assert!("ftp".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_listed_file_name_is_last_segment() {
        let file = ListedFile::new(
            "org1/entity1/policy/test_1700000000000.txt".to_string(),
            41,
            Utc::now(),
        );
        assert_eq!(file.name, "test_1700000000000.txt");
        assert_eq!(file_name_of("plain.txt"), "plain.txt");
    }

    #[test]
    fn test_upload_file_size_matches_content() {
        let file = UploadFile::new(b"hello".to_vec(), "text/plain", "hello.txt");
        assert_eq!(file.size, 5);
    }
}
