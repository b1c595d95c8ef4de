//! Amazon S3 (or S3-compatible) storage
//!
//! Uses the rust-s3 crate. Object metadata travels as `x-amz-meta-*` headers.
//! The client is built with `fail-on-err` disabled, so every response status is
//! checked here.

use std::borrow::Cow;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use s3::creds::Credentials;
use s3::request::DataStream;
use s3::{Bucket, Region};
use tracing::{debug, info};

use super::error::{StorageError, StorageResult};
use super::provider::{
    ByteStream, ListedFile, Metadata, ProviderKind, StorageProvider, UploadFile, UploadResult,
};
use crate::core::config::S3Config;

const PROVIDER: ProviderKind = ProviderKind::S3;

/// Longest presigned URL lifetime S3 accepts (7 days)
const MAX_PRESIGN_EXPIRY_SECS: u64 = 7 * 24 * 3600;

pub struct S3Storage {
    bucket: Box<Bucket>,
}

impl S3Storage {
    /// Create a new S3 client from configuration
    pub fn new(config: &S3Config) -> StorageResult<Self> {
        let credentials = Credentials::new(
            config.access_key_id.as_deref(),
            config.secret_access_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Credential(format!("Failed to create S3 credentials: {}", e)))?;

        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse::<Region>()
                .map_err(|e| StorageError::Config(format!("Invalid AWS_REGION: {}", e)))?,
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StorageError::Config(format!("Failed to create S3 bucket: {}", e)))?;

        // Use path-style URLs for S3-compatible endpoints (http://endpoint/bucket)
        if config.endpoint.is_some() {
            bucket.set_path_style();
        }

        info!(
            "S3 storage initialized for bucket: {}, region: {}",
            bucket.name(),
            config.region
        );

        Ok(Self { bucket })
    }

    /// Provider locator for an object key
    pub fn object_url(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket.name(), key)
    }

    fn check_status(status: u16, key: &str, action: &str) -> StorageResult<()> {
        match status {
            200..=299 => Ok(()),
            404 => Err(StorageError::NotFound {
                path: key.to_string(),
            }),
            401 | 403 => Err(StorageError::Credential(format!(
                "S3 denied {} of '{}' (status {})",
                action, key, status
            ))),
            _ => Err(StorageError::provider(
                PROVIDER,
                format!("Failed to {} '{}': status {}", action, key, status),
            )),
        }
    }

    fn request_error(key: &str, action: &str, err: s3::error::S3Error) -> StorageError {
        StorageError::provider(PROVIDER, format!("Failed to {} '{}': {}", action, key, err))
    }

    async fn copy(&self, from: &str, to: &str) -> StorageResult<()> {
        let status = self
            .bucket
            .copy_object_internal(from, to)
            .await
            .map_err(|e| Self::request_error(from, "copy", e))?;
        Self::check_status(status, from, "copy")
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| Self::request_error(key, "delete", e))?;
        Self::check_status(response.status_code(), key, "delete")
    }
}

/// `originalName` -> `x-amz-meta-originalname`
fn metadata_header(key: &str) -> String {
    let name: String = key
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    format!("x-amz-meta-{}", name.to_lowercase())
}

/// Header-safe metadata value. Plain ASCII is stored as is, anything else
/// (accented filenames, control characters) is percent-encoded.
fn metadata_value(value: &str) -> Cow<'_, str> {
    if value.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
        Cow::Borrowed(value)
    } else {
        urlencoding::encode(value)
    }
}

/// Response body chunks as they arrive, with errors tied to the object key
fn body_stream(body: DataStream, key: &str) -> ByteStream {
    let key = key.to_string();
    body.map(move |chunk| chunk.map_err(|e| S3Storage::request_error(&key, "download", e)))
        .boxed()
}

/// Storage prefix without surrounding slashes
fn list_prefix(prefix: &str) -> &str {
    prefix.trim_matches('/')
}

/// Whether `key` is the object named by `prefix` or lies under it by whole
/// path segments (`org1/e1` covers `org1/e1/x` but not `org1/e10/x`)
fn within_prefix(key: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || key == prefix
        || key
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[async_trait]
impl StorageProvider for S3Storage {
    fn kind(&self) -> ProviderKind {
        PROVIDER
    }

    async fn upload(
        &self,
        file: UploadFile,
        path: &str,
        metadata: &Metadata,
    ) -> StorageResult<UploadResult> {
        // Extra headers live on the bucket handle, so attach them to a per-call copy
        let mut bucket = self.bucket.clone();
        for (key, value) in metadata {
            bucket.add_header(&metadata_header(key), &metadata_value(value));
        }

        let response = bucket
            .put_object_with_content_type(path, &file.data, &file.content_type)
            .await
            .map_err(|e| Self::request_error(path, "upload", e).logged(PROVIDER, "upload", path))?;
        Self::check_status(response.status_code(), path, "upload")
            .map_err(|e| e.logged(PROVIDER, "upload", path))?;

        debug!("Uploaded file '{}' to bucket '{}'", path, self.bucket.name());

        Ok(UploadResult {
            path: path.to_string(),
            url: self.object_url(path),
            size: file.size,
        })
    }

    async fn download(&self, path: &str) -> StorageResult<ByteStream> {
        let response = self.bucket.get_object_stream(path).await.map_err(|e| {
            Self::request_error(path, "download", e).logged(PROVIDER, "download", path)
        })?;
        Self::check_status(response.status_code, path, "download")
            .map_err(|e| e.logged(PROVIDER, "download", path))?;

        debug!(
            "Streaming file '{}' from bucket '{}'",
            path,
            self.bucket.name()
        );

        Ok(body_stream(response.bytes, path))
    }

    async fn delete(&self, path: &str) -> StorageResult<bool> {
        self.remove(path)
            .await
            .map_err(|e| e.logged(PROVIDER, "delete", path))?;

        debug!("Deleted file '{}' from bucket '{}'", path, self.bucket.name());
        Ok(true)
    }

    async fn get_signed_url(&self, path: &str, expires_in_secs: u64) -> StorageResult<String> {
        let expiry = expires_in_secs.clamp(1, MAX_PRESIGN_EXPIRY_SECS) as u32;

        self.bucket
            .presign_get(path, expiry, None)
            .await
            .map_err(|e| {
                StorageError::provider(
                    PROVIDER,
                    format!("Failed to generate presigned URL for '{}': {}", path, e),
                )
                .logged(PROVIDER, "get_signed_url", path)
            })
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<ListedFile>> {
        // S3 prefixes match raw characters, so results are narrowed to whole segments
        let scope = list_prefix(prefix);
        let pages = self
            .bucket
            .list(scope.to_string(), None)
            .await
            .map_err(|e| Self::request_error(prefix, "list", e).logged(PROVIDER, "list", prefix))?;

        let files = pages
            .into_iter()
            .flat_map(|page| page.contents)
            .filter(|object| within_prefix(&object.key, scope))
            .map(|object| {
                let last_modified = DateTime::parse_from_rfc3339(&object.last_modified)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
                ListedFile::new(object.key, object.size, last_modified)
            })
            .collect();

        Ok(files)
    }

    async fn move_file(&self, old_path: &str, new_path: &str) -> StorageResult<bool> {
        self.copy(old_path, new_path)
            .await
            .map_err(|e| e.logged(PROVIDER, "move", old_path))?;

        // Both keys exist if this fails
        self.remove(old_path)
            .await
            .map_err(|e| e.logged(PROVIDER, "move", old_path))?;

        debug!(
            "Moved '{}' to '{}' in bucket '{}'",
            old_path,
            new_path,
            self.bucket.name()
        );
        Ok(true)
    }
}
