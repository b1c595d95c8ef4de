use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::error::{AppError, Result};
use crate::features::documents::dtos::{
    DocumentUploadResponseDto, StoredDocumentDto, MAX_SIGNED_URL_EXPIRY_SECS,
};
use crate::modules::storage::{ByteStream, Metadata, ProviderKind, StorageGateway, UploadFile};
use crate::shared::constants::{
    META_DOCUMENT_TYPE, META_ENTITY_ID, META_ORGANIZATION_ID, META_ORIGINAL_NAME,
};
use crate::shared::validation::{is_valid_storage_path, PATH_SEGMENT_REGEX};

/// Document owner coordinates used to namespace storage paths
#[derive(Debug, Clone)]
pub struct DocumentOwner {
    pub organization_id: String,
    pub entity_id: String,
    pub document_type: String,
}

impl DocumentOwner {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("organization_id", &self.organization_id),
            ("entity_id", &self.entity_id),
            ("document_type", &self.document_type),
        ] {
            if !PATH_SEGMENT_REGEX.is_match(value) {
                return Err(AppError::Validation(format!(
                    "{} must contain only letters, digits, '-' or '_'",
                    field
                )));
            }
        }
        Ok(())
    }

    fn metadata(&self, original_filename: &str) -> Metadata {
        Metadata::from([
            (
                META_ORGANIZATION_ID.to_string(),
                self.organization_id.clone(),
            ),
            (META_ENTITY_ID.to_string(), self.entity_id.clone()),
            (META_DOCUMENT_TYPE.to_string(), self.document_type.clone()),
            (META_ORIGINAL_NAME.to_string(), original_filename.to_string()),
        ])
    }
}

/// Caller-side document operations on top of the storage gateway
pub struct DocumentStorageService {
    gateway: Arc<StorageGateway>,
}

impl DocumentStorageService {
    pub fn new(gateway: Arc<StorageGateway>) -> Self {
        Self { gateway }
    }

    pub fn provider_kind(&self) -> ProviderKind {
        self.gateway.provider_kind()
    }

    fn check_path(path: &str) -> Result<()> {
        if is_valid_storage_path(path) {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "'{}' is not a valid document path",
                path
            )))
        }
    }

    /// Store a document under a freshly generated path
    pub async fn upload_document(
        &self,
        data: impl Into<Bytes>,
        original_filename: &str,
        content_type: &str,
        owner: &DocumentOwner,
    ) -> Result<DocumentUploadResponseDto> {
        owner.validate()?;

        let path = self.gateway.generate_file_path(
            &owner.organization_id,
            &owner.entity_id,
            &owner.document_type,
            original_filename,
        );
        let metadata = owner.metadata(original_filename);
        let file = UploadFile::new(data, content_type, original_filename);

        let result = self.gateway.upload(file, &path, Some(&metadata)).await?;

        info!(
            "Document stored: path={}, size={}, provider={}",
            result.path,
            result.size,
            self.gateway.provider_kind()
        );

        Ok(DocumentUploadResponseDto::from_result(
            result,
            original_filename.to_string(),
            content_type.to_string(),
        ))
    }

    pub async fn download_document(&self, path: &str) -> Result<ByteStream> {
        Self::check_path(path)?;
        Ok(self.gateway.download(path).await?)
    }

    pub async fn delete_document(&self, path: &str) -> Result<bool> {
        Self::check_path(path)?;
        let deleted = self.gateway.delete(path).await?;
        info!("Document deleted: path={}", path);
        Ok(deleted)
    }

    pub async fn signed_url(&self, path: &str, expires_in: Option<u64>) -> Result<String> {
        Self::check_path(path)?;
        if let Some(secs) = expires_in {
            if secs == 0 || secs > MAX_SIGNED_URL_EXPIRY_SECS {
                return Err(AppError::Validation(format!(
                    "expires_in must be between 1 and {} seconds",
                    MAX_SIGNED_URL_EXPIRY_SECS
                )));
            }
        }
        Ok(self.gateway.get_signed_url(path, expires_in).await?)
    }

    pub async fn list_documents(&self, prefix: Option<&str>) -> Result<Vec<StoredDocumentDto>> {
        let prefix = prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty());
        if let Some(prefix) = prefix {
            Self::check_path(prefix)?;
        }

        let files = self.gateway.list(prefix).await?;
        debug!(
            "Listed {} documents under '{}'",
            files.len(),
            prefix.unwrap_or("")
        );

        Ok(files.into_iter().map(StoredDocumentDto::from).collect())
    }

    pub async fn move_document(&self, old_path: &str, new_path: &str) -> Result<bool> {
        Self::check_path(old_path)?;
        Self::check_path(new_path)?;
        if old_path == new_path {
            return Err(AppError::BadRequest(
                "old_path and new_path must differ".to_string(),
            ));
        }

        let moved = self.gateway.move_file(old_path, new_path).await?;
        info!("Document moved: {} -> {}", old_path, new_path);
        Ok(moved)
    }
}
