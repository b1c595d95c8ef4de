use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::modules::storage::{ListedFile, UploadResult};

/// Upload document request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadDocumentDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Organization owning the document
    #[schema(example = "org1")]
    pub organization_id: String,
    /// Entity the document belongs to (control, task, audit, ...)
    #[schema(example = "entity1")]
    pub entity_id: String,
    /// Document category
    #[schema(example = "policy")]
    pub document_type: String,
}

/// Response DTO for an uploaded document
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentUploadResponseDto {
    /// Storage path of the document
    pub path: String,
    /// Provider locator for the document
    pub url: String,
    /// Size of the file in bytes
    pub size: u64,
    /// Original filename as uploaded
    pub original_filename: String,
    /// MIME type of the file
    pub content_type: String,
}

impl DocumentUploadResponseDto {
    pub fn from_result(result: UploadResult, original_filename: String, content_type: String) -> Self {
        Self {
            path: result.path,
            url: result.url,
            size: result.size,
            original_filename,
            content_type,
        }
    }
}

/// One stored document in a listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoredDocumentDto {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

impl From<ListedFile> for StoredDocumentDto {
    fn from(file: ListedFile) -> Self {
        Self {
            name: file.name,
            path: file.path,
            size: file.size,
            last_modified: file.last_modified,
        }
    }
}

/// Query parameters addressing a single document
#[derive(Debug, Deserialize, IntoParams)]
pub struct DocumentPathQuery {
    /// Storage path of the document
    pub path: String,
}

/// Query parameters for signed URL generation
#[derive(Debug, Deserialize, IntoParams)]
pub struct SignedUrlQuery {
    /// Storage path of the document
    pub path: String,
    /// URL lifetime in seconds (default: 3600)
    #[param(minimum = 1, maximum = 604800)]
    pub expires_in: Option<u64>,
}

/// Query parameters for listing documents
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListDocumentsQuery {
    /// Only list documents under this path prefix
    pub prefix: Option<String>,
}

/// Response DTO for signed URL generation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignedUrlResponseDto {
    pub url: String,
    pub expires_in: u64,
}

/// Request DTO for deleting a document
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeleteDocumentDto {
    /// Storage path of the document to delete
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteDocumentResponseDto {
    /// Confirmation that the document was deleted
    pub deleted: bool,
}

/// Request DTO for relocating a document
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MoveDocumentDto {
    #[validate(length(min = 1, message = "old_path is required"))]
    pub old_path: String,
    #[validate(length(min = 1, message = "new_path is required"))]
    pub new_path: String,
}

/// Response DTO for move operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MoveDocumentResponseDto {
    pub moved: bool,
    /// New storage path of the document
    pub path: String,
}

/// Allowed MIME types for document uploads
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "text/csv",
    "image/png",
    "image/jpeg",
    "image/gif",
];

/// Maximum document size in bytes (50MB)
pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// Longest signed URL lifetime accepted from callers (7 days)
pub const MAX_SIGNED_URL_EXPIRY_SECS: u64 = 7 * 24 * 3600;

/// Check if a MIME type is allowed
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_office_and_pdf_types_are_allowed() {
        assert!(is_mime_type_allowed("application/pdf"));
        assert!(is_mime_type_allowed(
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        ));
        assert!(is_mime_type_allowed("text/plain"));
    }

    #[test]
    fn test_executables_are_rejected() {
        assert!(!is_mime_type_allowed("application/x-msdownload"));
        assert!(!is_mime_type_allowed("text/html"));
    }

    #[test]
    fn test_move_dto_requires_both_paths() {
        let dto = MoveDocumentDto {
            old_path: "org1/a_1.txt".to_string(),
            new_path: String::new(),
        };
        assert!(dto.validate().is_err());
    }
}
