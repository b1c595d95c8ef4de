use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::documents::dtos::{
    is_mime_type_allowed, DeleteDocumentDto, DeleteDocumentResponseDto, DocumentPathQuery,
    DocumentUploadResponseDto, ListDocumentsQuery, MoveDocumentDto, MoveDocumentResponseDto,
    SignedUrlQuery, SignedUrlResponseDto, StoredDocumentDto, UploadDocumentDto,
    ALLOWED_MIME_TYPES, MAX_FILE_SIZE,
};
use crate::features::documents::services::{DocumentOwner, DocumentStorageService};
use crate::modules::storage::{file_name_of, DEFAULT_SIGNED_URL_EXPIRY_SECS};
use crate::shared::constants::DEFAULT_CONTENT_TYPE;
use crate::shared::types::{ApiResponse, Meta};

/// Upload a document
///
/// Accepts multipart/form-data with:
/// - `file`: The file to upload (required)
/// - `organization_id`, `entity_id`, `document_type`: path namespace (required)
#[utoipa::path(
    post,
    path = "/api/documents/upload",
    tag = "documents",
    request_body(
        content = UploadDocumentDto,
        content_type = "multipart/form-data",
        description = "Document upload form with the owning organization, entity and document type",
    ),
    responses(
        (status = 201, description = "Document uploaded successfully", body = ApiResponse<DocumentUploadResponseDto>),
        (status = 400, description = "Invalid file or validation error"),
        (status = 413, description = "File too large")
    )
)]
pub async fn upload_document(
    State(service): State<Arc<DocumentStorageService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<DocumentUploadResponseDto>>), AppError> {
    let mut file_data: Option<Bytes> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut organization_id: Option<String> = None;
    let mut entity_id: Option<String> = None;
    let mut document_type: Option<String> = None;

    // Process multipart fields
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let ct = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

                let fname = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                file_data = Some(data);
                file_name = Some(fname);
                content_type = Some(ct);
            }
            "organization_id" | "entity_id" | "document_type" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read {} field: {}", field_name, e))
                })?;
                let value = Some(text.trim().to_string()).filter(|v| !v.is_empty());
                match field_name.as_str() {
                    "organization_id" => organization_id = value,
                    "entity_id" => entity_id = value,
                    _ => document_type = value,
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    // Validate required fields
    let file_data =
        file_data.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    let file_name =
        file_name.ok_or_else(|| AppError::BadRequest("Filename is required".to_string()))?;
    let content_type =
        content_type.ok_or_else(|| AppError::BadRequest("Content type is required".to_string()))?;
    let owner = DocumentOwner {
        organization_id: organization_id
            .ok_or_else(|| AppError::Validation("organization_id is required".to_string()))?,
        entity_id: entity_id
            .ok_or_else(|| AppError::Validation("entity_id is required".to_string()))?,
        document_type: document_type
            .ok_or_else(|| AppError::Validation("document_type is required".to_string()))?,
    };

    if file_data.len() > MAX_FILE_SIZE {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} bytes ({} MB)",
            MAX_FILE_SIZE,
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    if !is_mime_type_allowed(&content_type) {
        return Err(AppError::BadRequest(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            content_type,
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }

    let response = service
        .upload_document(file_data, &file_name, &content_type, &owner)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(response), None, None)),
    ))
}

/// Download a document
#[utoipa::path(
    get,
    path = "/api/documents/download",
    tag = "documents",
    params(DocumentPathQuery),
    responses(
        (status = 200, description = "Document content", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid path"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn download_document(
    State(service): State<Arc<DocumentStorageService>>,
    AppQuery(query): AppQuery<DocumentPathQuery>,
) -> Result<Response, AppError> {
    let stream = service.download_document(&query.path).await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        file_name_of(&query.path).replace('"', "")
    );

    Ok((
        [
            (header::CONTENT_TYPE, DEFAULT_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

/// Delete a document
#[utoipa::path(
    delete,
    path = "/api/documents",
    tag = "documents",
    request_body = DeleteDocumentDto,
    responses(
        (status = 200, description = "Document deleted successfully", body = ApiResponse<DeleteDocumentResponseDto>),
        (status = 400, description = "Invalid path"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn delete_document(
    State(service): State<Arc<DocumentStorageService>>,
    AppJson(dto): AppJson<DeleteDocumentDto>,
) -> Result<Json<ApiResponse<DeleteDocumentResponseDto>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let deleted = service.delete_document(&dto.path).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteDocumentResponseDto { deleted }),
        Some("Document deleted successfully".to_string()),
        None,
    )))
}

/// Get a time-limited URL for a document
///
/// Local storage returns a static URL without expiry.
#[utoipa::path(
    get,
    path = "/api/documents/signed-url",
    tag = "documents",
    params(SignedUrlQuery),
    responses(
        (status = 200, description = "Signed URL generated", body = ApiResponse<SignedUrlResponseDto>),
        (status = 400, description = "Invalid path or expiry")
    )
)]
pub async fn get_signed_url(
    State(service): State<Arc<DocumentStorageService>>,
    AppQuery(query): AppQuery<SignedUrlQuery>,
) -> Result<Json<ApiResponse<SignedUrlResponseDto>>, AppError> {
    let url = service.signed_url(&query.path, query.expires_in).await?;

    Ok(Json(ApiResponse::success(
        Some(SignedUrlResponseDto {
            url,
            expires_in: query.expires_in.unwrap_or(DEFAULT_SIGNED_URL_EXPIRY_SECS),
        }),
        None,
        None,
    )))
}

/// List stored documents
#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "documents",
    params(ListDocumentsQuery),
    responses(
        (status = 200, description = "Documents under the prefix", body = ApiResponse<Vec<StoredDocumentDto>>),
        (status = 400, description = "Invalid prefix")
    )
)]
pub async fn list_documents(
    State(service): State<Arc<DocumentStorageService>>,
    AppQuery(query): AppQuery<ListDocumentsQuery>,
) -> Result<Json<ApiResponse<Vec<StoredDocumentDto>>>, AppError> {
    let documents = service.list_documents(query.prefix.as_deref()).await?;
    let total = documents.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(documents),
        None,
        Some(Meta { total }),
    )))
}

/// Move a document to a new path
///
/// Not atomic: on failure the document may exist at both paths.
#[utoipa::path(
    post,
    path = "/api/documents/move",
    tag = "documents",
    request_body = MoveDocumentDto,
    responses(
        (status = 200, description = "Document moved", body = ApiResponse<MoveDocumentResponseDto>),
        (status = 400, description = "Invalid path"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn move_document(
    State(service): State<Arc<DocumentStorageService>>,
    AppJson(dto): AppJson<MoveDocumentDto>,
) -> Result<Json<ApiResponse<MoveDocumentResponseDto>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let moved = service.move_document(&dto.old_path, &dto.new_path).await?;

    Ok(Json(ApiResponse::success(
        Some(MoveDocumentResponseDto {
            moved,
            path: dto.new_path,
        }),
        Some("Document moved successfully".to_string()),
        None,
    )))
}
