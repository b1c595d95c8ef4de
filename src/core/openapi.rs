use utoipa::{Modify, OpenApi};

use crate::features::documents::{dtos as documents_dtos, handlers as documents_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        documents_handlers::upload_document,
        documents_handlers::download_document,
        documents_handlers::delete_document,
        documents_handlers::get_signed_url,
        documents_handlers::list_documents,
        documents_handlers::move_document,
    ),
    components(
        schemas(
            Meta,
            documents_dtos::UploadDocumentDto,
            documents_dtos::DocumentUploadResponseDto,
            documents_dtos::StoredDocumentDto,
            documents_dtos::SignedUrlResponseDto,
            documents_dtos::DeleteDocumentDto,
            documents_dtos::DeleteDocumentResponseDto,
            documents_dtos::MoveDocumentDto,
            documents_dtos::MoveDocumentResponseDto,
            ApiResponse<documents_dtos::DocumentUploadResponseDto>,
            ApiResponse<Vec<documents_dtos::StoredDocumentDto>>,
            ApiResponse<documents_dtos::SignedUrlResponseDto>,
            ApiResponse<documents_dtos::DeleteDocumentResponseDto>,
            ApiResponse<documents_dtos::MoveDocumentResponseDto>,
        )
    ),
    tags(
        (name = "documents", description = "GRC document storage (policies, evidence, audit files)"),
    ),
    info(
        title = "GRC Storage API",
        version = "0.1.0",
        description = "Document storage gateway over local, S3, Azure Blob and GCS backends",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
