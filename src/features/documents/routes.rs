use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::documents::dtos::MAX_FILE_SIZE;
use crate::features::documents::handlers::{
    delete_document, download_document, get_signed_url, list_documents, move_document,
    upload_document,
};
use crate::features::documents::services::DocumentStorageService;

/// Create routes for the documents feature
pub fn routes(document_service: Arc<DocumentStorageService>) -> Router {
    Router::new()
        .route(
            "/api/documents/upload",
            // Allow body size up to MAX_FILE_SIZE + buffer for multipart overhead
            post(upload_document).layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024)),
        )
        .route("/api/documents/download", get(download_document))
        .route("/api/documents/signed-url", get(get_signed_url))
        .route("/api/documents/move", post(move_document))
        .route(
            "/api/documents",
            get(list_documents).delete(delete_document),
        )
        .with_state(document_service)
}
