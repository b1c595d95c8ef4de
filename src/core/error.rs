use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::modules::storage::StorageError;
use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String, Option<Vec<String>>) {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    None,
                )
            }
            AppError::Storage(e) => match e {
                StorageError::NotFound { path } => {
                    (StatusCode::NOT_FOUND, format!("File not found: {}", path), None)
                }
                StorageError::InvalidPath(msg) => (
                    StatusCode::BAD_REQUEST,
                    msg.clone(),
                    Some(vec![msg.clone()]),
                ),
                StorageError::Credential(msg) => {
                    tracing::error!("Storage credential error: {}", msg);
                    (
                        StatusCode::BAD_GATEWAY,
                        "Storage provider rejected the request".to_string(),
                        None,
                    )
                }
                other => {
                    tracing::error!("Storage error: {}", other);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Storage operation failed".to_string(),
                        None,
                    )
                }
            },
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                Some(vec![msg.clone()]),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = self.status_and_message();
        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_map_to_http_status() {
        let not_found = AppError::from(StorageError::NotFound {
            path: "org1/a.txt".to_string(),
        });
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let invalid = AppError::from(StorageError::InvalidPath("../x".to_string()));
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);

        let credential = AppError::from(StorageError::Credential("expired".to_string()));
        assert_eq!(credential.into_response().status(), StatusCode::BAD_GATEWAY);

        let io = AppError::from(StorageError::Io {
            path: "org1/a.txt".to_string(),
            source: std::io::Error::other("disk full"),
        });
        assert_eq!(
            io.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_error_is_bad_request() {
        let err = AppError::Validation("organization_id is required".to_string());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
