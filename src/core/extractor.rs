use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;

/// Custom JSON extractor that provides consistent error responses
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(AppJsonRejection(rejection)),
        }
    }
}

pub struct AppJsonRejection(JsonRejection);

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        let message = match self.0 {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
            JsonRejection::MissingJsonContentType(err) => {
                format!("Missing JSON content type: {}", err)
            }
            _ => "Failed to parse JSON body".to_string(),
        };

        AppError::BadRequest(message).into_response()
    }
}

/// Query string extractor that reports missing or malformed parameters
/// through the standard error envelope
pub struct AppQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection: QueryRejection| {
                AppError::BadRequest(format!("Invalid query parameters: {}", rejection.body_text()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct PathParams {
        path: String,
    }

    #[tokio::test]
    async fn test_app_query_extracts_parameters() {
        let (mut parts, _) = Request::builder()
            .uri("/api/documents/download?path=org1%2Fa_1.txt")
            .body(())
            .unwrap()
            .into_parts();

        let AppQuery(params) = AppQuery::<PathParams>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(params.path, "org1/a_1.txt");
    }

    #[tokio::test]
    async fn test_app_query_missing_parameter_is_bad_request() {
        let (mut parts, _) = Request::builder()
            .uri("/api/documents/download")
            .body(())
            .unwrap()
            .into_parts();

        let err = match AppQuery::<PathParams>::from_request_parts(&mut parts, &()).await {
            Ok(_) => panic!("missing path should be rejected"),
            Err(err) => err,
        };
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
