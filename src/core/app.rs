//! HTTP application assembly shared by the server binary and the API tests.

use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::{Config, LocalStorageConfig, ProviderConfig};
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::documents::{routes as documents_routes, DocumentStorageService};
use crate::modules::storage::StorageGateway;

// Simple health check endpoint
async fn health_check() -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}

/// Build the full application router around an already constructed gateway
pub fn build_router(config: &Config, gateway: Arc<StorageGateway>) -> Router {
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    let document_service = Arc::new(DocumentStorageService::new(gateway));
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let mut app = Router::new()
        .merge(swagger)
        .merge(documents_routes::routes(document_service))
        .merge(health_route);

    // Local URLs returned by the gateway are only reachable through this mount
    if let ProviderConfig::Local(local) = &config.storage.provider {
        app = app.nest_service(&local.public_url_prefix, static_uploads(local));
    }

    app.layer(axum::extract::DefaultBodyLimit::max(
        config.app.max_request_body_size,
    ))
    .layer(middleware::cors_layer(
        config.app.cors_allowed_origins.clone(),
    ))
    // Propagate X-Request-Id to response headers
    .layer(PropagateRequestIdLayer::x_request_id())
    .layer(
        TraceLayer::new_for_http()
            .make_span_with(middleware::MakeSpanWithRequestId)
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
    // Generate X-Request-Id using UUID v7 (or use client-provided one)
    .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}

fn static_uploads(config: &LocalStorageConfig) -> ServeDir {
    tracing::info!(
        "Serving local uploads from {} at {}",
        config.upload_path.display(),
        config.public_url_prefix
    );
    ServeDir::new(&config.upload_path)
}
