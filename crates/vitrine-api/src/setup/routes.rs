//! Route configuration and setup

use crate::constants::{
    API_PREFIX, IMPORT_CONCURRENCY_LIMIT, MULTIPART_OVERHEAD_BYTES, OPENAPI_PATH,
};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use vitrine_core::Config;
use vitrine_infra::request_id_middleware;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let body_limit = config.max_import_bytes + MULTIPART_OVERHEAD_BYTES;

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            OPENAPI_PATH,
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .merge(import_routes())
        .merge(catalog_routes())
        .with_state(state)
        .nest_service("/media", ServeDir::new(&config.media_root))
        .merge(utoipa_rapidoc::RapiDoc::new(OPENAPI_PATH).path("/docs"))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware));

    tracing::info!(body_limit, "Routes configured");
    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Upload routes, each capped at a few concurrent requests
fn import_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/import/images", API_PREFIX),
            post(handlers::import::refresh_images),
        )
        .route(
            &format!("{}/import/{{entity}}", API_PREFIX),
            post(handlers::import::import_entity),
        )
        .layer(ConcurrencyLimitLayer::new(IMPORT_CONCURRENCY_LIMIT))
}

/// Template and export downloads
fn catalog_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/templates/{{entity}}", API_PREFIX),
            get(handlers::catalog::download_template),
        )
        .route(
            &format!("{}/export/{{entity}}", API_PREFIX),
            get(handlers::catalog::export_entity),
        )
}
