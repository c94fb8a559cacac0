//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers;
use vitrine_core::models;
use vitrine_infra::ErrorResponse;

/// Returns the OpenAPI spec served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vitrine Import API",
        version = "0.1.0",
        description = "Bulk catalog import for the watch store: CSV and ZIP uploads, image refresh, templates and exports. Catalog routes are versioned under /api/v1/."
    ),
    paths(
        handlers::import::import_entity,
        handlers::import::refresh_images,
        handlers::catalog::download_template,
        handlers::catalog::export_entity,
        handlers::health::health_check,
    ),
    components(schemas(
        models::ImportReport,
        models::ImportError,
        models::ImportResult,
        models::ImageRefreshReport,
        models::EntityKind,
        models::SourceFormat,
        ErrorResponse,
        handlers::health::HealthResponse,
    )),
    tags(
        (name = "import", description = "CSV and archive uploads"),
        (name = "catalog", description = "Templates and exports"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_import_routes() {
        let spec = get_openapi_spec();
        assert!(spec.paths.paths.contains_key("/api/v1/import/{entity}"));
        assert!(spec.paths.paths.contains_key("/api/v1/import/images"));
        assert!(spec.paths.paths.contains_key("/api/v1/export/{entity}"));
    }
}
