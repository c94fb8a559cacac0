use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use vitrine_core::models::{ImageRefreshReport, ImportReport};
use vitrine_core::EntityKind;
use vitrine_import::ImportRequest;
use vitrine_infra::ErrorResponse;

use super::upload::read_file_field;
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImportQuery {
    /// Create missing brands and categories referenced by product rows.
    #[serde(default)]
    cascade: bool,
}

/// Import a CSV or a ZIP (CSV plus images) into one catalog entity.
///
/// Rows that fail validation are skipped and listed in `errors`; the rest of
/// the batch is committed.
#[utoipa::path(
    post,
    path = "/api/v1/import/{entity}",
    tag = "import",
    params(
        ("entity" = String, Path, description = "brands, categories, products, cities, city-articles or filters"),
        ImportQuery
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Batch imported", body = ImportReport),
        (status = 400, description = "Unknown entity, unknown format or unreadable file", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "import"))]
pub async fn import_entity(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
    Query(query): Query<ImportQuery>,
    multipart: Multipart,
) -> Result<Json<ImportReport>, HttpAppError> {
    let entity: EntityKind = entity.parse()?;
    let upload = read_file_field(multipart, "upload.csv").await?;

    let report = state
        .import
        .import(ImportRequest {
            entity,
            filename: upload.filename,
            bytes: upload.bytes,
            cascade: query.cascade,
        })
        .await?;

    Ok(Json(report))
}

/// Replace product images from a ZIP of photos named after SKUs or slugs.
#[utoipa::path(
    post,
    path = "/api/v1/import/images",
    tag = "import",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Images matched and stored", body = ImageRefreshReport),
        (status = 400, description = "Not a ZIP archive", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "refresh_images"))]
pub async fn refresh_images(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ImageRefreshReport>, HttpAppError> {
    let upload = read_file_field(multipart, "images.zip").await?;
    let report = state
        .import
        .refresh_images(&upload.filename, &upload.bytes)
        .await?;
    Ok(Json(report))
}
