use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use vitrine_core::EntityKind;
use vitrine_infra::ErrorResponse;

use crate::error::HttpAppError;
use crate::state::AppState;

fn csv_attachment(filename: String, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

/// CSV template with the importer's columns and example rows.
#[utoipa::path(
    get,
    path = "/api/v1/templates/{entity}",
    tag = "catalog",
    params(("entity" = String, Path, description = "Entity selector")),
    responses(
        (status = 200, description = "CSV template", content_type = "text/csv", body = String),
        (status = 400, description = "Unknown entity", body = ErrorResponse)
    )
)]
pub async fn download_template(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
) -> Result<Response, HttpAppError> {
    let entity: EntityKind = entity.parse()?;
    Ok(csv_attachment(
        format!("{}-template.csv", entity),
        state.import.template(entity),
    ))
}

/// Current catalog rows in the native import format.
#[utoipa::path(
    get,
    path = "/api/v1/export/{entity}",
    tag = "catalog",
    params(("entity" = String, Path, description = "Entity selector")),
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv", body = String),
        (status = 400, description = "Unknown entity", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn export_entity(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
) -> Result<Response, HttpAppError> {
    let entity: EntityKind = entity.parse()?;
    let csv = state.import.export(entity).await?;
    Ok(csv_attachment(format!("{}.csv", entity), csv))
}
