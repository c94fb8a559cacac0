//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use vitrine_core::Config;
use vitrine_import::ImportService;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    vitrine_infra::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(environment = %config.environment, "Configuration loaded and validated");

    let pool = database::setup_database(&config).await?;
    let store = storage::setup_storage(&config).await?;

    let import = ImportService::from_config(pool.clone(), store, &config);
    let state = Arc::new(AppState::new(config.clone(), pool, import));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
