//! Database setup and initialization

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use vitrine_core::Config;

/// Open the SQLite pool and apply pending migrations
pub async fn setup_database(config: &Config) -> Result<SqlitePool> {
    tracing::info!("Connecting to database...");
    let pool = vitrine_db::connect(config)
        .await
        .context("Failed to open database")?;
    tracing::info!("Database migrations applied");
    Ok(pool)
}
