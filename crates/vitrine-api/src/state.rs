//! Application state shared by every handler.

use sqlx::SqlitePool;
use vitrine_core::Config;
use vitrine_import::ImportService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db_pool: SqlitePool,
    pub import: ImportService,
}

impl AppState {
    pub fn new(config: Config, db_pool: SqlitePool, import: ImportService) -> Self {
        Self {
            config,
            db_pool,
            import,
        }
    }
}
