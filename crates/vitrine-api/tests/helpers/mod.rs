//! Test helpers: build AppState and router for integration tests.
//!
//! Each test gets its own in-memory SQLite database and temporary media root.

pub mod fixtures;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;
use vitrine_api::constants::API_PREFIX;
use vitrine_api::setup::routes;
use vitrine_api::state::AppState;
use vitrine_core::Config;
use vitrine_import::ImportService;
use vitrine_storage::LocalMediaStore;

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

/// Test application: server, pool, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub pool: SqlitePool,
    pub _media: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Setup test app with isolated DB and local storage.
pub async fn setup_test_app() -> TestApp {
    let media = tempfile::tempdir().expect("Failed to create temp directory");
    let config = Config::local("sqlite::memory:", media.path());

    let pool = vitrine_db::connect_in_memory()
        .await
        .expect("Failed to open test database");
    let store = LocalMediaStore::new(media.path())
        .await
        .expect("Failed to create local storage");

    let import = ImportService::from_config(pool.clone(), Arc::new(store), &config);
    let state = Arc::new(AppState::new(config.clone(), pool.clone(), import));
    let router = routes::setup_routes(&config, state).expect("Failed to build routes");

    TestApp {
        server: TestServer::new(router).expect("Failed to start test server"),
        pool,
        _media: media,
    }
}

/// Multipart body with a single `file` part.
pub fn file_form(filename: &str, bytes: Vec<u8>) -> MultipartForm {
    let mime = if filename.ends_with(".zip") {
        "application/zip"
    } else {
        "text/csv"
    };
    MultipartForm::new().add_part("file", Part::bytes(bytes).file_name(filename).mime_type(mime))
}
