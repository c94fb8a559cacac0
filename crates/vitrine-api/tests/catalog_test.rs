//! Template, export and docs integration tests.

mod helpers;

use helpers::{api_path, setup_test_app};

#[tokio::test]
async fn test_template_download() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/templates/city-articles")).await;

    response.assert_status_ok();
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"city-articles-template.csv\""
    );
    let text = response.text();
    assert!(text.starts_with("\u{feff}city_slug,title,slug,"));
    assert!(text.contains("\r\n"));
}

#[tokio::test]
async fn test_every_entity_has_template_and_export() {
    let app = setup_test_app().await;

    for entity in ["brands", "categories", "products", "cities", "city-articles", "filters"] {
        app.client()
            .get(&api_path(&format!("/templates/{}", entity)))
            .await
            .assert_status_ok();
        app.client()
            .get(&api_path(&format!("/export/{}", entity)))
            .await
            .assert_status_ok();
    }
}

#[tokio::test]
async fn test_unknown_export_entity() {
    let app = setup_test_app().await;

    app.client()
        .get(&api_path("/export/orders"))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/health")
        .add_header("X-Request-ID", "trace-123")
        .await;

    assert_eq!(response.header("X-Request-ID"), "trace-123");
}

#[tokio::test]
async fn test_openapi_document() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/openapi.json").await;

    response.assert_status_ok();
    let spec: serde_json::Value = response.json();
    assert!(spec["paths"]["/api/v1/import/{entity}"].is_object());
}
