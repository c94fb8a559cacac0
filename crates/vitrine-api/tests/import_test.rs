//! Import API integration tests.
//!
//! Run with: `cargo test -p vitrine-api --test import_test`

mod helpers;

use helpers::fixtures::{create_jpeg, create_zip};
use helpers::{api_path, file_form, setup_test_app};
use serde_json::Value;
use vitrine_db::ProductRepository;

#[tokio::test]
async fn test_health() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["database"], "healthy");
    assert!(response.maybe_header("X-Request-ID").is_some());
}

#[tokio::test]
async fn test_import_brands_then_export() {
    let app = setup_test_app().await;
    let client = app.client();
    let csv = "name,slug,country\nTissot,tissot,Швейцария\nCasio,,Япония\n";

    let response = client
        .post(&api_path("/import/brands"))
        .multipart(file_form("brands.csv", csv.as_bytes().to_vec()))
        .await;

    response.assert_status_ok();
    let report: Value = response.json();
    assert_eq!(report["entity"], "brands");
    assert_eq!(report["format"], "native");
    assert_eq!(report["added"], 2);
    assert_eq!(report["updated"], 0);
    assert_eq!(report["errors"].as_array().map(Vec::len), Some(0));

    let again: Value = client
        .post(&api_path("/import/brands"))
        .multipart(file_form("brands.csv", csv.as_bytes().to_vec()))
        .await
        .json();
    assert_eq!(again["added"], 0);
    assert_eq!(again["updated"], 2);

    let export = client.get(&api_path("/export/brands")).await;
    export.assert_status_ok();
    assert!(export
        .header("content-type")
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let text = export.text();
    assert!(text.contains("Tissot,tissot,"));
    assert!(text.contains("Casio,casio,"));
}

#[tokio::test]
async fn test_row_errors_are_reported_with_line_numbers() {
    let app = setup_test_app().await;
    let csv = "sku,name,price,stock\nA1,First,100,1\nA2,Second,abc,1\nA3,Third,100,-2\n";

    let report: Value = app
        .client()
        .post(&api_path("/import/products"))
        .multipart(file_form("products.csv", csv.as_bytes().to_vec()))
        .await
        .json();

    assert_eq!(report["added"], 1);
    let errors = report["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["row"], 3);
    assert_eq!(errors[0]["field"], "price");
    assert_eq!(errors[1]["row"], 4);
    assert_eq!(errors[1]["field"], "stock");
}

#[tokio::test]
async fn test_supplier_products_with_cascade() {
    let app = setup_test_app().await;
    let csv = "Бренд,Модель,Артикул,Пол,Цена\nImaginary Brand,One,IB-1,Унисекс,1000\n";

    let response = app
        .client()
        .post(&api_path("/import/products?cascade=true"))
        .multipart(file_form("supplier.csv", csv.as_bytes().to_vec()))
        .await;

    response.assert_status_ok();
    let report: Value = response.json();
    assert_eq!(report["format"], "supplier");
    assert_eq!(report["added"], 1);
    assert_eq!(report["createdBrands"][0], "imaginary-brand");
    assert_eq!(report["createdCategories"][0], "unisex");
}

#[tokio::test]
async fn test_unknown_entity_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/import/widgets"))
        .multipart(file_form("widgets.csv", b"name\nx\n".to_vec()))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], "UNKNOWN_ENTITY");
}

#[tokio::test]
async fn test_unknown_format_lists_expected_columns() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/import/products"))
        .multipart(file_form("products.csv", b"foo,bar\n1,2\n".to_vec()))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], "UNKNOWN_CSV_FORMAT");
    assert!(body["details"].as_str().unwrap().contains("sku"));
}

#[tokio::test]
async fn test_missing_file_field_is_rejected() {
    let app = setup_test_app().await;
    let form = axum_test::multipart::MultipartForm::new().add_text("note", "no file");

    let response = app
        .client()
        .post(&api_path("/import/brands"))
        .multipart(form)
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_archive_import_serves_processed_images() {
    let app = setup_test_app().await;
    let archive = create_zip(&[
        (
            "products.csv",
            b"sku,name,price,main_image\nW-1,Watch,100,watch.jpg\n".to_vec(),
        ),
        ("watch.jpg", create_jpeg(3)),
    ]);

    let report: Value = app
        .client()
        .post(&api_path("/import/products"))
        .multipart(file_form("upload.zip", archive))
        .await
        .json();
    assert_eq!(report["added"], 1);
    assert_eq!(report["imagesProcessed"], 1);

    let mut conn = app.pool().acquire().await.unwrap();
    let product = ProductRepository::find_by_sku(&mut conn, "W-1")
        .await
        .unwrap()
        .unwrap();
    let images = ProductRepository::list_images(&mut conn, product.id)
        .await
        .unwrap();
    drop(conn);

    let media = app.client().get(&images[0].url).await;
    media.assert_status_ok();
    assert_eq!(media.header("content-type"), "image/webp");
}

#[tokio::test]
async fn test_refresh_images_endpoint() {
    let app = setup_test_app().await;
    let client = app.client();
    client
        .post(&api_path("/import/products"))
        .multipart(file_form(
            "products.csv",
            b"sku,name,price\nGA-2100,Casio GA-2100,9990\n".to_vec(),
        ))
        .await
        .assert_status_ok();

    let archive = create_zip(&[
        ("GA-2100.jpg", create_jpeg(1)),
        ("GA-2100_2.jpg", create_jpeg(2)),
        ("unknown.jpg", create_jpeg(4)),
    ]);
    let response = client
        .post(&api_path("/import/images"))
        .multipart(file_form("images.zip", archive))
        .await;

    response.assert_status_ok();
    let report: Value = response.json();
    assert_eq!(report["imagesProcessed"], 3);
    assert_eq!(report["matched"], 2);
    assert_eq!(report["productsUpdated"], 1);
    assert_eq!(report["unmatched"][0], "unknown.jpg");
}

#[tokio::test]
async fn test_refresh_images_requires_zip() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/import/images"))
        .multipart(file_form("images.csv", b"sku\nA\n".to_vec()))
        .await;

    response.assert_status_bad_request();
}
