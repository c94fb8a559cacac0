//! Import orchestration.
//!
//! [`ImportService`] owns the whole control flow of one upload: size checks,
//! archive split, parsing, format detection, supplier conversion, image
//! reference resolution and the transactional write.

use std::collections::BTreeMap;
use std::sync::Arc;

use sqlx::{SqliteConnection, SqlitePool};
use vitrine_core::models::{ImageRefreshReport, ImportReport, ImportResult, SourceFormat};
use vitrine_core::{AppError, Config, EntityKind, ImageSettings};
use vitrine_db::ImportTransaction;
use vitrine_storage::MediaStore;

use crate::archive::{
    decode_text, extract_images, extract_import, image_columns, is_zip, resolve_image_references,
    ExtractedImages,
};
use crate::cascade::{create_missing_taxonomy, CascadeOutcome};
use crate::csv::{parse, Row};
use crate::export::export_csv;
use crate::format::{convert, detect, expected_columns, DetectedFormat};
use crate::importers::{
    run_import, BrandImporter, CategoryImporter, CityArticleImporter, CityImporter,
    FilterImporter, ProductImporter,
};
use crate::matcher::{match_images_to_products, update_product_images, ProductIndex};
use crate::templates::template_csv;

/// One uploaded file to import.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub entity: EntityKind,
    /// Upload filename, used for ZIP detection and recorded on city articles.
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Auto-create missing brands and categories before a product import.
    pub cascade: bool,
}

/// Rows ready for the importers, plus what the preparation steps learned.
struct PreparedBatch {
    rows: Vec<Row>,
    format: SourceFormat,
    brand_names: BTreeMap<String, String>,
    category_names: BTreeMap<String, String>,
    images: Option<ExtractedImages>,
}

#[derive(Clone)]
pub struct ImportService {
    pool: SqlitePool,
    store: Arc<dyn MediaStore>,
    settings: ImageSettings,
    max_import_bytes: usize,
}

impl ImportService {
    pub fn new(
        pool: SqlitePool,
        store: Arc<dyn MediaStore>,
        settings: ImageSettings,
        max_import_bytes: usize,
    ) -> Self {
        Self {
            pool,
            store,
            settings,
            max_import_bytes,
        }
    }

    pub fn from_config(pool: SqlitePool, store: Arc<dyn MediaStore>, config: &Config) -> Self {
        Self::new(pool, store, config.image.clone(), config.max_import_bytes)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn check_size(&self, bytes: &[u8]) -> Result<(), AppError> {
        if bytes.is_empty() {
            return Err(AppError::InvalidInput("File is empty".to_string()));
        }
        if bytes.len() > self.max_import_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "{} bytes exceeds the {} byte limit",
                bytes.len(),
                self.max_import_bytes
            )));
        }
        Ok(())
    }

    /// Import one CSV or ZIP upload into `request.entity`.
    ///
    /// Row-level problems end up in the report; anything batch-fatal is
    /// returned as an error and nothing is written.
    #[tracing::instrument(
        skip(self, request),
        fields(entity = %request.entity, filename = %request.filename, bytes = request.bytes.len())
    )]
    pub async fn import(&self, request: ImportRequest) -> Result<ImportReport, AppError> {
        self.check_size(&request.bytes)?;
        let entity = request.entity;

        let batch = self.prepare(&request).await?;

        let mut tx = ImportTransaction::begin(&self.pool).await?;
        let written = write_batch(tx.conn(), &request, &batch).await;
        let (result, cascade) = match written {
            Ok(written) => {
                tx.commit().await?;
                written
            }
            Err(err) => {
                tracing::warn!(error = %err, "Import aborted, rolling back");
                tx.rollback().await?;
                return Err(err);
            }
        };

        let (images_processed, image_errors) = match &batch.images {
            Some(images) => (images.processed(), images.errors()),
            None => (0, Vec::new()),
        };

        Ok(ImportReport {
            entity,
            format: batch.format,
            added: result.added,
            updated: result.updated,
            errors: result.errors,
            images_processed,
            image_errors,
            created_brands: cascade.brands,
            created_categories: cascade.categories,
        })
    }

    async fn prepare(&self, request: &ImportRequest) -> Result<PreparedBatch, AppError> {
        let entity = request.entity;

        let (csv_text, images) = if is_zip(&request.filename, &request.bytes) {
            let extracted = extract_import(
                &request.bytes,
                entity,
                self.store.as_ref(),
                &self.settings,
                self.max_import_bytes,
            )
            .await?;
            tracing::debug!(csv = %extracted.csv_name, "CSV found in archive");
            (extracted.csv_text, Some(extracted.images))
        } else {
            (decode_text(&request.bytes)?, None)
        };

        let parsed = parse(&csv_text);
        if parsed.headers.is_empty() {
            return Err(AppError::InvalidInput("CSV file is empty".to_string()));
        }

        let mut batch = PreparedBatch {
            rows: parsed.rows,
            format: SourceFormat::Native,
            brand_names: BTreeMap::new(),
            category_names: BTreeMap::new(),
            images,
        };

        match detect(&parsed.headers) {
            DetectedFormat::Native => {}
            DetectedFormat::Supplier if entity == EntityKind::Products => {
                let conversion = convert(&batch.rows)?;
                tracing::info!(
                    rows = conversion.rows.len(),
                    brands = conversion.brand_names.len(),
                    "Supplier CSV converted"
                );
                batch.rows = conversion.rows;
                batch.brand_names = conversion.brand_names;
                batch.category_names = conversion.category_names;
                batch.format = SourceFormat::Supplier;
            }
            DetectedFormat::Supplier => {
                return Err(AppError::BadRequest(format!(
                    "Supplier format can only be imported as products, not {}",
                    entity
                )));
            }
            DetectedFormat::Unknown => {
                return Err(AppError::UnknownFormat {
                    expected: expected_columns(),
                });
            }
        }

        if let Some(images) = &batch.images {
            let resolved =
                resolve_image_references(&mut batch.rows, &images.image_map, image_columns(entity));
            tracing::debug!(resolved, "Image references resolved");
        }

        Ok(batch)
    }

    /// Match the images of a CSV-free archive to existing products and
    /// replace their image sets.
    #[tracing::instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn refresh_images(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<ImageRefreshReport, AppError> {
        self.check_size(bytes)?;
        if !is_zip(filename, bytes) {
            return Err(AppError::BadRequest(
                "Image refresh expects a ZIP archive".to_string(),
            ));
        }

        let images = extract_images(bytes, EntityKind::Products, self.store.as_ref(), &self.settings)
            .await?;
        let filenames: Vec<&str> = images.outcomes.iter().map(|o| o.path.as_str()).collect();

        let mut tx = ImportTransaction::begin(&self.pool).await?;
        let index = ProductIndex::load(tx.conn()).await?;
        let report = match_images_to_products(&filenames, &index);
        let products_updated =
            update_product_images(tx.conn(), &report, &images.image_map, &images.thumb_map).await?;
        tx.commit().await?;

        tracing::info!(
            matched = report.matched.len(),
            unmatched = report.unmatched.len(),
            products_updated,
            "Image refresh finished"
        );

        Ok(ImageRefreshReport {
            images_processed: images.processed(),
            matched: report.matched.len(),
            unmatched: report.unmatched,
            products_updated,
            image_errors: images.errors(),
        })
    }

    pub fn template(&self, entity: EntityKind) -> String {
        template_csv(entity)
    }

    pub async fn export(&self, entity: EntityKind) -> Result<String, AppError> {
        let mut conn = self.pool.acquire().await?;
        export_csv(&mut conn, entity).await
    }
}

async fn write_batch(
    conn: &mut SqliteConnection,
    request: &ImportRequest,
    batch: &PreparedBatch,
) -> Result<(ImportResult, CascadeOutcome), AppError> {
    let mut cascade = CascadeOutcome::default();
    if request.cascade && request.entity == EntityKind::Products {
        cascade =
            create_missing_taxonomy(conn, &batch.rows, &batch.brand_names, &batch.category_names)
                .await?;
    }

    let rows = &batch.rows;
    let result = match request.entity {
        EntityKind::Brands => run_import(&mut BrandImporter, conn, rows).await?,
        EntityKind::Categories => run_import(&mut CategoryImporter, conn, rows).await?,
        EntityKind::Products => run_import(&mut ProductImporter, conn, rows).await?,
        EntityKind::Cities => run_import(&mut CityImporter, conn, rows).await?,
        EntityKind::CityArticles => {
            let mut importer = CityArticleImporter::new(Some(request.filename.clone()));
            run_import(&mut importer, conn, rows).await?
        }
        EntityKind::Filters => run_import(&mut FilterImporter::new(), conn, rows).await?,
    };

    Ok((result, cascade))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::test_support::{jpeg, zip};
    use tempfile::TempDir;
    use vitrine_db::{
        connect_in_memory, BrandFields, BrandRepository, CategoryRepository, ProductRepository,
    };
    use vitrine_storage::LocalMediaStore;

    async fn service(max_import_bytes: usize) -> (ImportService, TempDir) {
        let media = TempDir::new().unwrap();
        let pool = connect_in_memory().await.unwrap();
        let store = LocalMediaStore::new(media.path()).await.unwrap();
        let service = ImportService::new(
            pool,
            Arc::new(store),
            ImageSettings::default(),
            max_import_bytes,
        );
        (service, media)
    }

    fn csv_request(entity: EntityKind, csv: &str, cascade: bool) -> ImportRequest {
        ImportRequest {
            entity,
            filename: format!("{}.csv", entity),
            bytes: csv.as_bytes().to_vec(),
            cascade,
        }
    }

    #[tokio::test]
    async fn test_supplier_csv_with_cascade() {
        let (service, _media) = service(1024 * 1024).await;
        let csv = "Бренд,Модель,Артикул,Пол,Цена,Фото\n\
                   Tissot ,PRX,T137.410.11.041.00,Мужские,52900,12;34;56\n";

        let report = service
            .import(csv_request(EntityKind::Products, csv, true))
            .await
            .unwrap();

        assert_eq!(report.format, SourceFormat::Supplier);
        assert_eq!(report.added, 1);
        assert!(report.errors.is_empty());
        assert_eq!(report.created_brands, ["tissot"]);
        assert_eq!(report.created_categories, ["men"]);

        let mut conn = service.pool().acquire().await.unwrap();
        let brand = BrandRepository::find_by_slug(&mut conn, "tissot")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(brand.name, "Tissot");
        let category = CategoryRepository::find_by_slug(&mut conn, "men")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(category.name, "Мужские");

        let product = ProductRepository::find_by_sku(&mut conn, "T137.410.11.041.00")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.name, "Tissot PRX");
        assert_eq!(product.price, 5_290_000);
        let images = ProductRepository::list_images(&mut conn, product.id)
            .await
            .unwrap();
        let urls: Vec<&str> = images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, ["12.jpg", "34.jpg", "56.jpg"]);
    }

    #[tokio::test]
    async fn test_cascade_creates_only_missing_brands() {
        let (service, _media) = service(1024 * 1024).await;
        let mut conn = service.pool().acquire().await.unwrap();
        let omega_id = BrandRepository::insert(&mut conn, &BrandFields::named("Omega", "omega"))
            .await
            .unwrap();
        drop(conn);

        let csv = "sku,name,price,brand_slug
                   O1,Speedmaster,100,omega
                   I1,Mystery,100,imaginary-brand
";
        let report = service
            .import(csv_request(EntityKind::Products, csv, true))
            .await
            .unwrap();

        assert_eq!(report.added, 2);
        assert!(report.errors.is_empty());
        assert_eq!(report.created_brands, ["imaginary-brand"]);

        let mut conn = service.pool().acquire().await.unwrap();
        let created = BrandRepository::find_by_slug(&mut conn, "imaginary-brand")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.name, "Imaginary Brand");
        let omega = BrandRepository::find_by_slug(&mut conn, "omega")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(omega.name, "Omega");

        let mystery = ProductRepository::find_by_sku(&mut conn, "I1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mystery.brand_id, Some(created.id));
        let speedmaster = ProductRepository::find_by_sku(&mut conn, "O1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(speedmaster.brand_id, Some(omega_id));
    }

    #[tokio::test]
    async fn test_supplier_refresh_with_unknown_gender_keeps_category() {
        let (service, _media) = service(1024 * 1024).await;
        let first = "Бренд,Модель,Артикул,Пол,Цена
Tissot,PRX,T1,Женские,100
";
        service
            .import(csv_request(EntityKind::Products, first, true))
            .await
            .unwrap();

        let refresh = "Бренд,Модель,Артикул,Пол,Цена
Tissot,PRX,T1,Космос,120
";
        let report = service
            .import(csv_request(EntityKind::Products, refresh, true))
            .await
            .unwrap();
        assert_eq!((report.added, report.updated), (0, 1));

        let mut conn = service.pool().acquire().await.unwrap();
        let women = CategoryRepository::id_by_slug(&mut conn, "women")
            .await
            .unwrap();
        let product = ProductRepository::find_by_sku(&mut conn, "T1")
            .await
            .unwrap()
            .unwrap();
        assert!(women.is_some());
        assert_eq!(product.category_id, women);
        assert_eq!(product.price, 12_000);
    }

    #[tokio::test]
    async fn test_without_cascade_unknown_brand_is_a_row_error() {
        let (service, _media) = service(1024 * 1024).await;
        let csv = "sku,name,price,brand_slug\nA1,Watch,100,imaginary-brand\n";

        let report = service
            .import(csv_request(EntityKind::Products, csv, false))
            .await
            .unwrap();

        assert_eq!(report.added, 0);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "brand_slug");
        assert!(report.created_brands.is_empty());
    }

    #[tokio::test]
    async fn test_batch_fatal_inputs() {
        let (service, _media) = service(64).await;

        let empty = service
            .import(csv_request(EntityKind::Brands, "", false))
            .await;
        assert!(matches!(empty, Err(AppError::InvalidInput(_))));

        let blank = service
            .import(csv_request(EntityKind::Brands, "\n\n", false))
            .await;
        assert!(matches!(blank, Err(AppError::InvalidInput(_))));

        let oversized = service
            .import(csv_request(EntityKind::Brands, &"x".repeat(65), false))
            .await;
        assert!(matches!(oversized, Err(AppError::PayloadTooLarge(_))));

        let unknown = service
            .import(csv_request(EntityKind::Brands, "foo,bar\n1,2\n", false))
            .await;
        assert!(matches!(unknown, Err(AppError::UnknownFormat { .. })));

        let supplier = service
            .import(csv_request(EntityKind::Brands, "Бренд,Модель\nTissot,PRX\n", false))
            .await;
        assert!(matches!(supplier, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_archive_import_resolves_image_references() {
        let (service, media) = service(10 * 1024 * 1024).await;
        let photo = jpeg(7);
        let archive = zip(&[
            (
                "products.csv",
                &b"sku,name,price,main_image,gallery_images\nW1,Watch,100,watch.jpg,photos/back.jpg|missing.jpg\n"[..],
            ),
            ("watch.jpg", &photo[..]),
            ("photos/back.jpg", &jpeg(9)[..]),
            ("broken.jpg", &b"not an image"[..]),
        ]);

        let report = service
            .import(ImportRequest {
                entity: EntityKind::Products,
                filename: "upload.zip".to_string(),
                bytes: archive,
                cascade: false,
            })
            .await
            .unwrap();

        assert_eq!(report.added, 1);
        assert_eq!(report.images_processed, 2);
        assert_eq!(report.image_errors.len(), 1);
        assert!(report.image_errors[0].starts_with("broken.jpg"));

        let mut conn = service.pool().acquire().await.unwrap();
        let product = ProductRepository::find_by_sku(&mut conn, "W1")
            .await
            .unwrap()
            .unwrap();
        let images = ProductRepository::list_images(&mut conn, product.id)
            .await
            .unwrap();
        assert_eq!(images.len(), 3);
        assert!(images[0].url.starts_with("/media/images/products/watch-"));
        assert!(images[1].url.starts_with("/media/images/products/back-"));
        assert_eq!(images[2].url, "missing.jpg");

        let thumb = images[0].thumb_url.as_deref().unwrap();
        assert!(thumb.ends_with("-thumb.webp"));
        let thumb_path = media.path().join(thumb.trim_start_matches("/media/"));
        assert!(thumb_path.exists());
    }

    #[tokio::test]
    async fn test_archive_without_csv_is_rejected() {
        let (service, _media) = service(10 * 1024 * 1024).await;
        let archive = zip(&[("watch.jpg", &jpeg(1)[..])]);

        let result = service
            .import(ImportRequest {
                entity: EntityKind::Products,
                filename: "upload.zip".to_string(),
                bytes: archive,
                cascade: false,
            })
            .await;

        assert!(matches!(result, Err(AppError::Archive(_))));
    }

    #[tokio::test]
    async fn test_refresh_images_matches_by_slug_and_gallery() {
        let (service, _media) = service(10 * 1024 * 1024).await;
        service
            .import(csv_request(
                EntityKind::Products,
                "slug,name,price,main_image\nrolex-sub,Rolex Submariner,100,old.jpg\n",
                false,
            ))
            .await
            .unwrap();

        let archive = zip(&[
            ("rolex-sub.jpg", &jpeg(1)[..]),
            ("rolex-sub_2.jpg", &jpeg(2)[..]),
            ("rolex-sub_3.jpg", &b"broken"[..]),
            ("omega.jpg", &jpeg(3)[..]),
        ]);

        let report = service.refresh_images("images.zip", &archive).await.unwrap();

        assert_eq!(report.images_processed, 3);
        assert_eq!(report.matched, 3);
        assert_eq!(report.unmatched, ["omega.jpg"]);
        assert_eq!(report.products_updated, 1);
        assert_eq!(report.image_errors.len(), 1);

        let mut conn = service.pool().acquire().await.unwrap();
        let product = ProductRepository::find_by_slug(&mut conn, "rolex-sub")
            .await
            .unwrap()
            .unwrap();
        let images = ProductRepository::list_images(&mut conn, product.id)
            .await
            .unwrap();
        assert_eq!(images.len(), 2);
        assert!(images[0].is_main);
        assert!(images[0].url.contains("/rolex-sub-"));
        assert!(images[1].url.contains("/rolex-sub_2-"));
    }

    #[tokio::test]
    async fn test_template_and_export() {
        let (service, _media) = service(1024 * 1024).await;
        service
            .import(csv_request(EntityKind::Brands, "name\nLongines\n", false))
            .await
            .unwrap();

        assert!(service.template(EntityKind::Brands).contains("name,slug,description"));
        let csv = service.export(EntityKind::Brands).await.unwrap();
        assert!(csv.contains("Longines,longines,"));
    }
}
