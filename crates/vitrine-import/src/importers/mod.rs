//! Per-entity importers and the shared row driver.
//!
//! An importer validates each [`Row`] into a typed record once, then upserts
//! the record by natural key against the open transaction. Validation and
//! reference failures become [`ImportError`]s and the row is skipped; any
//! other store failure aborts the batch so the caller rolls back.

mod brand;
mod category;
mod city;
mod city_article;
mod filter;
mod product;
mod reader;

pub use brand::{BrandImporter, BrandRecord, BRAND_COLUMNS};
pub use category::{CategoryImporter, CategoryRecord, CATEGORY_COLUMNS};
pub use city::{CityImporter, CityRecord, CITY_COLUMNS};
pub use city_article::{CityArticleImporter, CityArticleRecord, CITY_ARTICLE_COLUMNS};
pub use filter::{FilterImporter, FilterRecord, FILTER_COLUMNS};
pub use product::{ProductImporter, ProductRecord, PRODUCT_COLUMNS};
pub use reader::{parse_bool, RowReader};

use async_trait::async_trait;
use sqlx::SqliteConnection;
use vitrine_core::models::{ImportError, ImportResult};
use vitrine_core::{AppError, EntityKind};
use vitrine_db::is_unique_violation;

use crate::csv::Row;

/// Whether an upsert created or modified a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Added,
    Updated,
}

/// Why a single row could not be written.
#[derive(Debug)]
pub enum RowFailure {
    /// Skipped row, reported back to the caller.
    Invalid(ImportError),
    /// Store failure. Unique violations are downgraded to row errors by the
    /// driver, everything else aborts the batch.
    Store(AppError),
}

impl From<AppError> for RowFailure {
    fn from(err: AppError) -> Self {
        RowFailure::Store(err)
    }
}

impl From<ImportError> for RowFailure {
    fn from(err: ImportError) -> Self {
        RowFailure::Invalid(err)
    }
}

#[async_trait]
pub trait EntityImporter: Send {
    type Record: Send;

    fn entity(&self) -> EntityKind;

    /// Column reported for uniqueness conflicts.
    fn key_field(&self) -> &'static str;

    /// Validate a row into a typed record.
    fn parse_row(&self, row: &Row) -> Result<Self::Record, ImportError>;

    /// Insert or update by natural key. `line` is the source line for errors.
    async fn upsert(
        &mut self,
        conn: &mut SqliteConnection,
        record: Self::Record,
        line: usize,
    ) -> Result<Upserted, RowFailure>;

    /// Runs once after the last row.
    async fn finish(&mut self, _conn: &mut SqliteConnection) -> Result<(), AppError> {
        Ok(())
    }
}

fn conflict_message(err: &AppError) -> String {
    match err {
        AppError::Database(sqlx::Error::Database(db_err)) => {
            format!("Record already exists ({})", db_err.message())
        }
        _ => "Record already exists".to_string(),
    }
}

/// Feed every row through `importer`, accumulating row errors.
pub async fn run_import<I: EntityImporter>(
    importer: &mut I,
    conn: &mut SqliteConnection,
    rows: &[Row],
) -> Result<ImportResult, AppError> {
    let start = std::time::Instant::now();
    let mut result = ImportResult::default();

    for row in rows {
        let record = match importer.parse_row(row) {
            Ok(record) => record,
            Err(err) => {
                result.errors.push(err);
                continue;
            }
        };

        match importer.upsert(conn, record, row.line).await {
            Ok(Upserted::Added) => result.added += 1,
            Ok(Upserted::Updated) => result.updated += 1,
            Err(RowFailure::Invalid(err)) => result.errors.push(err),
            Err(RowFailure::Store(err)) if is_unique_violation(&err) => {
                result.errors.push(ImportError::new(
                    row.line,
                    importer.key_field(),
                    conflict_message(&err),
                ));
            }
            Err(RowFailure::Store(err)) => return Err(err),
        }
    }

    importer.finish(conn).await?;

    tracing::info!(
        entity = %importer.entity(),
        rows = rows.len(),
        added = result.added,
        updated = result.updated,
        errors = result.errors.len(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Import batch processed"
    );

    Ok(result)
}
