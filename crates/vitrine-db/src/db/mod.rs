//! Database repositories for the catalog tables written by imports.

pub mod catalog;
pub mod transaction;

pub use catalog::{
    BrandFields, BrandRepository, CategoryExportRow, CategoryFields, CategoryRepository,
    CityArticleExportRow, CityArticleFields, CityArticleRepository, CityFields, CityRepository,
    FilterAttributeFields, FilterExportRow, FilterRepository, FilterValueFields, NewProductImage,
    ProductExportRow, ProductFields, ProductKey, ProductRepository,
};

use vitrine_core::AppError;

/// True when the store rejected a write because a UNIQUE constraint already
/// holds the key.
pub fn is_unique_violation(err: &AppError) -> bool {
    match err {
        AppError::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Resolve an optional column against the stored value: `None` means the
/// column was not supplied (keep `current`), `Some(v)` replaces it.
pub fn merge_optional<T>(patch: Option<Option<T>>, current: Option<T>) -> Option<T> {
    match patch {
        None => current,
        Some(value) => value,
    }
}
