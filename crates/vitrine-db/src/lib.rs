//! Vitrine Database Library
//!
//! SQLite pool setup with embedded migrations, the import unit of work and
//! the catalog repositories. Repository functions take an explicit
//! `&mut SqliteConnection` so the same code runs inside an
//! [`ImportTransaction`] or on a plain pooled connection.

pub mod db;
pub mod pool;

pub use db::transaction::ImportTransaction;
pub use db::{
    is_unique_violation, merge_optional, BrandFields, BrandRepository, CategoryExportRow,
    CategoryFields, CategoryRepository, CityArticleExportRow, CityArticleFields,
    CityArticleRepository, CityFields, CityRepository, FilterAttributeFields, FilterExportRow,
    FilterRepository, FilterValueFields, NewProductImage, ProductExportRow, ProductFields,
    ProductKey, ProductRepository,
};
pub use pool::{connect, connect_in_memory, MIGRATOR};
