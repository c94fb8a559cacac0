//! Catalog repositories.
//!
//! Each `*Fields` struct is the full set of columns an import owns for that
//! table. Callers merge CSV values onto the stored row before writing, so an
//! UPDATE never resets a column the CSV did not carry.

mod brand;
mod category;
mod city;
mod city_article;
mod filter;
mod product;

pub use brand::{BrandFields, BrandRepository};
pub use category::{CategoryExportRow, CategoryFields, CategoryRepository};
pub use city::{CityFields, CityRepository};
pub use city_article::{CityArticleExportRow, CityArticleFields, CityArticleRepository};
pub use filter::{FilterAttributeFields, FilterExportRow, FilterRepository, FilterValueFields};
pub use product::{NewProductImage, ProductExportRow, ProductFields, ProductKey, ProductRepository};
