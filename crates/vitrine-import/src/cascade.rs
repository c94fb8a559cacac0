//! Auto-creation of brands and categories referenced by product rows.

use std::collections::BTreeMap;

use sqlx::SqliteConnection;
use vitrine_core::slug::{slugify, title_case_slug};
use vitrine_core::AppError;
use vitrine_db::{BrandFields, BrandRepository, CategoryFields, CategoryRepository};

use crate::csv::Row;

/// Slugs created by [`create_missing_taxonomy`], in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeOutcome {
    pub brands: Vec<String>,
    pub categories: Vec<String>,
}

fn referenced_slugs(rows: &[Row], column: &str) -> Vec<String> {
    let mut slugs: Vec<String> = Vec::new();
    for row in rows {
        let slug = slugify(row.get(column));
        if !slug.is_empty() && !slugs.contains(&slug) {
            slugs.push(slug);
        }
    }
    slugs
}

fn display_name(names: &BTreeMap<String, String>, slug: &str) -> String {
    names
        .get(slug)
        .cloned()
        .unwrap_or_else(|| title_case_slug(slug))
}

/// Create every brand and category that product rows reference but the store
/// lacks. Names come from `brand_names`/`category_names` (supplier display
/// names) and fall back to the title-cased slug.
pub async fn create_missing_taxonomy(
    conn: &mut SqliteConnection,
    rows: &[Row],
    brand_names: &BTreeMap<String, String>,
    category_names: &BTreeMap<String, String>,
) -> Result<CascadeOutcome, AppError> {
    let mut outcome = CascadeOutcome::default();

    for slug in referenced_slugs(rows, "brand_slug") {
        if BrandRepository::id_by_slug(conn, &slug).await?.is_some() {
            continue;
        }
        let fields = BrandFields::named(display_name(brand_names, &slug), slug.clone());
        BrandRepository::insert(conn, &fields).await?;
        tracing::info!(slug = %slug, name = %fields.name, "Brand auto-created");
        outcome.brands.push(slug);
    }

    for slug in referenced_slugs(rows, "category_slug") {
        if CategoryRepository::id_by_slug(conn, &slug).await?.is_some() {
            continue;
        }
        let fields = CategoryFields::named(display_name(category_names, &slug), slug.clone());
        CategoryRepository::insert(conn, &fields).await?;
        tracing::info!(slug = %slug, name = %fields.name, "Category auto-created");
        outcome.categories.push(slug);
    }

    Ok(outcome)
}
