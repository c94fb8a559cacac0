//! Native CSV export. Every export can be fed back into the matching importer.

use std::collections::HashMap;

use sqlx::SqliteConnection;
use vitrine_core::models::ProductImage;
use vitrine_core::money::format_money;
use vitrine_core::{AppError, EntityKind};
use vitrine_db::{
    BrandRepository, CategoryRepository, CityArticleRepository, CityRepository, FilterRepository,
    ProductRepository,
};

use crate::csv::generate;
use crate::importers::{
    BRAND_COLUMNS, CATEGORY_COLUMNS, CITY_ARTICLE_COLUMNS, CITY_COLUMNS, FILTER_COLUMNS,
    PRODUCT_COLUMNS,
};

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

fn number(value: Option<i64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

fn money(value: Option<i64>) -> String {
    value.map(format_money).unwrap_or_default()
}

/// Export every row of `entity` in import column order.
#[tracing::instrument(skip(conn))]
pub async fn export_csv(conn: &mut SqliteConnection, entity: EntityKind) -> Result<String, AppError> {
    let (columns, rows) = match entity {
        EntityKind::Brands => (BRAND_COLUMNS, brand_rows(conn).await?),
        EntityKind::Categories => (CATEGORY_COLUMNS, category_rows(conn).await?),
        EntityKind::Products => (PRODUCT_COLUMNS, product_rows(conn).await?),
        EntityKind::Cities => (CITY_COLUMNS, city_rows(conn).await?),
        EntityKind::CityArticles => (CITY_ARTICLE_COLUMNS, city_article_rows(conn).await?),
        EntityKind::Filters => (FILTER_COLUMNS, filter_rows(conn).await?),
    };

    tracing::info!(entity = %entity, rows = rows.len(), "Catalog exported");
    Ok(generate(columns, &rows))
}

async fn brand_rows(conn: &mut SqliteConnection) -> Result<Vec<Vec<String>>, AppError> {
    let brands = BrandRepository::list(conn).await?;
    Ok(brands
        .into_iter()
        .map(|b| {
            vec![
                b.name,
                b.slug,
                text(&b.description),
                text(&b.country),
                text(&b.logo),
                text(&b.website),
                b.sort_order.to_string(),
                flag(b.is_active),
                text(&b.meta_title),
                text(&b.meta_description),
            ]
        })
        .collect())
}

async fn category_rows(conn: &mut SqliteConnection) -> Result<Vec<Vec<String>>, AppError> {
    let categories = CategoryRepository::list_for_export(conn).await?;
    Ok(categories
        .into_iter()
        .map(|row| {
            let c = row.category;
            vec![
                c.name,
                c.slug,
                text(&row.parent_slug),
                text(&c.description),
                text(&c.image),
                c.sort_order.to_string(),
                flag(c.is_active),
                text(&c.meta_title),
                text(&c.meta_description),
            ]
        })
        .collect())
}

/// Main image first, the rest in stored order.
fn split_images(images: Vec<ProductImage>) -> (String, String) {
    let main_index = images.iter().position(|image| image.is_main).unwrap_or(0);
    let mut main = String::new();
    let mut gallery = Vec::new();
    for (index, image) in images.into_iter().enumerate() {
        if index == main_index {
            main = image.url;
        } else {
            gallery.push(image.url);
        }
    }
    (main, gallery.join("|"))
}

async fn product_rows(conn: &mut SqliteConnection) -> Result<Vec<Vec<String>>, AppError> {
    let products = ProductRepository::list_for_export(conn).await?;

    let mut images: HashMap<i64, Vec<ProductImage>> = HashMap::new();
    for image in ProductRepository::list_all_images(conn).await? {
        images.entry(image.product_id).or_default().push(image);
    }

    Ok(products
        .into_iter()
        .map(|row| {
            let p = row.product;
            let (main_image, gallery_images) =
                split_images(images.remove(&p.id).unwrap_or_default());
            vec![
                text(&p.sku),
                p.name,
                p.slug,
                text(&row.brand_slug),
                text(&row.category_slug),
                format_money(p.price),
                money(p.old_price),
                text(&p.description),
                text(&p.specs),
                p.stock.to_string(),
                flag(p.is_active),
                flag(p.is_featured),
                main_image,
                gallery_images,
                text(&p.meta_title),
                text(&p.meta_description),
            ]
        })
        .collect())
}

async fn city_rows(conn: &mut SqliteConnection) -> Result<Vec<Vec<String>>, AppError> {
    let cities = CityRepository::list(conn).await?;
    Ok(cities
        .into_iter()
        .map(|c| {
            vec![
                c.name,
                c.slug,
                text(&c.name_prepositional),
                text(&c.region),
                number(c.population),
                number(c.delivery_days),
                money(c.delivery_price),
                c.sort_order.to_string(),
                flag(c.is_active),
                text(&c.meta_title),
                text(&c.meta_description),
            ]
        })
        .collect())
}

async fn city_article_rows(conn: &mut SqliteConnection) -> Result<Vec<Vec<String>>, AppError> {
    let articles = CityArticleRepository::list_for_export(conn).await?;
    Ok(articles
        .into_iter()
        .map(|row| {
            let a = row.article;
            vec![
                row.city_slug,
                a.title,
                a.slug,
                text(&a.excerpt),
                text(&a.content),
                text(&a.image),
                flag(a.is_published),
                text(&a.meta_title),
                text(&a.meta_description),
            ]
        })
        .collect())
}

async fn filter_rows(conn: &mut SqliteConnection) -> Result<Vec<Vec<String>>, AppError> {
    let values = FilterRepository::list_for_export(conn).await?;
    Ok(values
        .into_iter()
        .map(|v| {
            vec![
                v.attribute_slug,
                v.attribute_name,
                v.attribute_type,
                v.value,
                text(&v.label),
                v.value_slug,
                v.sort_order.to_string(),
            ]
        })
        .collect())
}
