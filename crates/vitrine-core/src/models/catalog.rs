use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Watch brand
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Brand {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub country: Option<String>,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub sort_order: i64,
    pub is_active: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog category; `parent_id` forms a tree.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i64>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub sort_order: i64,
    pub is_active: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product row. Prices are integer minor units (kopecks).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: i64,
    pub sku: Option<String>,
    pub slug: String,
    pub name: String,
    pub brand_id: Option<i64>,
    pub category_id: Option<i64>,
    pub price: i64,
    pub old_price: Option<i64>,
    pub description: Option<String>,
    /// JSON array of spec groups, stored as text.
    pub specs: Option<String>,
    pub stock: i64,
    pub is_active: bool,
    pub is_featured: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub url: String,
    pub thumb_url: Option<String>,
    pub alt: Option<String>,
    pub sort_order: i64,
    pub is_main: bool,
}

/// Delivery city backing the programmatic-SEO pages.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub name_prepositional: Option<String>,
    pub region: Option<String>,
    pub population: Option<i64>,
    pub delivery_days: Option<i64>,
    pub delivery_price: Option<i64>,
    pub sort_order: i64,
    pub is_active: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CityArticle {
    pub id: i64,
    pub city_id: i64,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub is_published: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    /// Upload filename for imported articles; `None` for hand-authored ones.
    pub source_file: Option<String>,
    pub imported_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter widget type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Select,
    Checkbox,
    Range,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::Select => "select",
            FilterType::Checkbox => "checkbox",
            FilterType::Range => "range",
        }
    }
}

impl std::str::FromStr for FilterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "select" => Ok(FilterType::Select),
            "checkbox" => Ok(FilterType::Checkbox),
            "range" => Ok(FilterType::Range),
            other => Err(format!(
                "unknown filter type '{}', expected select, checkbox or range",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FilterAttribute {
    pub id: i64,
    pub slug: String,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FilterValue {
    pub id: i64,
    pub attribute_id: i64,
    pub value: String,
    pub label: Option<String>,
    pub slug: String,
    pub sort_order: i64,
}
