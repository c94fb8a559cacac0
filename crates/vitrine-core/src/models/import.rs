use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Catalog entity an import, template or export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Brands,
    Categories,
    Products,
    Cities,
    CityArticles,
    Filters,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Brands,
        EntityKind::Categories,
        EntityKind::Products,
        EntityKind::Cities,
        EntityKind::CityArticles,
        EntityKind::Filters,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Brands => "brands",
            EntityKind::Categories => "categories",
            EntityKind::Products => "products",
            EntityKind::Cities => "cities",
            EntityKind::CityArticles => "city-articles",
            EntityKind::Filters => "filters",
        }
    }

    /// Media subdirectory for images uploaded alongside this entity.
    pub fn media_dir(&self) -> &'static str {
        match self {
            EntityKind::CityArticles => "articles",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AppError::UnknownEntity(s.to_string()))
    }
}

/// One rejected CSV row. `row` is the 1-based source line (the header is line 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportError {
    pub row: usize,
    pub field: String,
    pub message: String,
}

impl ImportError {
    pub fn new(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportResult {
    pub added: usize,
    pub updated: usize,
    pub errors: Vec<ImportError>,
}

/// Which column shape the uploaded CSV was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Native,
    Supplier,
}

/// Summary returned for one import call.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub entity: EntityKind,
    pub format: SourceFormat,
    pub added: usize,
    pub updated: usize,
    pub errors: Vec<ImportError>,
    pub images_processed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created_brands: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created_categories: Vec<String>,
}

/// Summary returned for an image-only archive.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageRefreshReport {
    pub images_processed: usize,
    pub matched: usize,
    pub unmatched: Vec<String>,
    pub products_updated: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_errors: Vec<String>,
}
