use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::SqliteConnection;
use vitrine_core::models::{FilterType, ImportError};
use vitrine_core::slug::slugify;
use vitrine_core::EntityKind;
use vitrine_db::{merge_optional, FilterAttributeFields, FilterRepository, FilterValueFields};

use super::{EntityImporter, RowFailure, RowReader, Upserted};
use crate::csv::Row;

pub const FILTER_COLUMNS: &[&str] = &[
    "attribute_slug",
    "attribute_name",
    "attribute_type",
    "value",
    "label",
    "value_slug",
    "sort_order",
];

#[derive(Debug, Clone, PartialEq)]
pub struct FilterRecord {
    pub attribute_slug: String,
    /// Only required the first time an attribute is seen.
    pub attribute_name: Option<String>,
    pub attribute_type: Option<FilterType>,
    pub value: String,
    pub label: Option<Option<String>>,
    pub value_slug: Option<String>,
    pub sort_order: Option<i64>,
}

/// Upserts filter values keyed by `(attribute_slug, value)`, creating the
/// attribute on first sight.
#[derive(Debug, Default)]
pub struct FilterImporter {
    attributes: HashMap<String, i64>,
}

impl FilterImporter {
    pub fn new() -> Self {
        Self::default()
    }

    async fn attribute_id(
        &mut self,
        conn: &mut SqliteConnection,
        record: &FilterRecord,
        line: usize,
    ) -> Result<i64, RowFailure> {
        let existing = FilterRepository::find_attribute(conn, &record.attribute_slug).await?;

        let id = match existing {
            Some(attribute) => {
                let kind = attribute.kind.parse::<FilterType>().unwrap_or(FilterType::Select);
                let fields = FilterAttributeFields {
                    slug: attribute.slug.clone(),
                    name: record
                        .attribute_name
                        .clone()
                        .unwrap_or_else(|| attribute.name.clone()),
                    kind: record.attribute_type.unwrap_or(kind),
                    sort_order: attribute.sort_order,
                };
                if fields.name != attribute.name || fields.kind != kind {
                    FilterRepository::update_attribute(conn, attribute.id, &fields).await?;
                }
                attribute.id
            }
            None => {
                let Some(name) = record.attribute_name.clone() else {
                    return Err(RowFailure::Invalid(ImportError::new(
                        line,
                        "attribute_name",
                        format!(
                            "attribute_name is required for new attribute '{}'",
                            record.attribute_slug
                        ),
                    )));
                };
                let fields = FilterAttributeFields {
                    slug: record.attribute_slug.clone(),
                    name,
                    kind: record.attribute_type.unwrap_or(FilterType::Select),
                    sort_order: 0,
                };
                let id = FilterRepository::insert_attribute(conn, &fields).await?;
                tracing::debug!(slug = %fields.slug, id, "Filter attribute created");
                id
            }
        };

        self.attributes.insert(record.attribute_slug.clone(), id);
        Ok(id)
    }
}

#[async_trait]
impl EntityImporter for FilterImporter {
    type Record = FilterRecord;

    fn entity(&self) -> EntityKind {
        EntityKind::Filters
    }

    fn key_field(&self) -> &'static str {
        "value"
    }

    fn parse_row(&self, row: &Row) -> Result<FilterRecord, ImportError> {
        let reader = RowReader::new(row);
        let attribute_slug = slugify(&reader.required("attribute_slug")?);
        if attribute_slug.is_empty() {
            return Err(reader.error("attribute_slug", "attribute_slug has no usable characters"));
        }
        let value = reader.required("value")?;

        let attribute_type = match reader.value("attribute_type") {
            Some(raw) => Some(
                raw.parse::<FilterType>()
                    .map_err(|reason| reader.error("attribute_type", reason))?,
            ),
            None => None,
        };

        Ok(FilterRecord {
            attribute_slug,
            attribute_name: reader.value("attribute_name").map(str::to_string),
            attribute_type,
            value,
            label: reader.text("label"),
            value_slug: reader.value("value_slug").map(slugify),
            sort_order: reader.int("sort_order")?,
        })
    }

    async fn upsert(
        &mut self,
        conn: &mut SqliteConnection,
        record: FilterRecord,
        line: usize,
    ) -> Result<Upserted, RowFailure> {
        let cached = self.attributes.get(&record.attribute_slug).copied();
        let attribute_id = match cached {
            Some(id) if record.attribute_name.is_none() && record.attribute_type.is_none() => id,
            _ => self.attribute_id(conn, &record, line).await?,
        };

        match FilterRepository::find_value(conn, attribute_id, &record.value).await? {
            Some(existing) => {
                let mut fields = FilterValueFields::from(&existing);
                fields.label = merge_optional(record.label, fields.label.take());
                if let Some(slug) = record.value_slug {
                    fields.slug = slug;
                }
                if let Some(sort_order) = record.sort_order {
                    fields.sort_order = sort_order;
                }
                FilterRepository::update_value(conn, existing.id, &fields).await?;
                Ok(Upserted::Updated)
            }
            None => {
                let slug = record
                    .value_slug
                    .unwrap_or_else(|| slugify(&record.value));
                let fields = FilterValueFields {
                    attribute_id,
                    slug,
                    label: record.label.flatten(),
                    sort_order: record.sort_order.unwrap_or(0),
                    value: record.value,
                };
                FilterRepository::insert_value(conn, &fields).await?;
                Ok(Upserted::Added)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importers::run_import;
    use crate::importers::test_support::{pool, rows};

    #[tokio::test]
    async fn test_attribute_is_created_once_and_later_rows_may_omit_it() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let result = run_import(
            &mut FilterImporter::new(),
            &mut conn,
            &rows(
                "attribute_slug,attribute_name,attribute_type,value,label\n\
                 movement,Механизм,select,Кварцевый,Кварц\n\
                 movement,,,Механический,\n\
                 glass,,,Сапфировое,\n",
            ),
        )
        .await
        .unwrap();

        assert_eq!(result.added, 2);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 4);
        assert_eq!(result.errors[0].field, "attribute_name");

        let attribute = FilterRepository::find_attribute(&mut conn, "movement")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(attribute.name, "Механизм");
        assert_eq!(attribute.kind, "select");

        let value = FilterRepository::find_value(&mut conn, attribute.id, "Механический")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value.slug, "mekhanicheskiy");
        assert_eq!(value.label, None);
    }

    #[tokio::test]
    async fn test_invalid_type_is_a_row_error() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let result = run_import(
            &mut FilterImporter::new(),
            &mut conn,
            &rows("attribute_slug,attribute_name,attribute_type,value\nsize,Размер,slider,40\n"),
        )
        .await
        .unwrap();

        assert_eq!(result.added, 0);
        assert_eq!(result.errors[0].field, "attribute_type");
    }

    #[tokio::test]
    async fn test_existing_value_is_updated() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let csv = "attribute_slug,attribute_name,value,label,sort_order\nwater,Водозащита,100,100 м,1\n";

        run_import(&mut FilterImporter::new(), &mut conn, &rows(csv))
            .await
            .unwrap();
        let second = run_import(
            &mut FilterImporter::new(),
            &mut conn,
            &rows("attribute_slug,value,label\nwater,100,100 метров\n"),
        )
        .await
        .unwrap();

        assert_eq!((second.added, second.updated), (0, 1));
        let attribute = FilterRepository::find_attribute(&mut conn, "water")
            .await
            .unwrap()
            .unwrap();
        let value = FilterRepository::find_value(&mut conn, attribute.id, "100")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value.label.as_deref(), Some("100 метров"));
        assert_eq!(value.sort_order, 1);
    }
}
