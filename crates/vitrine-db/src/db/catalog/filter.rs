use sqlx::{FromRow, SqliteConnection};
use vitrine_core::{
    models::{FilterAttribute, FilterType, FilterValue},
    AppError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FilterAttributeFields {
    pub slug: String,
    pub name: String,
    pub kind: FilterType,
    pub sort_order: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterValueFields {
    pub attribute_id: i64,
    pub value: String,
    pub label: Option<String>,
    pub slug: String,
    pub sort_order: i64,
}

impl From<&FilterValue> for FilterValueFields {
    fn from(value: &FilterValue) -> Self {
        Self {
            attribute_id: value.attribute_id,
            value: value.value.clone(),
            label: value.label.clone(),
            slug: value.slug.clone(),
            sort_order: value.sort_order,
        }
    }
}

/// One filter value joined with its attribute, as written by exports.
#[derive(Debug, Clone, FromRow)]
pub struct FilterExportRow {
    pub attribute_slug: String,
    pub attribute_name: String,
    pub attribute_type: String,
    pub value: String,
    pub label: Option<String>,
    pub value_slug: String,
    pub sort_order: i64,
}

/// Repository for `filter_attributes` and `filter_values`
pub struct FilterRepository;

impl FilterRepository {
    #[tracing::instrument(skip(conn), fields(db.table = "filter_attributes", db.operation = "select"))]
    pub async fn find_attribute(
        conn: &mut SqliteConnection,
        slug: &str,
    ) -> Result<Option<FilterAttribute>, AppError> {
        let attribute = sqlx::query_as::<_, FilterAttribute>(
            "SELECT id, slug, name, type, sort_order FROM filter_attributes WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(attribute)
    }

    #[tracing::instrument(skip(conn, fields), fields(db.table = "filter_attributes", db.operation = "insert", slug = %fields.slug))]
    pub async fn insert_attribute(
        conn: &mut SqliteConnection,
        fields: &FilterAttributeFields,
    ) -> Result<i64, AppError> {
        let result = sqlx::query(
            "INSERT INTO filter_attributes (slug, name, type, sort_order) VALUES (?, ?, ?, ?)",
        )
        .bind(&fields.slug)
        .bind(&fields.name)
        .bind(fields.kind.as_str())
        .bind(fields.sort_order)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update_attribute(
        conn: &mut SqliteConnection,
        id: i64,
        fields: &FilterAttributeFields,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE filter_attributes SET slug = ?, name = ?, type = ?, sort_order = ? WHERE id = ?")
            .bind(&fields.slug)
            .bind(&fields.name)
            .bind(fields.kind.as_str())
            .bind(fields.sort_order)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip(conn), fields(db.table = "filter_values", db.operation = "select"))]
    pub async fn find_value(
        conn: &mut SqliteConnection,
        attribute_id: i64,
        value: &str,
    ) -> Result<Option<FilterValue>, AppError> {
        let found = sqlx::query_as::<_, FilterValue>(
            r#"
            SELECT id, attribute_id, value, label, slug, sort_order
            FROM filter_values WHERE attribute_id = ? AND value = ?
            "#,
        )
        .bind(attribute_id)
        .bind(value)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(found)
    }

    #[tracing::instrument(skip(conn, fields), fields(db.table = "filter_values", db.operation = "insert", value = %fields.value))]
    pub async fn insert_value(
        conn: &mut SqliteConnection,
        fields: &FilterValueFields,
    ) -> Result<i64, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO filter_values (attribute_id, value, label, slug, sort_order)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(fields.attribute_id)
        .bind(&fields.value)
        .bind(&fields.label)
        .bind(&fields.slug)
        .bind(fields.sort_order)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update_value(
        conn: &mut SqliteConnection,
        id: i64,
        fields: &FilterValueFields,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE filter_values SET value = ?, label = ?, slug = ?, sort_order = ? WHERE id = ?")
            .bind(&fields.value)
            .bind(&fields.label)
            .bind(&fields.slug)
            .bind(fields.sort_order)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    pub async fn list_for_export(
        conn: &mut SqliteConnection,
    ) -> Result<Vec<FilterExportRow>, AppError> {
        let rows = sqlx::query_as::<_, FilterExportRow>(
            r#"
            SELECT a.slug AS attribute_slug, a.name AS attribute_name, a.type AS attribute_type,
                   v.value, v.label, v.slug AS value_slug, v.sort_order
            FROM filter_values v
            JOIN filter_attributes a ON a.id = v.attribute_id
            ORDER BY a.sort_order ASC, a.slug ASC, v.sort_order ASC, v.id ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows)
    }
}
