use chrono::Utc;
use sqlx::{FromRow, SqliteConnection};
use vitrine_core::{models::Category, AppError};

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFields {
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i64>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub sort_order: i64,
    pub is_active: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

impl CategoryFields {
    pub fn named(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            parent_id: None,
            description: None,
            image: None,
            sort_order: 0,
            is_active: true,
            meta_title: None,
            meta_description: None,
        }
    }
}

impl From<&Category> for CategoryFields {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            parent_id: category.parent_id,
            description: category.description.clone(),
            image: category.image.clone(),
            sort_order: category.sort_order,
            is_active: category.is_active,
            meta_title: category.meta_title.clone(),
            meta_description: category.meta_description.clone(),
        }
    }
}

/// Category with its parent resolved to a slug, as written by exports.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryExportRow {
    #[sqlx(flatten)]
    pub category: Category,
    pub parent_slug: Option<String>,
}

/// Repository for the `categories` table
pub struct CategoryRepository;

impl CategoryRepository {
    #[tracing::instrument(skip(conn), fields(db.table = "categories", db.operation = "select"))]
    pub async fn find_by_slug(
        conn: &mut SqliteConnection,
        slug: &str,
    ) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, slug, parent_id, description, image, sort_order, is_active,
                   meta_title, meta_description, created_at, updated_at
            FROM categories WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(category)
    }

    pub async fn id_by_slug(conn: &mut SqliteConnection, slug: &str) -> Result<Option<i64>, AppError> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(id)
    }

    #[tracing::instrument(skip(conn, fields), fields(db.table = "categories", db.operation = "insert", slug = %fields.slug))]
    pub async fn insert(conn: &mut SqliteConnection, fields: &CategoryFields) -> Result<i64, AppError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO categories (name, slug, parent_id, description, image, sort_order,
                                    is_active, meta_title, meta_description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(fields.parent_id)
        .bind(&fields.description)
        .bind(&fields.image)
        .bind(fields.sort_order)
        .bind(fields.is_active)
        .bind(&fields.meta_title)
        .bind(&fields.meta_description)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    #[tracing::instrument(skip(conn, fields), fields(db.table = "categories", db.operation = "update", db.record_id = id))]
    pub async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        fields: &CategoryFields,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE categories
            SET name = ?, slug = ?, parent_id = ?, description = ?, image = ?, sort_order = ?,
                is_active = ?, meta_title = ?, meta_description = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(fields.parent_id)
        .bind(&fields.description)
        .bind(&fields.image)
        .bind(fields.sort_order)
        .bind(fields.is_active)
        .bind(&fields.meta_title)
        .bind(&fields.meta_description)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// All categories, parents before children where the tree allows.
    pub async fn list_for_export(
        conn: &mut SqliteConnection,
    ) -> Result<Vec<CategoryExportRow>, AppError> {
        let rows = sqlx::query_as::<_, CategoryExportRow>(
            r#"
            SELECT c.id, c.name, c.slug, c.parent_id, c.description, c.image, c.sort_order,
                   c.is_active, c.meta_title, c.meta_description, c.created_at, c.updated_at,
                   p.slug AS parent_slug
            FROM categories c
            LEFT JOIN categories p ON p.id = c.parent_id
            ORDER BY c.parent_id IS NOT NULL, c.sort_order ASC, c.name ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows)
    }
}
