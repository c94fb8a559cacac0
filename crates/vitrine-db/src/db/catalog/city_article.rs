use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use vitrine_core::{models::CityArticle, AppError};

#[derive(Debug, Clone, PartialEq)]
pub struct CityArticleFields {
    pub city_id: i64,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub is_published: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub source_file: Option<String>,
    pub imported_at: Option<DateTime<Utc>>,
}

impl From<&CityArticle> for CityArticleFields {
    fn from(article: &CityArticle) -> Self {
        Self {
            city_id: article.city_id,
            slug: article.slug.clone(),
            title: article.title.clone(),
            excerpt: article.excerpt.clone(),
            content: article.content.clone(),
            image: article.image.clone(),
            is_published: article.is_published,
            meta_title: article.meta_title.clone(),
            meta_description: article.meta_description.clone(),
            source_file: article.source_file.clone(),
            imported_at: article.imported_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CityArticleExportRow {
    #[sqlx(flatten)]
    pub article: CityArticle,
    pub city_slug: String,
}

/// Repository for the `city_articles` table
pub struct CityArticleRepository;

impl CityArticleRepository {
    #[tracing::instrument(skip(conn), fields(db.table = "city_articles", db.operation = "select"))]
    pub async fn find(
        conn: &mut SqliteConnection,
        city_id: i64,
        slug: &str,
    ) -> Result<Option<CityArticle>, AppError> {
        let article = sqlx::query_as::<_, CityArticle>(
            r#"
            SELECT id, city_id, slug, title, excerpt, content, image, is_published, meta_title,
                   meta_description, source_file, imported_at, created_at, updated_at
            FROM city_articles WHERE city_id = ? AND slug = ?
            "#,
        )
        .bind(city_id)
        .bind(slug)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(article)
    }

    #[tracing::instrument(skip(conn, fields), fields(db.table = "city_articles", db.operation = "insert", slug = %fields.slug))]
    pub async fn insert(
        conn: &mut SqliteConnection,
        fields: &CityArticleFields,
    ) -> Result<i64, AppError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO city_articles (city_id, slug, title, excerpt, content, image, is_published,
                                       meta_title, meta_description, source_file, imported_at,
                                       created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(fields.city_id)
        .bind(&fields.slug)
        .bind(&fields.title)
        .bind(&fields.excerpt)
        .bind(&fields.content)
        .bind(&fields.image)
        .bind(fields.is_published)
        .bind(&fields.meta_title)
        .bind(&fields.meta_description)
        .bind(&fields.source_file)
        .bind(fields.imported_at)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    #[tracing::instrument(skip(conn, fields), fields(db.table = "city_articles", db.operation = "update", db.record_id = id))]
    pub async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        fields: &CityArticleFields,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE city_articles
            SET city_id = ?, slug = ?, title = ?, excerpt = ?, content = ?, image = ?,
                is_published = ?, meta_title = ?, meta_description = ?, source_file = ?,
                imported_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(fields.city_id)
        .bind(&fields.slug)
        .bind(&fields.title)
        .bind(&fields.excerpt)
        .bind(&fields.content)
        .bind(&fields.image)
        .bind(fields.is_published)
        .bind(&fields.meta_title)
        .bind(&fields.meta_description)
        .bind(&fields.source_file)
        .bind(fields.imported_at)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn list_for_export(
        conn: &mut SqliteConnection,
    ) -> Result<Vec<CityArticleExportRow>, AppError> {
        let rows = sqlx::query_as::<_, CityArticleExportRow>(
            r#"
            SELECT a.id, a.city_id, a.slug, a.title, a.excerpt, a.content, a.image,
                   a.is_published, a.meta_title, a.meta_description, a.source_file,
                   a.imported_at, a.created_at, a.updated_at, c.slug AS city_slug
            FROM city_articles a
            JOIN cities c ON c.id = a.city_id
            ORDER BY c.sort_order ASC, c.name ASC, a.id ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows)
    }
}
