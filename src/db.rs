use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{error::ErrorKind, sqlite::SqlitePoolOptions, FromRow, SqlitePool};
use uuid::Uuid;

/// A stored article. Also the response body of every endpoint that returns one.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub source_url: String,
}

/// Fully-populated article fields awaiting an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub source_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.kind() {
                ErrorKind::NotNullViolation
                | ErrorKind::UniqueViolation
                | ErrorKind::CheckViolation
                | ErrorKind::ForeignKeyViolation => {
                    return StorageError::ConstraintViolation(db_err.message().to_string());
                }
                _ => {}
            }
        }
        StorageError::Database(err)
    }
}

/// Persistence operations the router depends on.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Inserts the article under a freshly generated id and returns the stored row.
    async fn create_article(&self, article: &NewArticle) -> Result<Article, StorageError>;

    async fn get_article(&self, id: &str) -> Result<Option<Article>, StorageError>;

    /// Overwrites only `title`. Returns `None` when no row has this id.
    async fn update_title(&self, id: &str, title: &str)
        -> Result<Option<Article>, StorageError>;

    /// Hard delete. Returns `false` when no row was removed.
    async fn delete_article(&self, id: &str) -> Result<bool, StorageError>;
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn initialize(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id TEXT PRIMARY KEY NOT NULL,
                title TEXT NOT NULL CHECK (length(title) > 0),
                content TEXT NOT NULL,
                summary TEXT NOT NULL,
                source_url TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn count_articles(&self) -> Result<i64, StorageError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}

#[async_trait]
impl ArticleRepository for Database {
    async fn create_article(&self, article: &NewArticle) -> Result<Article, StorageError> {
        let id = Uuid::new_v4().to_string();

        let stored = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (id, title, content, summary, source_url)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, title, content, summary, source_url
            "#,
        )
        .bind(&id)
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.summary)
        .bind(&article.source_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn get_article(&self, id: &str) -> Result<Option<Article>, StorageError> {
        let article = sqlx::query_as::<_, Article>(
            "SELECT id, title, content, summary, source_url FROM articles WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(article)
    }

    async fn update_title(
        &self,
        id: &str,
        title: &str,
    ) -> Result<Option<Article>, StorageError> {
        // Single statement, so concurrent updates are last-writer-wins on title alone.
        let article = sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles SET title = ?
            WHERE id = ?
            RETURNING id, title, content, summary, source_url
            "#,
        )
        .bind(title)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(article)
    }

    async fn delete_article(&self, id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
