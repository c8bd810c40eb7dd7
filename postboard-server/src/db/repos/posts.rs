//! Post repository
//!
//! - ensure_schema: idempotent DDL, embedded at compile time
//! - list_all: every post, newest first (id DESC)
//! - insert: single INSERT ... RETURNING, text bound as $1

use async_trait::async_trait;

use crate::db::{DbError, DbPool};
use crate::models::{Post, PostText};

/// Storage structure for posts, created if absent.
pub const SCHEMA: &str = include_str!("../schema.sql");

/// Persistence operations for posts.
///
/// The service depends on this trait rather than on PostgreSQL so it can be
/// driven by an in-memory store in tests.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create the post storage structure if it does not exist.
    async fn ensure_schema(&self) -> Result<(), DbError>;

    /// Every post ordered by id descending. An empty store yields an empty vec.
    async fn list_all(&self) -> Result<Vec<Post>, DbError>;

    /// Persist a post and return it with store-assigned id and timestamp.
    ///
    /// On [`DbError::Query`] the caller cannot tell whether the row was written.
    async fn insert(&self, text: &PostText) -> Result<Post, DbError>;
}

/// PostgreSQL-backed post repository
#[derive(Clone, Debug)]
pub struct PgPostRepo {
    pool: DbPool,
}

impl PgPostRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepo {
    async fn ensure_schema(&self) -> Result<(), DbError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(SCHEMA)
            .execute(&mut *conn)
            .await
            .map_err(DbError::Schema)?;

        tracing::info!("Post schema ensured");
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Post>, DbError> {
        let mut conn = self.pool.acquire().await?;
        let posts = sqlx::query_as::<_, Post>(
            "SELECT id, text, created_at FROM posts ORDER BY id DESC",
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(posts)
    }

    async fn insert(&self, text: &PostText) -> Result<Post, DbError> {
        let mut conn = self.pool.acquire().await?;
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (text)
            VALUES ($1)
            RETURNING id, text, created_at
            "#,
        )
        .bind(text.as_str())
        .fetch_one(&mut *conn)
        .await?;

        Ok(post)
    }
}
