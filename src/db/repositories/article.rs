//! Know-how article repository
//!
//! Read access only; authoring happens through the publishing surface.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Article;

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Get an article by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;
}

/// SQLx-based article repository
pub struct SqlxArticleRepository {
    pool: DynDatabasePool,
}

impl SqlxArticleRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Article>> {
    let row = sqlx::query(
        "SELECT id, user_id, title, content, is_public, created_at, updated_at \
         FROM articles WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get article by ID")?;

    Ok(row.map(|r| Article {
        id: r.get("id"),
        user_id: r.get("user_id"),
        title: r.get("title"),
        content: r.get("content"),
        is_public: r.get("is_public"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }))
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Article>> {
    let row = sqlx::query(
        "SELECT id, user_id, title, content, is_public, created_at, updated_at \
         FROM articles WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get article by ID")?;

    Ok(row.map(|r| Article {
        id: r.get("id"),
        user_id: r.get("user_id"),
        title: r.get("title"),
        content: r.get("content"),
        is_public: r.get("is_public"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{migrated_pool, seed_article, seed_user};

    #[tokio::test]
    async fn test_get_by_id() {
        let pool = migrated_pool().await;
        seed_user(&pool, 1, "kato").await;
        seed_article(&pool, 5, 1, "Classroom icebreakers").await;

        let repo = SqlxArticleRepository::new(pool);
        let article = repo.get_by_id(5).await.unwrap().expect("Article not found");
        assert_eq!(article.title, "Classroom icebreakers");
        assert!(article.is_public);
        assert!(repo.get_by_id(6).await.unwrap().is_none());
    }
}
