//! Slide repository
//!
//! Read access to slides and their pages. Slide rows are created by the
//! upload pipeline; the aggregate columns are written by the rating
//! repository inside its submission transaction.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Slide, SlideLevel, SlidePage};

/// Slide repository trait
#[async_trait]
pub trait SlideRepository: Send + Sync {
    /// Get a slide by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Slide>>;

    /// Resolve a page by (slide, zero-based index)
    async fn get_page(&self, slide_id: i64, page_index: i64) -> Result<Option<SlidePage>>;
}

/// SQLx-based slide repository
pub struct SqlxSlideRepository {
    pool: DynDatabasePool,
}

impl SqlxSlideRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SlideRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SlideRepository for SqlxSlideRepository {
    async fn get_by_id(&self, id: i64) -> Result<Option<Slide>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_page(&self, slide_id: i64, page_index: i64) -> Result<Option<SlidePage>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_page_sqlite(self.pool.as_sqlite().unwrap(), slide_id, page_index).await
            }
            DatabaseDriver::Mysql => {
                get_page_mysql(self.pool.as_mysql().unwrap(), slide_id, page_index).await
            }
        }
    }
}

fn row_to_slide(row: &sqlx::sqlite::SqliteRow) -> Slide {
    Slide {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        level: row
            .get::<String, _>("level")
            .parse::<SlideLevel>()
            .unwrap_or(SlideLevel::Beginner),
        avg_rating: row.get("avg_rating"),
        rating_count: row.get("rating_count"),
        page_count: row.get("page_count"),
        created_at: row.get("created_at"),
    }
}

fn mysql_row_to_slide(row: &sqlx::mysql::MySqlRow) -> Slide {
    Slide {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        level: row
            .get::<String, _>("level")
            .parse::<SlideLevel>()
            .unwrap_or(SlideLevel::Beginner),
        avg_rating: row.get("avg_rating"),
        rating_count: row.get("rating_count"),
        page_count: row.get("page_count"),
        created_at: row.get("created_at"),
    }
}

// SQLite implementations

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Slide>> {
    let row = sqlx::query(
        "SELECT id, user_id, title, level, avg_rating, rating_count, page_count, created_at \
         FROM slides WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get slide by ID")?;

    Ok(row.map(|r| row_to_slide(&r)))
}

async fn get_page_sqlite(
    pool: &SqlitePool,
    slide_id: i64,
    page_index: i64,
) -> Result<Option<SlidePage>> {
    let row = sqlx::query(
        "SELECT id, slide_id, page_index, avg_rating, rating_count \
         FROM slide_pages WHERE slide_id = ? AND page_index = ?",
    )
    .bind(slide_id)
    .bind(page_index)
    .fetch_optional(pool)
    .await
    .context("Failed to get slide page")?;

    Ok(row.map(|r| SlidePage {
        id: r.get("id"),
        slide_id: r.get("slide_id"),
        page_index: r.get("page_index"),
        avg_rating: r.get("avg_rating"),
        rating_count: r.get("rating_count"),
    }))
}

// MySQL implementations

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Slide>> {
    let row = sqlx::query(
        "SELECT id, user_id, title, level, avg_rating, rating_count, page_count, created_at \
         FROM slides WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get slide by ID")?;

    Ok(row.map(|r| mysql_row_to_slide(&r)))
}

async fn get_page_mysql(
    pool: &MySqlPool,
    slide_id: i64,
    page_index: i64,
) -> Result<Option<SlidePage>> {
    let row = sqlx::query(
        "SELECT id, slide_id, page_index, avg_rating, rating_count \
         FROM slide_pages WHERE slide_id = ? AND page_index = ?",
    )
    .bind(slide_id)
    .bind(page_index)
    .fetch_optional(pool)
    .await
    .context("Failed to get slide page")?;

    Ok(row.map(|r| SlidePage {
        id: r.get("id"),
        slide_id: r.get("slide_id"),
        page_index: r.get("page_index"),
        avg_rating: r.get("avg_rating"),
        rating_count: r.get("rating_count"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{migrated_pool, seed_page, seed_slide, seed_user};

    #[tokio::test]
    async fn test_get_by_id() {
        let pool = migrated_pool().await;
        seed_user(&pool, 1, "abe").await;
        seed_slide(&pool, 10, 1, "Keigo basics").await;

        let repo = SqlxSlideRepository::new(pool);
        let slide = repo.get_by_id(10).await.unwrap().expect("Slide not found");
        assert_eq!(slide.title, "Keigo basics");
        assert_eq!(slide.rating_count, 0);
        assert!(repo.get_by_id(11).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_page_by_index() {
        let pool = migrated_pool().await;
        seed_user(&pool, 1, "abe").await;
        seed_slide(&pool, 10, 1, "Keigo basics").await;
        seed_page(&pool, 100, 10, 3).await;

        let repo = SqlxSlideRepository::new(pool);
        let page = repo.get_page(10, 3).await.unwrap().expect("Page not found");
        assert_eq!(page.id, 100);

        // Out-of-range index resolves to no row
        assert!(repo.get_page(10, 99).await.unwrap().is_none());
    }
}
