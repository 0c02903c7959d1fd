//! Reaction repository
//!
//! One row per (user, article); switching kind overwrites the row in
//! place through the composite primary key.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{ReactionCounts, ReactionKind};

/// Reaction repository trait
#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Set or replace the user's reaction to an article
    async fn set(&self, user_id: i64, article_id: i64, kind: ReactionKind) -> Result<()>;

    /// Per-kind tallies for an article; absent kinds count zero
    async fn counts(&self, article_id: i64) -> Result<ReactionCounts>;

    /// The user's current reaction to an article, if any
    async fn get_user_reaction(
        &self,
        user_id: i64,
        article_id: i64,
    ) -> Result<Option<ReactionKind>>;
}

/// SQLx-based reaction repository
pub struct SqlxReactionRepository {
    pool: DynDatabasePool,
}

impl SqlxReactionRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ReactionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ReactionRepository for SqlxReactionRepository {
    async fn set(&self, user_id: i64, article_id: i64, kind: ReactionKind) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                set_sqlite(self.pool.as_sqlite().unwrap(), user_id, article_id, kind).await
            }
            DatabaseDriver::Mysql => {
                set_mysql(self.pool.as_mysql().unwrap(), user_id, article_id, kind).await
            }
        }
    }

    async fn counts(&self, article_id: i64) -> Result<ReactionCounts> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => counts_sqlite(self.pool.as_sqlite().unwrap(), article_id).await,
            DatabaseDriver::Mysql => counts_mysql(self.pool.as_mysql().unwrap(), article_id).await,
        }
    }

    async fn get_user_reaction(
        &self,
        user_id: i64,
        article_id: i64,
    ) -> Result<Option<ReactionKind>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_user_reaction_sqlite(self.pool.as_sqlite().unwrap(), user_id, article_id).await
            }
            DatabaseDriver::Mysql => {
                get_user_reaction_mysql(self.pool.as_mysql().unwrap(), user_id, article_id).await
            }
        }
    }
}

fn tally_rows(rows: &[(String, i64)]) -> ReactionCounts {
    let mut counts = ReactionCounts::default();
    for (kind, count) in rows {
        if let Ok(kind) = kind.parse::<ReactionKind>() {
            counts.set(kind, *count);
        }
    }
    counts
}

// SQLite implementations

async fn set_sqlite(
    pool: &SqlitePool,
    user_id: i64,
    article_id: i64,
    kind: ReactionKind,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO reactions (user_id, article_id, kind, created_at) VALUES (?, ?, ?, ?) \
         ON CONFLICT(user_id, article_id) DO UPDATE SET \
         kind = excluded.kind, created_at = excluded.created_at",
    )
    .bind(user_id)
    .bind(article_id)
    .bind(kind.to_string())
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to set reaction")?;
    Ok(())
}

async fn counts_sqlite(pool: &SqlitePool, article_id: i64) -> Result<ReactionCounts> {
    let rows = sqlx::query(
        "SELECT kind, COUNT(*) AS count FROM reactions WHERE article_id = ? GROUP BY kind",
    )
    .bind(article_id)
    .fetch_all(pool)
    .await
    .context("Failed to count reactions")?;

    let pairs: Vec<(String, i64)> = rows
        .iter()
        .map(|r| (r.get("kind"), r.get("count")))
        .collect();
    Ok(tally_rows(&pairs))
}

async fn get_user_reaction_sqlite(
    pool: &SqlitePool,
    user_id: i64,
    article_id: i64,
) -> Result<Option<ReactionKind>> {
    let kind: Option<String> =
        sqlx::query_scalar("SELECT kind FROM reactions WHERE user_id = ? AND article_id = ?")
            .bind(user_id)
            .bind(article_id)
            .fetch_optional(pool)
            .await
            .context("Failed to get user reaction")?;

    Ok(kind.and_then(|k| k.parse().ok()))
}

// MySQL implementations

async fn set_mysql(
    pool: &MySqlPool,
    user_id: i64,
    article_id: i64,
    kind: ReactionKind,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO reactions (user_id, article_id, kind, created_at) VALUES (?, ?, ?, ?) \
         ON DUPLICATE KEY UPDATE kind = VALUES(kind), created_at = VALUES(created_at)",
    )
    .bind(user_id)
    .bind(article_id)
    .bind(kind.to_string())
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to set reaction")?;
    Ok(())
}

async fn counts_mysql(pool: &MySqlPool, article_id: i64) -> Result<ReactionCounts> {
    let rows = sqlx::query(
        "SELECT kind, COUNT(*) AS count FROM reactions WHERE article_id = ? GROUP BY kind",
    )
    .bind(article_id)
    .fetch_all(pool)
    .await
    .context("Failed to count reactions")?;

    let pairs: Vec<(String, i64)> = rows
        .iter()
        .map(|r| (r.get("kind"), r.get("count")))
        .collect();
    Ok(tally_rows(&pairs))
}

async fn get_user_reaction_mysql(
    pool: &MySqlPool,
    user_id: i64,
    article_id: i64,
) -> Result<Option<ReactionKind>> {
    let kind: Option<String> =
        sqlx::query_scalar("SELECT kind FROM reactions WHERE user_id = ? AND article_id = ?")
            .bind(user_id)
            .bind(article_id)
            .fetch_optional(pool)
            .await
            .context("Failed to get user reaction")?;

    Ok(kind.and_then(|k| k.parse().ok()))
}
