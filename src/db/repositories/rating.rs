//! Rating repository
//!
//! A submission is one transaction: upsert the rater's row, recompute the
//! target's mean and count from the surviving rows, write the aggregate
//! back onto the slide or page, commit. The stored aggregate is therefore
//! never derived incrementally and resubmissions cannot drift it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{AggregateSummary, Rating, RatingTarget, RatingWithAuthor};

/// Rating repository trait
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Insert or overwrite the user's rating and return the recomputed
    /// aggregate
    async fn submit(
        &self,
        user_id: i64,
        target: RatingTarget,
        score: i64,
        feedback: Option<&str>,
    ) -> Result<AggregateSummary>;

    /// One page of a target's ratings, newest first, with the full count
    async fn list(
        &self,
        target: RatingTarget,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<RatingWithAuthor>, i64)>;

    /// The user's own rating of a target, if any
    async fn get_user_rating(&self, user_id: i64, target: RatingTarget) -> Result<Option<Rating>>;
}

/// SQLx-based rating repository
pub struct SqlxRatingRepository {
    pool: DynDatabasePool,
}

impl SqlxRatingRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn RatingRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl RatingRepository for SqlxRatingRepository {
    async fn submit(
        &self,
        user_id: i64,
        target: RatingTarget,
        score: i64,
        feedback: Option<&str>,
    ) -> Result<AggregateSummary> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                submit_sqlite(self.pool.as_sqlite().unwrap(), user_id, target, score, feedback)
                    .await
            }
            DatabaseDriver::Mysql => {
                submit_mysql(self.pool.as_mysql().unwrap(), user_id, target, score, feedback).await
            }
        }
    }

    async fn list(
        &self,
        target: RatingTarget,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<RatingWithAuthor>, i64)> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_sqlite(self.pool.as_sqlite().unwrap(), target, limit, offset).await
            }
            DatabaseDriver::Mysql => {
                list_mysql(self.pool.as_mysql().unwrap(), target, limit, offset).await
            }
        }
    }

    async fn get_user_rating(&self, user_id: i64, target: RatingTarget) -> Result<Option<Rating>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_user_rating_sqlite(self.pool.as_sqlite().unwrap(), user_id, target).await
            }
            DatabaseDriver::Mysql => {
                get_user_rating_mysql(self.pool.as_mysql().unwrap(), user_id, target).await
            }
        }
    }
}

/// Table and id column holding the target's stored aggregate
fn aggregate_table(target: RatingTarget) -> &'static str {
    match target {
        RatingTarget::Slide(_) => "slides",
        RatingTarget::Page(_) => "slide_pages",
    }
}

// SQLite implementations

async fn submit_sqlite(
    pool: &SqlitePool,
    user_id: i64,
    target: RatingTarget,
    score: i64,
    feedback: Option<&str>,
) -> Result<AggregateSummary> {
    let mut tx = pool.begin().await.context("Failed to begin rating transaction")?;

    sqlx::query(
        "INSERT INTO ratings (user_id, target_id, target_kind, score, feedback, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?) \
         ON CONFLICT(user_id, target_id, target_kind) DO UPDATE SET \
         score = excluded.score, feedback = excluded.feedback, updated_at = excluded.updated_at",
    )
    .bind(user_id)
    .bind(target.id())
    .bind(target.kind_str())
    .bind(score)
    .bind(feedback)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await
    .context("Failed to upsert rating")?;

    let row = sqlx::query(
        "SELECT AVG(score) AS average, COUNT(*) AS count FROM ratings \
         WHERE target_id = ? AND target_kind = ?",
    )
    .bind(target.id())
    .bind(target.kind_str())
    .fetch_one(&mut *tx)
    .await
    .context("Failed to recompute rating aggregate")?;

    let raw: Option<f64> = row.get("average");
    let count: i64 = row.get("count");
    let summary = AggregateSummary {
        average: AggregateSummary::round_average(raw.unwrap_or(0.0)),
        count,
    };

    sqlx::query(&format!(
        "UPDATE {} SET avg_rating = ?, rating_count = ? WHERE id = ?",
        aggregate_table(target)
    ))
    .bind(summary.average)
    .bind(summary.count)
    .bind(target.id())
    .execute(&mut *tx)
    .await
    .context("Failed to store rating aggregate")?;

    tx.commit().await.context("Failed to commit rating transaction")?;
    Ok(summary)
}

async fn list_sqlite(
    pool: &SqlitePool,
    target: RatingTarget,
    limit: i64,
    offset: i64,
) -> Result<(Vec<RatingWithAuthor>, i64)> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM ratings WHERE target_id = ? AND target_kind = ?",
    )
    .bind(target.id())
    .bind(target.kind_str())
    .fetch_one(pool)
    .await
    .context("Failed to count ratings")?;

    let rows = sqlx::query(
        "SELECT rt.user_id, rt.score, rt.feedback, rt.updated_at, u.username, u.display_name \
         FROM ratings rt JOIN users u ON rt.user_id = u.id \
         WHERE rt.target_id = ? AND rt.target_kind = ? \
         ORDER BY rt.updated_at DESC, rt.user_id DESC LIMIT ? OFFSET ?",
    )
    .bind(target.id())
    .bind(target.kind_str())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list ratings")?;

    Ok((
        rows.iter()
            .map(|r| RatingWithAuthor {
                user_id: r.get("user_id"),
                author_name: r
                    .get::<Option<String>, _>("display_name")
                    .unwrap_or_else(|| r.get("username")),
                score: r.get("score"),
                feedback: r.get("feedback"),
                updated_at: r.get("updated_at"),
            })
            .collect(),
        total,
    ))
}

async fn get_user_rating_sqlite(
    pool: &SqlitePool,
    user_id: i64,
    target: RatingTarget,
) -> Result<Option<Rating>> {
    let row = sqlx::query(
        "SELECT user_id, target_id, target_kind, score, feedback, updated_at FROM ratings \
         WHERE user_id = ? AND target_id = ? AND target_kind = ?",
    )
    .bind(user_id)
    .bind(target.id())
    .bind(target.kind_str())
    .fetch_optional(pool)
    .await
    .context("Failed to get user rating")?;

    Ok(row.map(|r| Rating {
        user_id: r.get("user_id"),
        target_id: r.get("target_id"),
        target_kind: r.get("target_kind"),
        score: r.get("score"),
        feedback: r.get("feedback"),
        updated_at: r.get("updated_at"),
    }))
}

// MySQL implementations

async fn submit_mysql(
    pool: &MySqlPool,
    user_id: i64,
    target: RatingTarget,
    score: i64,
    feedback: Option<&str>,
) -> Result<AggregateSummary> {
    let mut tx = pool.begin().await.context("Failed to begin rating transaction")?;

    // Concurrent raters must serialize on the target row, or the recompute
    // below reads a REPEATABLE READ snapshot that misses their rows
    sqlx::query(&format!(
        "SELECT id FROM {} WHERE id = ? FOR UPDATE",
        aggregate_table(target)
    ))
    .bind(target.id())
    .fetch_optional(&mut *tx)
    .await
    .context("Failed to lock rating target")?;

    sqlx::query(
        "INSERT INTO ratings (user_id, target_id, target_kind, score, feedback, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?) \
         ON DUPLICATE KEY UPDATE \
         score = VALUES(score), feedback = VALUES(feedback), updated_at = VALUES(updated_at)",
    )
    .bind(user_id)
    .bind(target.id())
    .bind(target.kind_str())
    .bind(score)
    .bind(feedback)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await
    .context("Failed to upsert rating")?;

    let row = sqlx::query(
        "SELECT AVG(score) AS average, COUNT(*) AS count FROM ratings \
         WHERE target_id = ? AND target_kind = ?",
    )
    .bind(target.id())
    .bind(target.kind_str())
    .fetch_one(&mut *tx)
    .await
    .context("Failed to recompute rating aggregate")?;

    let raw: Option<f64> = row.get("average");
    let count: i64 = row.get("count");
    let summary = AggregateSummary {
        average: AggregateSummary::round_average(raw.unwrap_or(0.0)),
        count,
    };

    sqlx::query(&format!(
        "UPDATE {} SET avg_rating = ?, rating_count = ? WHERE id = ?",
        aggregate_table(target)
    ))
    .bind(summary.average)
    .bind(summary.count)
    .bind(target.id())
    .execute(&mut *tx)
    .await
    .context("Failed to store rating aggregate")?;

    tx.commit().await.context("Failed to commit rating transaction")?;
    Ok(summary)
}

async fn list_mysql(
    pool: &MySqlPool,
    target: RatingTarget,
    limit: i64,
    offset: i64,
) -> Result<(Vec<RatingWithAuthor>, i64)> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM ratings WHERE target_id = ? AND target_kind = ?",
    )
    .bind(target.id())
    .bind(target.kind_str())
    .fetch_one(pool)
    .await
    .context("Failed to count ratings")?;

    let rows = sqlx::query(
        "SELECT rt.user_id, rt.score, rt.feedback, rt.updated_at, u.username, u.display_name \
         FROM ratings rt JOIN users u ON rt.user_id = u.id \
         WHERE rt.target_id = ? AND rt.target_kind = ? \
         ORDER BY rt.updated_at DESC, rt.user_id DESC LIMIT ? OFFSET ?",
    )
    .bind(target.id())
    .bind(target.kind_str())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list ratings")?;

    Ok((
        rows.iter()
            .map(|r| RatingWithAuthor {
                user_id: r.get("user_id"),
                author_name: r
                    .get::<Option<String>, _>("display_name")
                    .unwrap_or_else(|| r.get("username")),
                score: r.get("score"),
                feedback: r.get("feedback"),
                updated_at: r.get("updated_at"),
            })
            .collect(),
        total,
    ))
}

async fn get_user_rating_mysql(
    pool: &MySqlPool,
    user_id: i64,
    target: RatingTarget,
) -> Result<Option<Rating>> {
    let row = sqlx::query(
        "SELECT user_id, target_id, target_kind, score, feedback, updated_at FROM ratings \
         WHERE user_id = ? AND target_id = ? AND target_kind = ?",
    )
    .bind(user_id)
    .bind(target.id())
    .bind(target.kind_str())
    .fetch_optional(pool)
    .await
    .context("Failed to get user rating")?;

    Ok(row.map(|r| Rating {
        user_id: r.get("user_id"),
        target_id: r.get("target_id"),
        target_kind: r.get("target_kind"),
        score: r.get("score"),
        feedback: r.get("feedback"),
        updated_at: r.get("updated_at"),
    }))
}
