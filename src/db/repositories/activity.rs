//! Activity feed sources
//!
//! Each source is an independent bounded query over the tables the other
//! repositories mutate; the composer merges and paginates the results.
//! Know-how sources only surface public articles. Replies surface through
//! the comment sources, tagged with the parent comment's target.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{excerpt, ActivityRecord};

/// Which thread rows a comment source emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentInclusion {
    #[default]
    All,
    CommentsOnly,
    RepliesOnly,
}

impl CommentInclusion {
    fn comments(self) -> bool {
        matches!(self, Self::All | Self::CommentsOnly)
    }

    fn replies(self) -> bool {
        matches!(self, Self::All | Self::RepliesOnly)
    }
}

/// Activity source repository trait
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Latest slide uploads, optionally limited to one uploader
    async fn recent_uploads(&self, author: Option<i64>, cap: i64) -> Result<Vec<ActivityRecord>>;

    /// Latest comments and replies on slides
    async fn recent_slide_comments(
        &self,
        author: Option<i64>,
        slide: Option<i64>,
        inclusion: CommentInclusion,
        cap: i64,
    ) -> Result<Vec<ActivityRecord>>;

    /// Latest comments and replies on public know-how articles
    async fn recent_knowhow_comments(
        &self,
        author: Option<i64>,
        inclusion: CommentInclusion,
        cap: i64,
    ) -> Result<Vec<ActivityRecord>>;

    /// Latest public know-how articles
    async fn recent_knowhow_posts(
        &self,
        author: Option<i64>,
        cap: i64,
    ) -> Result<Vec<ActivityRecord>>;
}

/// SQLx-based activity source repository
pub struct SqlxActivityRepository {
    pool: DynDatabasePool,
}

impl SqlxActivityRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ActivityRepository> {
        Arc::new(Self::new(pool))
    }

    async fn fetch(&self, sql: &str, binds: &[i64]) -> Result<Vec<FeedRow>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => fetch_sqlite(self.pool.as_sqlite().unwrap(), sql, binds).await,
            DatabaseDriver::Mysql => fetch_mysql(self.pool.as_mysql().unwrap(), sql, binds).await,
        }
    }
}

/// Common shape every source query selects into; the queries are plain
/// ANSI SQL so both drivers share them
struct FeedRow {
    target_id: i64,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
}

async fn fetch_sqlite(pool: &SqlitePool, sql: &str, binds: &[i64]) -> Result<Vec<FeedRow>> {
    let mut query = sqlx::query(sql);
    for bind in binds {
        query = query.bind(bind);
    }
    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to fetch activity source")?;
    Ok(rows
        .iter()
        .map(|r| FeedRow {
            target_id: r.get("target_id"),
            title: r.get("title"),
            content: r.get("content"),
            created_at: r.get("created_at"),
        })
        .collect())
}

async fn fetch_mysql(pool: &MySqlPool, sql: &str, binds: &[i64]) -> Result<Vec<FeedRow>> {
    let mut query = sqlx::query(sql);
    for bind in binds {
        query = query.bind(bind);
    }
    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to fetch activity source")?;
    Ok(rows
        .iter()
        .map(|r| FeedRow {
            target_id: r.get("target_id"),
            title: r.get("title"),
            content: r.get("content"),
            created_at: r.get("created_at"),
        })
        .collect())
}

/// Build the UNION over a comment source's branches, appending the
/// optional author and slide conditions to each included branch. Binds are
/// returned in placeholder order.
fn comment_union_sql(
    comment_branch: &str,
    reply_branch: &str,
    inclusion: CommentInclusion,
    author: Option<i64>,
    slide: Option<i64>,
) -> (String, Vec<i64>) {
    let mut parts = Vec::new();
    let mut binds = Vec::new();

    if inclusion.comments() {
        let mut branch = comment_branch.to_string();
        if let Some(author) = author {
            branch.push_str(" AND c.user_id = ?");
            binds.push(author);
        }
        if let Some(slide) = slide {
            branch.push_str(" AND c.slide_id = ?");
            binds.push(slide);
        }
        parts.push(branch);
    }
    if inclusion.replies() {
        let mut branch = reply_branch.to_string();
        if let Some(author) = author {
            branch.push_str(" AND r.user_id = ?");
            binds.push(author);
        }
        if let Some(slide) = slide {
            branch.push_str(" AND c.slide_id = ?");
            binds.push(slide);
        }
        parts.push(branch);
    }

    let sql = format!(
        "SELECT * FROM ({}) AS activity ORDER BY created_at DESC, target_id DESC LIMIT ?",
        parts.join(" UNION ALL ")
    );
    (sql, binds)
}

const SLIDE_COMMENT_BRANCH: &str = "SELECT s.id AS target_id, s.title AS title, \
     c.content AS content, c.created_at AS created_at \
     FROM comments c JOIN slides s ON c.slide_id = s.id WHERE c.slide_id IS NOT NULL";

const SLIDE_REPLY_BRANCH: &str = "SELECT s.id AS target_id, s.title AS title, \
     r.content AS content, r.created_at AS created_at \
     FROM replies r JOIN comments c ON r.comment_id = c.id \
     JOIN slides s ON c.slide_id = s.id WHERE c.slide_id IS NOT NULL";

const KNOWHOW_COMMENT_BRANCH: &str = "SELECT a.id AS target_id, a.title AS title, \
     c.content AS content, c.created_at AS created_at \
     FROM comments c JOIN articles a ON c.article_id = a.id \
     WHERE c.article_id IS NOT NULL AND a.is_public = 1";

const KNOWHOW_REPLY_BRANCH: &str = "SELECT a.id AS target_id, a.title AS title, \
     r.content AS content, r.created_at AS created_at \
     FROM replies r JOIN comments c ON r.comment_id = c.id \
     JOIN articles a ON c.article_id = a.id \
     WHERE c.article_id IS NOT NULL AND a.is_public = 1";

#[async_trait]
impl ActivityRepository for SqlxActivityRepository {
    async fn recent_uploads(&self, author: Option<i64>, cap: i64) -> Result<Vec<ActivityRecord>> {
        let mut sql = String::from(
            "SELECT id AS target_id, title, '' AS content, created_at FROM slides WHERE 1 = 1",
        );
        let mut binds = Vec::new();
        if let Some(author) = author {
            sql.push_str(" AND user_id = ?");
            binds.push(author);
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ?");
        binds.push(cap);

        let rows = self.fetch(&sql, &binds).await?;
        Ok(rows
            .into_iter()
            .map(|r| ActivityRecord::Upload {
                slide_id: r.target_id,
                title: r.title,
                timestamp: r.created_at,
            })
            .collect())
    }

    async fn recent_slide_comments(
        &self,
        author: Option<i64>,
        slide: Option<i64>,
        inclusion: CommentInclusion,
        cap: i64,
    ) -> Result<Vec<ActivityRecord>> {
        let (sql, mut binds) = comment_union_sql(
            SLIDE_COMMENT_BRANCH,
            SLIDE_REPLY_BRANCH,
            inclusion,
            author,
            slide,
        );
        binds.push(cap);

        let rows = self.fetch(&sql, &binds).await?;
        Ok(rows
            .into_iter()
            .map(|r| ActivityRecord::SlideComment {
                slide_id: r.target_id,
                title: r.title,
                excerpt: excerpt(&r.content),
                timestamp: r.created_at,
            })
            .collect())
    }

    async fn recent_knowhow_comments(
        &self,
        author: Option<i64>,
        inclusion: CommentInclusion,
        cap: i64,
    ) -> Result<Vec<ActivityRecord>> {
        let (sql, mut binds) = comment_union_sql(
            KNOWHOW_COMMENT_BRANCH,
            KNOWHOW_REPLY_BRANCH,
            inclusion,
            author,
            None,
        );
        binds.push(cap);

        let rows = self.fetch(&sql, &binds).await?;
        Ok(rows
            .into_iter()
            .map(|r| ActivityRecord::KnowhowComment {
                article_id: r.target_id,
                title: r.title,
                excerpt: excerpt(&r.content),
                timestamp: r.created_at,
            })
            .collect())
    }

    async fn recent_knowhow_posts(
        &self,
        author: Option<i64>,
        cap: i64,
    ) -> Result<Vec<ActivityRecord>> {
        let mut sql = String::from(
            "SELECT id AS target_id, title, content, created_at FROM articles WHERE is_public = 1",
        );
        let mut binds = Vec::new();
        if let Some(author) = author {
            sql.push_str(" AND user_id = ?");
            binds.push(author);
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ?");
        binds.push(cap);

        let rows = self.fetch(&sql, &binds).await?;
        Ok(rows
            .into_iter()
            .map(|r| ActivityRecord::KnowhowPost {
                article_id: r.target_id,
                title: r.title,
                excerpt: excerpt(&r.content),
                timestamp: r.created_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{
        migrated_pool, seed_article, seed_article_at, seed_slide_at, seed_user,
    };
    use chrono::{Duration, Utc};

    async fn seed_comment_at(
        pool: &DynDatabasePool,
        slide_id: Option<i64>,
        article_id: Option<i64>,
        user_id: i64,
        content: &str,
        at: DateTime<Utc>,
    ) -> i64 {
        sqlx::query(
            "INSERT INTO comments (slide_id, article_id, user_id, content, kind, created_at) \
             VALUES (?, ?, ?, ?, 'comment', ?)",
        )
        .bind(slide_id)
        .bind(article_id)
        .bind(user_id)
        .bind(content)
        .bind(at)
        .execute(pool.as_sqlite().unwrap())
        .await
        .unwrap()
        .last_insert_rowid()
    }

    async fn seed_reply_at(
        pool: &DynDatabasePool,
        comment_id: i64,
        user_id: i64,
        content: &str,
        at: DateTime<Utc>,
    ) {
        sqlx::query(
            "INSERT INTO replies (comment_id, user_id, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(comment_id)
        .bind(user_id)
        .bind(content)
        .bind(at)
        .execute(pool.as_sqlite().unwrap())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_uploads_newest_first_with_author_filter() {
        let pool = migrated_pool().await;
        seed_user(&pool, 1, "saito").await;
        seed_user(&pool, 2, "goto").await;
        let base = Utc::now();
        seed_slide_at(&pool, 10, 1, "Older deck", base - Duration::hours(2)).await;
        seed_slide_at(&pool, 11, 2, "Newer deck", base - Duration::hours(1)).await;
        let repo = SqlxActivityRepository::new(pool);

        let all = repo.recent_uploads(None, 50).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(matches!(&all[0], ActivityRecord::Upload { slide_id: 11, .. }));

        let mine = repo.recent_uploads(Some(1), 50).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert!(matches!(&mine[0], ActivityRecord::Upload { slide_id: 10, .. }));
    }

    #[tokio::test]
    async fn test_slide_comments_include_replies_and_honor_inclusion() {
        let pool = migrated_pool().await;
        seed_user(&pool, 1, "saito").await;
        seed_user(&pool, 2, "goto").await;
        let base = Utc::now();
        seed_slide_at(&pool, 10, 1, "Kanji radicals", base - Duration::days(1)).await;
        let comment = seed_comment_at(
            &pool,
            Some(10),
            None,
            1,
            "top-level note",
            base - Duration::hours(3),
        )
        .await;
        seed_reply_at(&pool, comment, 2, "a reply", base - Duration::hours(1)).await;
        let repo = SqlxActivityRepository::new(pool);

        let all = repo
            .recent_slide_comments(None, None, CommentInclusion::All, 50)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        // The reply is newer and sorts first, tagged with the slide target
        assert!(matches!(
            &all[0],
            ActivityRecord::SlideComment { slide_id: 10, excerpt: Some(e), .. } if e == "a reply"
        ));

        let replies_only = repo
            .recent_slide_comments(None, None, CommentInclusion::RepliesOnly, 50)
            .await
            .unwrap();
        assert_eq!(replies_only.len(), 1);

        let by_author = repo
            .recent_slide_comments(Some(1), None, CommentInclusion::All, 50)
            .await
            .unwrap();
        assert_eq!(by_author.len(), 1);
        assert!(matches!(
            &by_author[0],
            ActivityRecord::SlideComment { excerpt: Some(e), .. } if e == "top-level note"
        ));
    }

    #[tokio::test]
    async fn test_knowhow_sources_skip_private_articles() {
        let pool = migrated_pool().await;
        seed_user(&pool, 1, "saito").await;
        seed_article(&pool, 20, 1, "Public tips").await;
        seed_article_at(&pool, 21, 1, "Draft", false, Utc::now()).await;
        seed_comment_at(&pool, None, Some(21), 1, "on the draft", Utc::now()).await;
        let repo = SqlxActivityRepository::new(pool);

        let posts = repo.recent_knowhow_posts(None, 50).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert!(matches!(&posts[0], ActivityRecord::KnowhowPost { article_id: 20, .. }));

        let comments = repo
            .recent_knowhow_comments(None, CommentInclusion::All, 50)
            .await
            .unwrap();
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn test_cap_bounds_each_source() {
        let pool = migrated_pool().await;
        seed_user(&pool, 1, "saito").await;
        let base = Utc::now();
        for i in 0..5 {
            seed_slide_at(&pool, 10 + i, 1, "Deck", base - Duration::minutes(i)).await;
        }
        let repo = SqlxActivityRepository::new(pool);

        let capped = repo.recent_uploads(None, 3).await.unwrap();
        assert_eq!(capped.len(), 3);
        assert!(matches!(&capped[0], ActivityRecord::Upload { slide_id: 10, .. }));
    }
}
