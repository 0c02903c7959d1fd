//! Comment and reply repository
//!
//! Threads hang off a slide XOR a know-how article. Deleting a comment
//! removes its replies through the `replies.comment_id` cascade declared in
//! the migrations; the repository never has to clean them up by hand.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{
    Comment, CommentKind, CommentParent, CommentSort, CommentWithAuthor, Reply, ReplyWithAuthor,
};

/// Keyword / rating filters for comment search; both optional, combined
/// with AND
#[derive(Debug, Clone, Default)]
pub struct CommentSearch {
    /// Case-insensitive substring match against content
    pub keyword: Option<String>,
    /// Keep only comments whose author rated the slide's difficulty at or
    /// above this score
    pub min_rating: Option<i64>,
}

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a comment under the given parent
    async fn create(
        &self,
        parent: CommentParent,
        user_id: i64,
        content: &str,
        kind: CommentKind,
    ) -> Result<Comment>;

    /// Get a comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// One page of a parent's comments, with the full matching count
    async fn list(
        &self,
        parent: CommentParent,
        sort: CommentSort,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CommentWithAuthor>, i64)>;

    /// One page of comments matching the search filters, with the full
    /// matching count
    async fn search(
        &self,
        parent: CommentParent,
        filters: &CommentSearch,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CommentWithAuthor>, i64)>;

    /// Delete a comment (replies go with it). Returns false if absent.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Insert a reply under a comment
    async fn create_reply(&self, comment_id: i64, user_id: i64, content: &str) -> Result<Reply>;

    /// All replies to a comment, oldest first
    async fn list_replies(&self, comment_id: i64) -> Result<Vec<ReplyWithAuthor>>;
}

/// SQLx-based comment repository
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(
        &self,
        parent: CommentParent,
        user_id: i64,
        content: &str,
        kind: CommentKind,
    ) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_sqlite(self.pool.as_sqlite().unwrap(), parent, user_id, content, kind).await
            }
            DatabaseDriver::Mysql => {
                create_mysql(self.pool.as_mysql().unwrap(), parent, user_id, content, kind).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(
        &self,
        parent: CommentParent,
        sort: CommentSort,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CommentWithAuthor>, i64)> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_sqlite(self.pool.as_sqlite().unwrap(), parent, sort, limit, offset).await
            }
            DatabaseDriver::Mysql => {
                list_mysql(self.pool.as_mysql().unwrap(), parent, sort, limit, offset).await
            }
        }
    }

    async fn search(
        &self,
        parent: CommentParent,
        filters: &CommentSearch,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CommentWithAuthor>, i64)> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                search_sqlite(self.pool.as_sqlite().unwrap(), parent, filters, limit, offset).await
            }
            DatabaseDriver::Mysql => {
                search_mysql(self.pool.as_mysql().unwrap(), parent, filters, limit, offset).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn create_reply(&self, comment_id: i64, user_id: i64, content: &str) -> Result<Reply> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_reply_sqlite(self.pool.as_sqlite().unwrap(), comment_id, user_id, content)
                    .await
            }
            DatabaseDriver::Mysql => {
                create_reply_mysql(self.pool.as_mysql().unwrap(), comment_id, user_id, content)
                    .await
            }
        }
    }

    async fn list_replies(&self, comment_id: i64) -> Result<Vec<ReplyWithAuthor>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_replies_sqlite(self.pool.as_sqlite().unwrap(), comment_id).await
            }
            DatabaseDriver::Mysql => {
                list_replies_mysql(self.pool.as_mysql().unwrap(), comment_id).await
            }
        }
    }
}

/// Column the parent filters on, plus its id
fn parent_column(parent: CommentParent) -> (&'static str, i64) {
    match parent {
        CommentParent::Slide(id) => ("slide_id", id),
        CommentParent::Knowhow(id) => ("article_id", id),
    }
}

const COMMENT_SELECT: &str = "SELECT c.id, c.slide_id, c.article_id, c.user_id, c.content, \
     c.kind, c.created_at, u.username, u.display_name, u.email, \
     (SELECT COUNT(*) FROM replies r WHERE r.comment_id = c.id) AS reply_count \
     FROM comments c JOIN users u ON c.user_id = u.id";

fn author_name(username: String, display_name: Option<String>) -> String {
    display_name.unwrap_or(username)
}

// SQLite implementations

fn sqlite_row_to_comment_with_author(row: &sqlx::sqlite::SqliteRow) -> CommentWithAuthor {
    let email: Option<String> = row.get("email");
    CommentWithAuthor {
        id: row.get("id"),
        slide_id: row.get("slide_id"),
        article_id: row.get("article_id"),
        user_id: row.get("user_id"),
        author_name: author_name(row.get("username"), row.get("display_name")),
        avatar_url: CommentWithAuthor::gravatar_url(&email),
        content: row.get("content"),
        kind: row
            .get::<String, _>("kind")
            .parse()
            .unwrap_or(CommentKind::Comment),
        created_at: row.get("created_at"),
        reply_count: row.get("reply_count"),
    }
}

async fn create_sqlite(
    pool: &SqlitePool,
    parent: CommentParent,
    user_id: i64,
    content: &str,
    kind: CommentKind,
) -> Result<Comment> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO comments (slide_id, article_id, user_id, content, kind, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(parent.slide_id())
    .bind(parent.article_id())
    .bind(user_id)
    .bind(content)
    .bind(kind.to_string())
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_rowid(),
        slide_id: parent.slide_id(),
        article_id: parent.article_id(),
        user_id,
        content: content.to_string(),
        kind,
        created_at: now,
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(
        "SELECT id, slide_id, article_id, user_id, content, kind, created_at \
         FROM comments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get comment by ID")?;

    Ok(row.map(|r| Comment {
        id: r.get("id"),
        slide_id: r.get("slide_id"),
        article_id: r.get("article_id"),
        user_id: r.get("user_id"),
        content: r.get("content"),
        kind: r
            .get::<String, _>("kind")
            .parse()
            .unwrap_or(CommentKind::Comment),
        created_at: r.get("created_at"),
    }))
}

async fn list_sqlite(
    pool: &SqlitePool,
    parent: CommentParent,
    sort: CommentSort,
    limit: i64,
    offset: i64,
) -> Result<(Vec<CommentWithAuthor>, i64)> {
    let (column, parent_id) = parent_column(parent);
    let order = match sort {
        CommentSort::Newest => "c.created_at DESC, c.id DESC",
        CommentSort::Oldest => "c.created_at ASC, c.id ASC",
    };

    let total: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM comments WHERE {} = ?", column))
            .bind(parent_id)
            .fetch_one(pool)
            .await
            .context("Failed to count comments")?;

    let rows = sqlx::query(&format!(
        "{} WHERE c.{} = ? ORDER BY {} LIMIT ? OFFSET ?",
        COMMENT_SELECT, column, order
    ))
    .bind(parent_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list comments")?;

    Ok((
        rows.iter().map(sqlite_row_to_comment_with_author).collect(),
        total,
    ))
}

/// Escape LIKE wildcards so a keyword matches literally
fn escape_like(keyword: &str) -> String {
    keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Shared WHERE clause for search; placeholder syntax is identical on both
/// drivers, only the LIKE concatenation and escape literal differ
fn search_conditions(filters: &CommentSearch, like_expr: &str) -> String {
    let mut conditions = String::new();
    if filters.keyword.is_some() {
        conditions.push_str(&format!(" AND LOWER(c.content) LIKE {}", like_expr));
    }
    if filters.min_rating.is_some() {
        conditions.push_str(
            " AND EXISTS (SELECT 1 FROM ratings rt WHERE rt.user_id = c.user_id \
             AND rt.target_id = c.slide_id AND rt.target_kind = 'slide' AND rt.score >= ?)",
        );
    }
    conditions
}

async fn search_sqlite(
    pool: &SqlitePool,
    parent: CommentParent,
    filters: &CommentSearch,
    limit: i64,
    offset: i64,
) -> Result<(Vec<CommentWithAuthor>, i64)> {
    let (column, parent_id) = parent_column(parent);
    let conditions = search_conditions(filters, "'%' || LOWER(?) || '%' ESCAPE '\\'");

    let count_sql = format!(
        "SELECT COUNT(*) FROM comments c WHERE c.{} = ?{}",
        column, conditions
    );
    let mut count_query = sqlx::query_scalar(&count_sql).bind(parent_id);
    if let Some(keyword) = &filters.keyword {
        count_query = count_query.bind(escape_like(keyword));
    }
    if let Some(min) = filters.min_rating {
        count_query = count_query.bind(min);
    }
    let total: i64 = count_query
        .fetch_one(pool)
        .await
        .context("Failed to count matching comments")?;

    let rows_sql = format!(
        "{} WHERE c.{} = ?{} ORDER BY c.created_at DESC, c.id DESC LIMIT ? OFFSET ?",
        COMMENT_SELECT, column, conditions
    );
    let mut rows_query = sqlx::query(&rows_sql).bind(parent_id);
    if let Some(keyword) = &filters.keyword {
        rows_query = rows_query.bind(escape_like(keyword));
    }
    if let Some(min) = filters.min_rating {
        rows_query = rows_query.bind(min);
    }
    let rows = rows_query
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to search comments")?;

    Ok((
        rows.iter().map(sqlite_row_to_comment_with_author).collect(),
        total,
    ))
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;
    Ok(result.rows_affected() > 0)
}

async fn create_reply_sqlite(
    pool: &SqlitePool,
    comment_id: i64,
    user_id: i64,
    content: &str,
) -> Result<Reply> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO replies (comment_id, user_id, content, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(comment_id)
    .bind(user_id)
    .bind(content)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create reply")?;

    Ok(Reply {
        id: result.last_insert_rowid(),
        comment_id,
        user_id,
        content: content.to_string(),
        created_at: now,
    })
}

async fn list_replies_sqlite(pool: &SqlitePool, comment_id: i64) -> Result<Vec<ReplyWithAuthor>> {
    let rows = sqlx::query(
        "SELECT r.id, r.comment_id, r.user_id, r.content, r.created_at, \
         u.username, u.display_name, u.email \
         FROM replies r JOIN users u ON r.user_id = u.id \
         WHERE r.comment_id = ? ORDER BY r.created_at ASC, r.id ASC",
    )
    .bind(comment_id)
    .fetch_all(pool)
    .await
    .context("Failed to list replies")?;

    Ok(rows
        .iter()
        .map(|r| {
            let email: Option<String> = r.get("email");
            ReplyWithAuthor {
                id: r.get("id"),
                comment_id: r.get("comment_id"),
                user_id: r.get("user_id"),
                author_name: author_name(r.get("username"), r.get("display_name")),
                avatar_url: CommentWithAuthor::gravatar_url(&email),
                content: r.get("content"),
                created_at: r.get("created_at"),
            }
        })
        .collect())
}

// MySQL implementations

fn mysql_row_to_comment_with_author(row: &sqlx::mysql::MySqlRow) -> CommentWithAuthor {
    let email: Option<String> = row.get("email");
    CommentWithAuthor {
        id: row.get("id"),
        slide_id: row.get("slide_id"),
        article_id: row.get("article_id"),
        user_id: row.get("user_id"),
        author_name: author_name(row.get("username"), row.get("display_name")),
        avatar_url: CommentWithAuthor::gravatar_url(&email),
        content: row.get("content"),
        kind: row
            .get::<String, _>("kind")
            .parse()
            .unwrap_or(CommentKind::Comment),
        created_at: row.get("created_at"),
        reply_count: row.get("reply_count"),
    }
}

async fn create_mysql(
    pool: &MySqlPool,
    parent: CommentParent,
    user_id: i64,
    content: &str,
    kind: CommentKind,
) -> Result<Comment> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO comments (slide_id, article_id, user_id, content, kind, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(parent.slide_id())
    .bind(parent.article_id())
    .bind(user_id)
    .bind(content)
    .bind(kind.to_string())
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_id() as i64,
        slide_id: parent.slide_id(),
        article_id: parent.article_id(),
        user_id,
        content: content.to_string(),
        kind,
        created_at: now,
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(
        "SELECT id, slide_id, article_id, user_id, content, kind, created_at \
         FROM comments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get comment by ID")?;

    Ok(row.map(|r| Comment {
        id: r.get("id"),
        slide_id: r.get("slide_id"),
        article_id: r.get("article_id"),
        user_id: r.get("user_id"),
        content: r.get("content"),
        kind: r
            .get::<String, _>("kind")
            .parse()
            .unwrap_or(CommentKind::Comment),
        created_at: r.get("created_at"),
    }))
}

async fn list_mysql(
    pool: &MySqlPool,
    parent: CommentParent,
    sort: CommentSort,
    limit: i64,
    offset: i64,
) -> Result<(Vec<CommentWithAuthor>, i64)> {
    let (column, parent_id) = parent_column(parent);
    let order = match sort {
        CommentSort::Newest => "c.created_at DESC, c.id DESC",
        CommentSort::Oldest => "c.created_at ASC, c.id ASC",
    };

    let total: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM comments WHERE {} = ?", column))
            .bind(parent_id)
            .fetch_one(pool)
            .await
            .context("Failed to count comments")?;

    let rows = sqlx::query(&format!(
        "{} WHERE c.{} = ? ORDER BY {} LIMIT ? OFFSET ?",
        COMMENT_SELECT, column, order
    ))
    .bind(parent_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list comments")?;

    Ok((
        rows.iter().map(mysql_row_to_comment_with_author).collect(),
        total,
    ))
}

async fn search_mysql(
    pool: &MySqlPool,
    parent: CommentParent,
    filters: &CommentSearch,
    limit: i64,
    offset: i64,
) -> Result<(Vec<CommentWithAuthor>, i64)> {
    let (column, parent_id) = parent_column(parent);
    let conditions = search_conditions(filters, "CONCAT('%', LOWER(?), '%') ESCAPE '\\\\'");

    let count_sql = format!(
        "SELECT COUNT(*) FROM comments c WHERE c.{} = ?{}",
        column, conditions
    );
    let mut count_query = sqlx::query_scalar(&count_sql).bind(parent_id);
    if let Some(keyword) = &filters.keyword {
        count_query = count_query.bind(escape_like(keyword));
    }
    if let Some(min) = filters.min_rating {
        count_query = count_query.bind(min);
    }
    let total: i64 = count_query
        .fetch_one(pool)
        .await
        .context("Failed to count matching comments")?;

    let rows_sql = format!(
        "{} WHERE c.{} = ?{} ORDER BY c.created_at DESC, c.id DESC LIMIT ? OFFSET ?",
        COMMENT_SELECT, column, conditions
    );
    let mut rows_query = sqlx::query(&rows_sql).bind(parent_id);
    if let Some(keyword) = &filters.keyword {
        rows_query = rows_query.bind(escape_like(keyword));
    }
    if let Some(min) = filters.min_rating {
        rows_query = rows_query.bind(min);
    }
    let rows = rows_query
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to search comments")?;

    Ok((
        rows.iter().map(mysql_row_to_comment_with_author).collect(),
        total,
    ))
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;
    Ok(result.rows_affected() > 0)
}

async fn create_reply_mysql(
    pool: &MySqlPool,
    comment_id: i64,
    user_id: i64,
    content: &str,
) -> Result<Reply> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO replies (comment_id, user_id, content, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(comment_id)
    .bind(user_id)
    .bind(content)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create reply")?;

    Ok(Reply {
        id: result.last_insert_id() as i64,
        comment_id,
        user_id,
        content: content.to_string(),
        created_at: now,
    })
}

async fn list_replies_mysql(pool: &MySqlPool, comment_id: i64) -> Result<Vec<ReplyWithAuthor>> {
    let rows = sqlx::query(
        "SELECT r.id, r.comment_id, r.user_id, r.content, r.created_at, \
         u.username, u.display_name, u.email \
         FROM replies r JOIN users u ON r.user_id = u.id \
         WHERE r.comment_id = ? ORDER BY r.created_at ASC, r.id ASC",
    )
    .bind(comment_id)
    .fetch_all(pool)
    .await
    .context("Failed to list replies")?;

    Ok(rows
        .iter()
        .map(|r| {
            let email: Option<String> = r.get("email");
            ReplyWithAuthor {
                id: r.get("id"),
                comment_id: r.get("comment_id"),
                user_id: r.get("user_id"),
                author_name: author_name(r.get("username"), r.get("display_name")),
                avatar_url: CommentWithAuthor::gravatar_url(&email),
                content: r.get("content"),
                created_at: r.get("created_at"),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{
        migrated_pool, seed_article, seed_slide, seed_user,
    };

    async fn setup() -> (crate::db::DynDatabasePool, SqlxCommentRepository) {
        let pool = migrated_pool().await;
        seed_user(&pool, 1, "tanaka").await;
        seed_user(&pool, 2, "suzuki").await;
        seed_slide(&pool, 10, 1, "Counting words").await;
        seed_article(&pool, 20, 2, "First lesson tips").await;
        let repo = SqlxCommentRepository::new(pool.clone());
        (pool, repo)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_pool, repo) = setup().await;

        let comment = repo
            .create(CommentParent::Slide(10), 2, "Nice deck", CommentKind::Comment)
            .await
            .unwrap();
        assert_eq!(comment.slide_id, Some(10));
        assert_eq!(comment.article_id, None);

        let found = repo.get_by_id(comment.id).await.unwrap().unwrap();
        assert_eq!(found.content, "Nice deck");
        assert_eq!(found.kind, CommentKind::Comment);
    }

    #[tokio::test]
    async fn test_list_sorts_and_counts() {
        let (_pool, repo) = setup().await;

        for i in 0..3 {
            repo.create(
                CommentParent::Slide(10),
                1,
                &format!("comment {}", i),
                CommentKind::Comment,
            )
            .await
            .unwrap();
        }
        // A comment on another parent must not leak in
        repo.create(CommentParent::Knowhow(20), 1, "elsewhere", CommentKind::Comment)
            .await
            .unwrap();

        let (page, total) = repo
            .list(CommentParent::Slide(10), CommentSort::Newest, 2, 0)
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].content, "comment 2");

        let (oldest, _) = repo
            .list(CommentParent::Slide(10), CommentSort::Oldest, 10, 0)
            .await
            .unwrap();
        assert_eq!(oldest[0].content, "comment 0");
    }

    #[tokio::test]
    async fn test_search_keyword_case_insensitive() {
        let (_pool, repo) = setup().await;

        repo.create(CommentParent::Slide(10), 1, "Used this in Tokyo", CommentKind::Comment)
            .await
            .unwrap();
        repo.create(CommentParent::Slide(10), 1, "Used this in Osaka", CommentKind::Comment)
            .await
            .unwrap();

        let filters = CommentSearch {
            keyword: Some("tokyo".to_string()),
            min_rating: None,
        };
        let (matches, total) = repo
            .search(CommentParent::Slide(10), &filters, 10, 0)
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(matches[0].content, "Used this in Tokyo");
    }

    #[tokio::test]
    async fn test_search_wildcards_match_literally() {
        let (_pool, repo) = setup().await;

        repo.create(CommentParent::Slide(10), 1, "Tokyo field trip", CommentKind::Comment)
            .await
            .unwrap();
        repo.create(CommentParent::Slide(10), 2, "100% worth printing", CommentKind::Comment)
            .await
            .unwrap();

        let filters = CommentSearch {
            keyword: Some("%".to_string()),
            min_rating: None,
        };
        let (matches, total) = repo
            .search(CommentParent::Slide(10), &filters, 10, 0)
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(matches[0].content, "100% worth printing");

        let filters = CommentSearch {
            keyword: Some("d_trip".to_string()),
            min_rating: None,
        };
        let (_, total) = repo
            .search(CommentParent::Slide(10), &filters, 10, 0)
            .await
            .unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_search_min_rating_uses_author_slide_rating() {
        let (pool, repo) = setup().await;

        // tanaka rated the slide 80, suzuki never rated it
        sqlx::query(
            "INSERT INTO ratings (user_id, target_id, target_kind, score) VALUES (1, 10, 'slide', 80)",
        )
        .execute(pool.as_sqlite().unwrap())
        .await
        .unwrap();

        repo.create(CommentParent::Slide(10), 1, "from a rater", CommentKind::Comment)
            .await
            .unwrap();
        repo.create(CommentParent::Slide(10), 2, "from a non-rater", CommentKind::Comment)
            .await
            .unwrap();

        let filters = CommentSearch {
            keyword: None,
            min_rating: Some(70),
        };
        let (matches, total) = repo
            .search(CommentParent::Slide(10), &filters, 10, 0)
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(matches[0].content, "from a rater");

        let strict = CommentSearch {
            keyword: None,
            min_rating: Some(90),
        };
        let (_, none) = repo
            .search(CommentParent::Slide(10), &strict, 10, 0)
            .await
            .unwrap();
        assert_eq!(none, 0);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_replies() {
        let (_pool, repo) = setup().await;

        let comment = repo
            .create(CommentParent::Slide(10), 1, "parent", CommentKind::Proposal)
            .await
            .unwrap();
        repo.create_reply(comment.id, 2, "first reply").await.unwrap();
        repo.create_reply(comment.id, 1, "second reply").await.unwrap();

        assert_eq!(repo.list_replies(comment.id).await.unwrap().len(), 2);

        assert!(repo.delete(comment.id).await.unwrap());
        assert!(repo.get_by_id(comment.id).await.unwrap().is_none());
        assert!(repo.list_replies(comment.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_returns_false() {
        let (_pool, repo) = setup().await;
        assert!(!repo.delete(404).await.unwrap());
    }

    #[tokio::test]
    async fn test_replies_listed_oldest_first_with_authors() {
        let (_pool, repo) = setup().await;

        let comment = repo
            .create(CommentParent::Knowhow(20), 1, "question", CommentKind::Comment)
            .await
            .unwrap();
        repo.create_reply(comment.id, 2, "answer one").await.unwrap();
        repo.create_reply(comment.id, 1, "answer two").await.unwrap();

        let replies = repo.list_replies(comment.id).await.unwrap();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].content, "answer one");
        assert_eq!(replies[0].author_name, "suzuki");
    }
}
