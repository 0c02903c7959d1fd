//! Database repositories
//!
//! Repository pattern implementations for database access. Each repository
//! exposes a trait and a `Sqlx*Repository` implementation that dispatches
//! per driver.

pub mod activity;
pub mod article;
pub mod comment;
pub mod rating;
pub mod reaction;
pub mod session;
pub mod slide;
pub mod user;

pub use activity::{ActivityRepository, CommentInclusion, SqlxActivityRepository};
pub use article::{ArticleRepository, SqlxArticleRepository};
pub use comment::{CommentRepository, SqlxCommentRepository};
pub use rating::{RatingRepository, SqlxRatingRepository};
pub use reaction::{ReactionRepository, SqlxReactionRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use slide::{SlideRepository, SqlxSlideRepository};
pub use user::{SqlxUserRepository, UserRepository};

#[cfg(test)]
pub(crate) mod test_support {
    //! Seed helpers for repository tests (SQLite test pools only).
    //!
    //! Slides, articles, users, and sessions are created by external
    //! collaborators in production, so tests insert them directly.

    use chrono::{DateTime, Utc};

    use crate::db::{create_test_pool, migrations, DynDatabasePool};

    pub async fn migrated_pool() -> DynDatabasePool {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        pool
    }

    pub async fn seed_user(pool: &DynDatabasePool, id: i64, username: &str) {
        sqlx::query("INSERT INTO users (id, username, email) VALUES (?, ?, ?)")
            .bind(id)
            .bind(username)
            .bind(format!("{}@example.com", username))
            .execute(pool.as_sqlite().unwrap())
            .await
            .expect("Failed to seed user");
    }

    pub async fn seed_slide_at(
        pool: &DynDatabasePool,
        id: i64,
        user_id: i64,
        title: &str,
        created_at: DateTime<Utc>,
    ) {
        sqlx::query(
            "INSERT INTO slides (id, user_id, title, level, page_count, created_at) \
             VALUES (?, ?, ?, 'n3', 10, ?)",
        )
        .bind(id)
        .bind(user_id)
        .bind(title)
        .bind(created_at)
        .execute(pool.as_sqlite().unwrap())
        .await
        .expect("Failed to seed slide");
    }

    pub async fn seed_slide(pool: &DynDatabasePool, id: i64, user_id: i64, title: &str) {
        seed_slide_at(pool, id, user_id, title, Utc::now()).await;
    }

    pub async fn seed_page(pool: &DynDatabasePool, id: i64, slide_id: i64, page_index: i64) {
        sqlx::query("INSERT INTO slide_pages (id, slide_id, page_index) VALUES (?, ?, ?)")
            .bind(id)
            .bind(slide_id)
            .bind(page_index)
            .execute(pool.as_sqlite().unwrap())
            .await
            .expect("Failed to seed slide page");
    }

    pub async fn seed_article_at(
        pool: &DynDatabasePool,
        id: i64,
        user_id: i64,
        title: &str,
        is_public: bool,
        created_at: DateTime<Utc>,
    ) {
        sqlx::query(
            "INSERT INTO articles (id, user_id, title, content, is_public, created_at, updated_at) \
             VALUES (?, ?, ?, 'body', ?, ?, ?)",
        )
        .bind(id)
        .bind(user_id)
        .bind(title)
        .bind(is_public)
        .bind(created_at)
        .bind(created_at)
        .execute(pool.as_sqlite().unwrap())
        .await
        .expect("Failed to seed article");
    }

    pub async fn seed_article(pool: &DynDatabasePool, id: i64, user_id: i64, title: &str) {
        seed_article_at(pool, id, user_id, title, true, Utc::now()).await;
    }
}
