//! API layer - HTTP handlers and routing
//!
//! Endpoints:
//! - Slide comment threads (list, search, create, delete)
//! - Slide and page ratings
//! - Know-how article comment threads, replies, and reactions
//! - The merged activity feed

pub mod activities;
pub mod comments;
pub mod knowhow;
pub mod middleware;
pub mod ratings;
pub mod responses;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;

pub use middleware::{AppState, AuthenticatedUser};
pub use responses::{ApiResponse, Pagination};

fn build_api_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/slides/{slide_id}/comments",
            get(comments::list_slide_comments).post(comments::create_slide_comment),
        )
        .route(
            "/slides/{slide_id}/comments/search",
            get(comments::search_slide_comments),
        )
        .route("/comments/{comment_id}", delete(comments::delete_comment))
        .route("/slides/{slide_id}/rate", post(ratings::rate_slide))
        .route("/slides/{slide_id}/ratings", get(ratings::list_slide_ratings))
        .route(
            "/slides/{slide_id}/pages/{page_index}/rate",
            post(ratings::rate_page),
        )
        .route(
            "/slides/{slide_id}/pages/{page_index}/ratings",
            get(ratings::list_page_ratings),
        )
        .route("/activities", get(activities::get_activities))
        .route(
            "/knowhow/{article_id}/comments",
            get(knowhow::list_article_comments).post(knowhow::create_article_comment),
        )
        .route(
            "/knowhow/{article_id}/comments/{comment_id}/replies",
            get(knowhow::list_replies).post(knowhow::create_reply),
        )
        .route(
            "/knowhow/{article_id}/reactions",
            get(knowhow::get_reactions).post(knowhow::set_reaction),
        )
        // Session resolution runs for every route; handlers decide whether
        // an anonymous caller is acceptable
        .layer(axum_middleware::from_fn_with_state(state, middleware::optional_auth))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{
        migrated_pool, seed_article, seed_page, seed_slide, seed_user,
    };
    use crate::db::repositories::{
        SqlxActivityRepository, SqlxArticleRepository, SqlxCommentRepository, SqlxRatingRepository,
        SqlxReactionRepository, SqlxSessionRepository, SqlxSlideRepository, SqlxUserRepository,
    };
    use crate::models::Session;
    use crate::services::{
        ActivityService, CommentService, RatingService, ReactionService, UserService,
    };
    use axum_test::TestServer;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::sync::Arc;

    const TOKEN: &str = "test-session-token";

    async fn test_server() -> TestServer {
        let pool = migrated_pool().await;
        seed_user(&pool, 1, "matsumoto").await;
        seed_user(&pool, 2, "inoue").await;
        seed_slide(&pool, 10, 1, "Kanji stroke order").await;
        seed_page(&pool, 100, 10, 0).await;
        seed_article(&pool, 20, 2, "Classroom pacing").await;

        let sessions = SqlxSessionRepository::boxed(pool.clone());
        let now = Utc::now();
        sessions
            .create(&Session {
                id: TOKEN.to_string(),
                user_id: 1,
                expires_at: now + Duration::hours(24),
                created_at: now,
            })
            .await
            .unwrap();

        let slides = SqlxSlideRepository::boxed(pool.clone());
        let articles = SqlxArticleRepository::boxed(pool.clone());
        let state = AppState {
            user_service: Arc::new(UserService::new(
                SqlxUserRepository::boxed(pool.clone()),
                sessions,
            )),
            comment_service: Arc::new(CommentService::new(
                SqlxCommentRepository::boxed(pool.clone()),
                slides.clone(),
                articles.clone(),
            )),
            rating_service: Arc::new(RatingService::new(
                SqlxRatingRepository::boxed(pool.clone()),
                slides.clone(),
            )),
            activity_service: Arc::new(ActivityService::new(
                SqlxActivityRepository::boxed(pool.clone()),
                slides,
            )),
            reaction_service: Arc::new(ReactionService::new(
                SqlxReactionRepository::boxed(pool),
                articles,
            )),
        };

        TestServer::new(build_router(state, "http://localhost:3000")).unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_write_is_unauthorized() {
        let server = test_server().await;
        let response = server
            .post("/api/v1/slides/10/comments")
            .json(&json!({"content": "hello"}))
            .await;
        response.assert_status_unauthorized();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_comment_create_then_list_envelope() {
        let server = test_server().await;

        let response = server
            .post("/api/v1/slides/10/comments")
            .authorization_bearer(TOKEN)
            .json(&json!({"content": "Useful for my N3 class", "kind": "comment"}))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["slide_id"], 10);

        let response = server.get("/api/v1/slides/10/comments").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["author_name"], "matsumoto");
        assert_eq!(body["pagination"]["total_items"], 1);
        assert_eq!(body["pagination"]["total_pages"], 1);
    }

    #[tokio::test]
    async fn test_over_cap_limit_echoes_served_window() {
        let server = test_server().await;
        server
            .post("/api/v1/slides/10/comments")
            .authorization_bearer(TOKEN)
            .json(&json!({"content": "only one"}))
            .await
            .assert_status_ok();

        let response = server.get("/api/v1/slides/10/comments?limit=500").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["pagination"]["limit"], 100);
        assert_eq!(body["pagination"]["total_pages"], 1);
    }

    #[tokio::test]
    async fn test_mine_filter_scopes_feed_to_caller() {
        let server = test_server().await;
        // slide 10 belongs to matsumoto, article 20 to inoue
        let response = server
            .get("/api/v1/activities?filter=mine")
            .authorization_bearer(TOKEN)
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let records = body["data"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["type"], "upload");

        server
            .get("/api/v1/activities?filter=mine")
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_rate_slide_returns_aggregate() {
        let server = test_server().await;
        let response = server
            .post("/api/v1/slides/10/rate")
            .authorization_bearer(TOKEN)
            .json(&json!({"score": 85, "feedback": "Good for intermediate"}))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["average"], 85.0);
        assert_eq!(body["data"]["count"], 1);

        let response = server
            .post("/api/v1/slides/10/rate")
            .authorization_bearer(TOKEN)
            .json(&json!({"score": 500}))
            .await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_page_rating_by_index() {
        let server = test_server().await;
        let response = server
            .post("/api/v1/slides/10/pages/0/rate")
            .authorization_bearer(TOKEN)
            .json(&json!({"score": 4}))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["average"], 4.0);

        let response = server
            .post("/api/v1/slides/10/pages/99/rate")
            .authorization_bearer(TOKEN)
            .json(&json!({"score": 4}))
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_reaction_round_trip() {
        let server = test_server().await;
        let response = server
            .post("/api/v1/knowhow/20/reactions")
            .authorization_bearer(TOKEN)
            .json(&json!({"kind": "like"}))
            .await;
        response.assert_status_ok();

        let response = server
            .post("/api/v1/knowhow/20/reactions")
            .authorization_bearer(TOKEN)
            .json(&json!({"kind": "love"}))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["love"], 1);
        assert_eq!(body["data"]["like"], 0);
        assert_eq!(body["data"]["own"], "love");

        // Anonymous tally works, own reads none
        let response = server.get("/api/v1/knowhow/20/reactions").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["love"], 1);
        assert_eq!(body["data"]["own"], "none");

        let response = server
            .post("/api/v1/knowhow/20/reactions")
            .authorization_bearer(TOKEN)
            .json(&json!({"kind": "dislike"}))
            .await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_activity_feed_merges_kinds() {
        let server = test_server().await;
        server
            .post("/api/v1/slides/10/comments")
            .authorization_bearer(TOKEN)
            .json(&json!({"content": "feed fodder"}))
            .await
            .assert_status_ok();

        let response = server.get("/api/v1/activities").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let records = body["data"].as_array().unwrap();
        // one upload, one slide comment, one know-how post
        assert_eq!(records.len(), 3);
        assert!(records.iter().any(|r| r["type"] == "upload"));
        assert!(records.iter().any(|r| r["type"] == "slide_comment"));
        assert!(records.iter().any(|r| r["type"] == "knowhow_post"));

        let response = server.get("/api/v1/activities?filter=bogus").await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_owner_gated_delete() {
        let server = test_server().await;
        // anonymous delete is rejected; the owner then deletes for real
        let response = server
            .post("/api/v1/slides/10/comments")
            .authorization_bearer(TOKEN)
            .json(&json!({"content": "temporary"}))
            .await;
        let id = response.json::<serde_json::Value>()["data"]["id"].as_i64().unwrap();

        server
            .delete(&format!("/api/v1/comments/{}", id))
            .await
            .assert_status_unauthorized();

        server
            .delete(&format!("/api/v1/comments/{}", id))
            .authorization_bearer(TOKEN)
            .await
            .assert_status_ok();

        server
            .delete(&format!("/api/v1/comments/{}", id))
            .authorization_bearer(TOKEN)
            .await
            .assert_status_not_found();
    }
}
