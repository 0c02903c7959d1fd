//! Slide comment endpoints

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

use crate::api::middleware::{AppState, AuthenticatedUser};
use crate::api::responses::{ApiResponse, Pagination};
use crate::db::repositories::comment::CommentSearch;
use crate::error::AppError;
use crate::models::{CommentKind, CommentParent, CommentSort};
use crate::services::DEFAULT_PAGE_SIZE;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub sort: CommentSort,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub keyword: Option<String>,
    pub min_rating: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(default = "default_kind")]
    pub kind: CommentKind,
}

pub(crate) fn default_page() -> i64 {
    1
}

pub(crate) fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn default_kind() -> CommentKind {
    CommentKind::Comment
}

fn viewer(user: &Option<Extension<AuthenticatedUser>>) -> Option<i64> {
    user.as_ref().map(|u| u.user_id())
}

/// GET /slides/{slide_id}/comments
pub async fn list_slide_comments(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    Path(slide_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (comments, total) = state
        .comment_service
        .list(
            CommentParent::Slide(slide_id),
            viewer(&user),
            query.sort,
            query.page,
            query.limit,
        )
        .await?;
    Ok(Json(ApiResponse::ok_paginated(
        comments,
        Pagination::new(query.page, query.limit, total),
    )))
}

/// GET /slides/{slide_id}/comments/search
pub async fn search_slide_comments(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    Path(slide_id): Path<i64>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = CommentSearch {
        keyword: query.keyword.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()),
        min_rating: query.min_rating,
    };
    let (comments, total) = state
        .comment_service
        .search(
            CommentParent::Slide(slide_id),
            viewer(&user),
            filters,
            query.page,
            query.limit,
        )
        .await?;
    Ok(Json(ApiResponse::ok_paginated(
        comments,
        Pagination::new(query.page, query.limit, total),
    )))
}

/// POST /slides/{slide_id}/comments
pub async fn create_slide_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slide_id): Path<i64>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comment = state
        .comment_service
        .create(CommentParent::Slide(slide_id), user.user_id(), &body.content, body.kind)
        .await?;
    Ok(Json(ApiResponse::ok(comment)))
}

/// DELETE /comments/{comment_id}
///
/// Owner-only; works for both slide and know-how threads.
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(comment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.comment_service.delete(comment_id, user.user_id()).await?;
    Ok(Json(ApiResponse::<()>::message("Comment deleted")))
}
