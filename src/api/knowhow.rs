//! Know-how article endpoints: comment threads, replies, reactions

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::comments::{CreateCommentRequest, ListQuery};
use crate::api::middleware::{AppState, AuthenticatedUser};
use crate::api::responses::{ApiResponse, Pagination};
use crate::error::AppError;
use crate::models::{CommentParent, ReactionCounts, ReactionKind};
use crate::services::reaction::ReactionSummary;

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub kind: String,
}

/// Reaction tally as the API reports it: six counts plus the caller's own
/// kind, "none" when absent
#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    #[serde(flatten)]
    pub counts: ReactionCounts,
    pub own: String,
}

impl From<ReactionSummary> for ReactionResponse {
    fn from(summary: ReactionSummary) -> Self {
        Self {
            counts: summary.counts,
            own: summary
                .own
                .map(|k| k.to_string())
                .unwrap_or_else(|| "none".to_string()),
        }
    }
}

fn viewer(user: &Option<Extension<AuthenticatedUser>>) -> Option<i64> {
    user.as_ref().map(|u| u.user_id())
}

/// GET /knowhow/{article_id}/comments
pub async fn list_article_comments(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    Path(article_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (comments, total) = state
        .comment_service
        .list(
            CommentParent::Knowhow(article_id),
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

/// POST /knowhow/{article_id}/comments
pub async fn create_article_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(article_id): Path<i64>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comment = state
        .comment_service
        .create(CommentParent::Knowhow(article_id), user.user_id(), &body.content, body.kind)
        .await?;
    Ok(Json(ApiResponse::ok(comment)))
}

/// GET /knowhow/{article_id}/comments/{comment_id}/replies
pub async fn list_replies(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    Path((_article_id, comment_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let replies = state
        .comment_service
        .list_replies(comment_id, viewer(&user))
        .await?;
    Ok(Json(ApiResponse::ok(replies)))
}

/// POST /knowhow/{article_id}/comments/{comment_id}/replies
pub async fn create_reply(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((_article_id, comment_id)): Path<(i64, i64)>,
    Json(body): Json<ReplyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let reply = state
        .comment_service
        .create_reply(comment_id, user.user_id(), &body.content)
        .await?;
    Ok(Json(ApiResponse::ok(reply)))
}

/// POST /knowhow/{article_id}/reactions
pub async fn set_reaction(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(article_id): Path<i64>,
    Json(body): Json<ReactionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let kind: ReactionKind = body
        .kind
        .parse()
        .map_err(|e: String| AppError::validation(e))?;
    let summary = state.reaction_service.set(user.user_id(), article_id, kind).await?;
    Ok(Json(ApiResponse::ok(ReactionResponse::from(summary))))
}

/// GET /knowhow/{article_id}/reactions
pub async fn get_reactions(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    Path(article_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let summary = state
        .reaction_service
        .summary(article_id, viewer(&user))
        .await?;
    Ok(Json(ApiResponse::ok(ReactionResponse::from(summary))))
}
