//! Rating endpoints
//!
//! POST endpoints answer with the recomputed aggregate so clients can
//! update their display without a second fetch.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::api::comments::{default_limit, default_page};
use crate::api::middleware::{AppState, AuthenticatedUser};
use crate::api::responses::{ApiResponse, Pagination};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub score: i64,
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RatingListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// POST /slides/{slide_id}/rate
pub async fn rate_slide(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slide_id): Path<i64>,
    Json(body): Json<RateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let summary = state
        .rating_service
        .rate_slide(user.user_id(), slide_id, body.score, body.feedback.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// POST /slides/{slide_id}/pages/{page_index}/rate
pub async fn rate_page(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((slide_id, page_index)): Path<(i64, i64)>,
    Json(body): Json<RateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let summary = state
        .rating_service
        .rate_page(user.user_id(), slide_id, page_index, body.score, body.feedback.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// GET /slides/{slide_id}/ratings
pub async fn list_slide_ratings(
    State(state): State<AppState>,
    Path(slide_id): Path<i64>,
    Query(query): Query<RatingListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (ratings, total) = state
        .rating_service
        .slide_ratings(slide_id, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::ok_paginated(
        ratings,
        Pagination::new(query.page, query.limit, total),
    )))
}

/// GET /slides/{slide_id}/pages/{page_index}/ratings
pub async fn list_page_ratings(
    State(state): State<AppState>,
    Path((slide_id, page_index)): Path<(i64, i64)>,
    Query(query): Query<RatingListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (ratings, total) = state
        .rating_service
        .page_ratings(slide_id, page_index, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::ok_paginated(
        ratings,
        Pagination::new(query.page, query.limit, total),
    )))
}
