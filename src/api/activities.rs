//! Activity feed endpoint

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

use crate::api::comments::{default_limit, default_page};
use crate::api::middleware::{AppState, AuthenticatedUser};
use crate::api::responses::{ApiResponse, Pagination};
use crate::error::AppError;
use crate::models::{ActivityFilter, ActivityScope};

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Narrow the feed to one user's activity
    pub user_id: Option<i64>,
    /// Narrow the feed to one slide's thread
    pub slide_id: Option<i64>,
    pub filter: Option<String>,
}

/// GET /activities
pub async fn get_activities(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    Query(query): Query<ActivityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = match (query.slide_id, query.user_id) {
        (Some(slide_id), _) => ActivityScope::Slide(slide_id),
        (None, Some(user_id)) => ActivityScope::User(user_id),
        (None, None) => ActivityScope::Global,
    };
    let filter = match &query.filter {
        Some(raw) => raw
            .parse::<ActivityFilter>()
            .map_err(AppError::validation)?,
        None => ActivityFilter::All,
    };
    let viewer = user.as_ref().map(|u| u.user_id());

    let (records, total) = state
        .activity_service
        .compose_feed(scope, filter, viewer, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::ok_paginated(
        records,
        Pagination::new(query.page, query.limit, total),
    )))
}
