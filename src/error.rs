//! Application error taxonomy
//!
//! Every operation surfaces failures through `AppError`. Validation happens
//! before any store access; store failures are logged at the boundary and
//! translated to a generic 500 unless the server runs in development, in
//! which case the underlying detail is included in the response message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::OnceCell;
use serde_json::json;
use thiserror::Error;

/// Whether store error detail is exposed in responses.
/// Set once at startup from the configured environment.
static EXPOSE_STORE_DETAIL: OnceCell<bool> = OnceCell::new();

/// Configure store error detail exposure. Later calls are ignored.
pub fn set_expose_store_detail(expose: bool) {
    let _ = EXPOSE_STORE_DETAIL.set(expose);
}

fn expose_store_detail() -> bool {
    *EXPOSE_STORE_DETAIL.get().unwrap_or(&false)
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or out-of-range input (400)
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credential (401)
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but not authorized (403)
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity absent (404)
    #[error("{0}")]
    NotFound(String),

    /// Persistence failure (500)
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        Self::Store(e.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                if expose_store_detail() {
                    format!("Internal error: {}", e)
                } else {
                    "Internal server error".to_string()
                }
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::validation("bad score").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::unauthenticated("no token").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::forbidden("not the author").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::not_found("no such comment").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Store(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display_passes_message_through() {
        let err = AppError::forbidden("Only the author may delete a comment");
        assert_eq!(err.to_string(), "Only the author may delete a comment");
    }
}
