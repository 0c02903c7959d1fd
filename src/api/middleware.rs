//! API middleware
//!
//! Session token extraction and the authentication layers. Tokens arrive
//! as `Authorization: Bearer <token>` or a `session` cookie; the header
//! wins when both are present.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::User;
use crate::services::{ActivityService, CommentService, RatingService, ReactionService, UserService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub comment_service: Arc<CommentService>,
    pub rating_service: Arc<RatingService>,
    pub activity_service: Arc<ActivityService>,
    pub reaction_service: Arc<ReactionService>,
}

/// Authenticated user extracted from the request
///
/// Inserted by [`optional_auth`] when the session token checks out.
/// Handlers that require a signed-in caller take this as an extractor and
/// get a 401 when it is absent; handlers that merely adapt to one take
/// `Option<Extension<AuthenticatedUser>>`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn user_id(&self) -> i64 {
        self.0.id
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthenticated("Authentication required"))
    }
}

/// Extract the session token from a request
fn extract_session_token(request: &Request) -> Option<String> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("session=") {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

/// Session middleware: resolves the token and stashes the user in request
/// extensions. A missing or bad token reads as anonymous; routes that
/// require a user reject through the [`AuthenticatedUser`] extractor.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_session_token(&request) {
        if let Ok(Some(user)) = state.user_service.validate_session(&token).await {
            request.extensions_mut().insert(AuthenticatedUser(user));
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    #[test]
    fn test_extract_session_token_from_bearer() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer token-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_session_token(&request), Some("token-123".to_string()));
    }

    #[test]
    fn test_extract_session_token_from_cookie() {
        let request = Request::builder()
            .uri("/test")
            .header(header::COOKIE, "theme=dark; session=token-456")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_session_token(&request), Some("token-456".to_string()));
    }

    #[test]
    fn test_bearer_takes_priority_over_cookie() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer bearer-token")
            .header(header::COOKIE, "session=cookie-token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_session_token(&request), Some("bearer-token".to_string()));
    }

    #[test]
    fn test_no_token() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        assert!(extract_session_token(&request).is_none());

        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        assert!(extract_session_token(&request).is_none());
    }
}
