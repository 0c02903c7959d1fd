//! User and session service

use std::sync::Arc;

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::error::AppError;
use crate::models::User;

/// Resolves session tokens to users for the auth middleware
pub struct UserService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { users, sessions }
    }

    /// Resolve a session token to its user. Unknown, expired, or orphaned
    /// tokens resolve to None rather than an error; the middleware decides
    /// whether that is fatal for the route.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, AppError> {
        let Some(session) = self.sessions.get_by_id(token).await? else {
            return Ok(None);
        };
        if session.is_expired() {
            return Ok(None);
        }
        Ok(self.users.get_by_id(session.user_id).await?)
    }

    /// Periodic expiry sweep; called opportunistically at startup
    pub async fn purge_expired_sessions(&self) -> Result<i64, AppError> {
        Ok(self.sessions.delete_expired().await?)
    }
}
