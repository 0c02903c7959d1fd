//! Session model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session entity
///
/// Tokens are issued by the identity provider; this subsystem validates
/// them on authenticated routes and purges expired rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session token
    pub id: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}
