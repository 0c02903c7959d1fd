//! Know-how article model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Know-how article entity
///
/// Authored through the publishing surface (external to this subsystem).
/// Private articles are invisible to everyone but their owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Whether `viewer` may read this article (and thus comment or react)
    pub fn visible_to(&self, viewer: Option<i64>) -> bool {
        self.is_public || viewer == Some(self.user_id)
    }
}
