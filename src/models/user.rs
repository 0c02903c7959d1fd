//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity
///
/// Accounts are created and credentialed by the identity provider; this
/// subsystem only reads them for display and ownership checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name shown next to comments and ratings
    pub fn public_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_name_prefers_display_name() {
        let user = User {
            id: 1,
            username: "tanaka".to_string(),
            display_name: Some("Tanaka-sensei".to_string()),
            email: None,
            created_at: Utc::now(),
        };
        assert_eq!(user.public_name(), "Tanaka-sensei");
    }

    #[test]
    fn test_public_name_falls_back_to_username() {
        let user = User {
            id: 1,
            username: "tanaka".to_string(),
            display_name: None,
            email: None,
            created_at: Utc::now(),
        };
        assert_eq!(user.public_name(), "tanaka");
    }
}
