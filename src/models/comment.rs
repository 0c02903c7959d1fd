//! Comment and reply models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment kind
///
/// A proposal is a comment suggesting a content correction; it is
/// structurally identical to a plain comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentKind {
    Comment,
    Proposal,
}

impl std::fmt::Display for CommentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Comment => write!(f, "comment"),
            Self::Proposal => write!(f, "proposal"),
        }
    }
}

impl std::str::FromStr for CommentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "comment" => Ok(Self::Comment),
            "proposal" => Ok(Self::Proposal),
            _ => Err(format!("Invalid comment kind: {}", s)),
        }
    }
}

/// The entity a comment thread hangs off: a slide XOR a know-how article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentParent {
    Slide(i64),
    Knowhow(i64),
}

impl CommentParent {
    pub fn slide_id(&self) -> Option<i64> {
        match self {
            Self::Slide(id) => Some(*id),
            Self::Knowhow(_) => None,
        }
    }

    pub fn article_id(&self) -> Option<i64> {
        match self {
            Self::Slide(_) => None,
            Self::Knowhow(id) => Some(*id),
        }
    }
}

/// Sort order for comment listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentSort {
    #[default]
    Newest,
    Oldest,
}

/// Comment entity
///
/// Immutable once created except for deletion. Exactly one of `slide_id`
/// and `article_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub slide_id: Option<i64>,
    pub article_id: Option<i64>,
    pub user_id: i64,
    pub content: String,
    pub kind: CommentKind,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// The thread parent; the store's CHECK constraint guarantees exactly
    /// one side is set
    pub fn parent(&self) -> CommentParent {
        match (self.slide_id, self.article_id) {
            (Some(id), _) => CommentParent::Slide(id),
            (_, Some(id)) => CommentParent::Knowhow(id),
            (None, None) => unreachable!("comment without a parent"),
        }
    }
}

/// Comment joined with author info for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithAuthor {
    pub id: i64,
    pub slide_id: Option<i64>,
    pub article_id: Option<i64>,
    pub user_id: i64,
    pub author_name: String,
    pub avatar_url: String,
    pub content: String,
    pub kind: CommentKind,
    pub created_at: DateTime<Utc>,
    pub reply_count: i64,
}

impl CommentWithAuthor {
    /// Generate Gravatar URL from email
    pub fn gravatar_url(email: &Option<String>) -> String {
        match email {
            Some(e) if !e.is_empty() => {
                let hash = format!("{:x}", md5::compute(e.trim().to_lowercase()));
                format!("https://www.gravatar.com/avatar/{}?d=mp&s=80", hash)
            }
            _ => "https://www.gravatar.com/avatar/?d=mp&s=80".to_string(),
        }
    }
}

/// Reply entity
///
/// One level deep only: a reply always points at a comment, never at
/// another reply. Replies are removed with their parent comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub id: i64,
    pub comment_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Reply joined with author info for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyWithAuthor {
    pub id: i64,
    pub comment_id: i64,
    pub user_id: i64,
    pub author_name: String,
    pub avatar_url: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
