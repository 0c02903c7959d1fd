//! Activity feed models
//!
//! `ActivityRecord` is derived, never persisted: the feed composer builds
//! records on demand from the slide, comment, and article tables.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One entry in the merged activity feed, tagged with its source kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityRecord {
    Upload {
        slide_id: i64,
        title: String,
        timestamp: DateTime<Utc>,
    },
    SlideComment {
        slide_id: i64,
        title: String,
        excerpt: Option<String>,
        timestamp: DateTime<Utc>,
    },
    KnowhowComment {
        article_id: i64,
        title: String,
        excerpt: Option<String>,
        timestamp: DateTime<Utc>,
    },
    KnowhowPost {
        article_id: i64,
        title: String,
        excerpt: Option<String>,
        timestamp: DateTime<Utc>,
    },
}

impl ActivityRecord {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Upload { timestamp, .. }
            | Self::SlideComment { timestamp, .. }
            | Self::KnowhowComment { timestamp, .. }
            | Self::KnowhowPost { timestamp, .. } => *timestamp,
        }
    }
}

/// Feed scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityScope {
    /// Everything on the platform
    Global,
    /// One user's own activity
    User(i64),
    /// Activity on one slide
    Slide(i64),
}

/// Viewer filter for the global feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityFilter {
    #[default]
    All,
    /// Top-level comments only (both comment sources)
    Comment,
    /// Replies only (both comment sources)
    Reply,
    /// Records authored by the viewer, any kind
    Mine,
}

impl std::str::FromStr for ActivityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "comment" => Ok(Self::Comment),
            "reply" => Ok(Self::Reply),
            "mine" => Ok(Self::Mine),
            _ => Err(format!("Invalid activity filter: {}", s)),
        }
    }
}

/// Shorten comment content for feed display, respecting char boundaries
pub fn excerpt(content: &str) -> Option<String> {
    const MAX_CHARS: usize = 120;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().count() <= MAX_CHARS {
        return Some(trimmed.to_string());
    }
    let cut: String = trimmed.chars().take(MAX_CHARS).collect();
    Some(format!("{}…", cut))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parsing() {
        assert_eq!("mine".parse::<ActivityFilter>().unwrap(), ActivityFilter::Mine);
        assert_eq!("All".parse::<ActivityFilter>().unwrap(), ActivityFilter::All);
        assert!("recent".parse::<ActivityFilter>().is_err());
    }

    #[test]
    fn test_excerpt_short_content_unchanged() {
        assert_eq!(excerpt("  short  "), Some("short".to_string()));
        assert_eq!(excerpt("   "), None);
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        // Multibyte content must not be split mid-character
        let long = "い".repeat(200);
        let cut = excerpt(&long).unwrap();
        assert_eq!(cut.chars().count(), 121); // 120 chars + ellipsis
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn test_record_serializes_with_type_tag() {
        let record = ActivityRecord::Upload {
            slide_id: 4,
            title: "Particles".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "upload");
        assert_eq!(json["slide_id"], 4);
    }
}
