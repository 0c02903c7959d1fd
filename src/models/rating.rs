//! Rating models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The entity a rating applies to.
///
/// A slide is scored for difficulty (0-100); a single page is scored with
/// stars (0-5). Page targets carry the page row id, already resolved from
/// (slide, page index).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingTarget {
    Slide(i64),
    Page(i64),
}

impl RatingTarget {
    pub fn id(&self) -> i64 {
        match self {
            Self::Slide(id) | Self::Page(id) => *id,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Slide(_) => "slide",
            Self::Page(_) => "page",
        }
    }

    /// Inclusive score bounds for this target kind
    pub fn score_range(&self) -> (i64, i64) {
        match self {
            Self::Slide(_) => (0, 100),
            Self::Page(_) => (0, 5),
        }
    }
}

/// Rating row: at most one per (rater, target, kind); resubmission
/// overwrites in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: i64,
    pub target_id: i64,
    pub target_kind: String,
    pub score: i64,
    pub feedback: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Rating joined with rater info for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingWithAuthor {
    pub user_id: i64,
    pub author_name: String,
    pub score: i64,
    pub feedback: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a rating submission: the recomputed aggregate for the target
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AggregateSummary {
    /// Arithmetic mean of all current scores, rounded to one decimal place
    pub average: f64,
    /// Number of contributing ratings
    pub count: i64,
}

impl AggregateSummary {
    /// Round a raw mean to one decimal place
    pub fn round_average(raw: f64) -> f64 {
        (raw * 10.0).round() / 10.0
    }
}
