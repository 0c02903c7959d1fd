//! Slide models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Difficulty classification assigned by the uploader.
///
/// Either a coarse level or a JLPT level (N5 easiest, N1 hardest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideLevel {
    Beginner,
    Intermediate,
    Advanced,
    N1,
    N2,
    N3,
    N4,
    N5,
}

impl std::fmt::Display for SlideLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::N1 => "n1",
            Self::N2 => "n2",
            Self::N3 => "n3",
            Self::N4 => "n4",
            Self::N5 => "n5",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for SlideLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            "n1" => Ok(Self::N1),
            "n2" => Ok(Self::N2),
            "n3" => Ok(Self::N3),
            "n4" => Ok(Self::N4),
            "n5" => Ok(Self::N5),
            _ => Err(format!("Invalid slide level: {}", s)),
        }
    }
}

/// Slide entity
///
/// Created on upload (an external collaborator's responsibility). The only
/// columns mutated here are the derived aggregate fields, owned by the
/// rating aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub level: SlideLevel,
    /// Mean difficulty score (0-100), one decimal place, derived
    pub avg_rating: f64,
    pub rating_count: i64,
    pub page_count: i64,
    pub created_at: DateTime<Utc>,
}

/// One page of a slide deck, ratable on its own (0-5 stars)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlidePage {
    pub id: i64,
    pub slide_id: i64,
    /// Zero-based position within the deck
    pub page_index: i64,
    /// Mean star rating (0-5), one decimal place, derived
    pub avg_rating: f64,
    pub rating_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_round_trip() {
        for s in ["beginner", "intermediate", "advanced", "n1", "n3", "n5"] {
            let level: SlideLevel = s.parse().unwrap();
            assert_eq!(level.to_string(), s);
        }
    }

    #[test]
    fn test_level_rejects_unknown() {
        assert!("expert".parse::<SlideLevel>().is_err());
    }
}
