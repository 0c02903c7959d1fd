//! Reaction models

use serde::{Deserialize, Serialize};

/// Reaction kind
///
/// Exactly one reaction per (user, article); changing kind overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Love,
    Like,
    Haha,
    Wow,
    Sad,
    Angry,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 6] = [
        Self::Love,
        Self::Like,
        Self::Haha,
        Self::Wow,
        Self::Sad,
        Self::Angry,
    ];
}

impl std::fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Love => "love",
            Self::Like => "like",
            Self::Haha => "haha",
            Self::Wow => "wow",
            Self::Sad => "sad",
            Self::Angry => "angry",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ReactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "love" => Ok(Self::Love),
            "like" => Ok(Self::Like),
            "haha" => Ok(Self::Haha),
            "wow" => Ok(Self::Wow),
            "sad" => Ok(Self::Sad),
            "angry" => Ok(Self::Angry),
            _ => Err(format!("Invalid reaction kind: {}", s)),
        }
    }
}

/// Per-kind reaction counts for an article; absent kinds default to zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCounts {
    pub love: i64,
    pub like: i64,
    pub haha: i64,
    pub wow: i64,
    pub sad: i64,
    pub angry: i64,
}

impl ReactionCounts {
    pub fn set(&mut self, kind: ReactionKind, count: i64) {
        match kind {
            ReactionKind::Love => self.love = count,
            ReactionKind::Like => self.like = count,
            ReactionKind::Haha => self.haha = count,
            ReactionKind::Wow => self.wow = count,
            ReactionKind::Sad => self.sad = count,
            ReactionKind::Angry => self.angry = count,
        }
    }

    pub fn get(&self, kind: ReactionKind) -> i64 {
        match kind {
            ReactionKind::Love => self.love,
            ReactionKind::Like => self.like,
            ReactionKind::Haha => self.haha,
            ReactionKind::Wow => self.wow,
            ReactionKind::Sad => self.sad,
            ReactionKind::Angry => self.angry,
        }
    }

    pub fn total(&self) -> i64 {
        ReactionKind::ALL.iter().map(|k| self.get(*k)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in ReactionKind::ALL {
            assert_eq!(kind.to_string().parse::<ReactionKind>().unwrap(), kind);
        }
        assert!("dislike".parse::<ReactionKind>().is_err());
    }

    #[test]
    fn test_counts_default_to_zero() {
        let counts = ReactionCounts::default();
        for kind in ReactionKind::ALL {
            assert_eq!(counts.get(kind), 0);
        }
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_counts_set_get() {
        let mut counts = ReactionCounts::default();
        counts.set(ReactionKind::Love, 3);
        counts.set(ReactionKind::Angry, 1);
        assert_eq!(counts.get(ReactionKind::Love), 3);
        assert_eq!(counts.get(ReactionKind::Like), 0);
        assert_eq!(counts.total(), 4);
    }
}
