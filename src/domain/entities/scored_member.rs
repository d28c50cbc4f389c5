//! Sorted-set member paired with its score.

use serde::Serialize;
use std::cmp::Ordering;

/// A `(member, score)` tuple of a sorted set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMember {
    pub member: String,
    pub score: f64,
}

impl ScoredMember {
    pub fn new(member: impl Into<String>, score: f64) -> Self {
        Self {
            member: member.into(),
            score,
        }
    }

    /// Store ordering: by score, ties broken lexicographically by member.
    pub fn cmp_by_score(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.member.cmp(&other.member))
    }
}

impl<M: Into<String>> From<(M, f64)> for ScoredMember {
    fn from((member, score): (M, f64)) -> Self {
        Self::new(member, score)
    }
}
