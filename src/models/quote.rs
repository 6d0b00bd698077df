use serde::{Deserialize, Serialize};

/// A quote pulled out of a generated block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteCandidate {
    /// Position in overall extraction order
    pub index: usize,
    /// Index of the generated block it came from
    pub block: usize,
    /// The quote text, sentinels excluded
    pub text: String,
}

impl QuoteCandidate {
    pub fn new(index: usize, block: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            block,
            text: text.into(),
        }
    }
}

/// Best reference match for one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub candidate: QuoteCandidate,
    /// Closest reference quote
    pub best_match: String,
    /// Similarity in [0, 100]
    pub score: u8,
}

/// Outcome of comparing a score against the novelty threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Novelty {
    Novel,
    Duplicate,
}

impl Novelty {
    /// `score >= threshold` is a duplicate, anything below is novel
    pub fn from_score(score: u8, threshold: u8) -> Self {
        if score >= threshold {
            Novelty::Duplicate
        } else {
            Novelty::Novel
        }
    }

    pub fn is_novel(self) -> bool {
        self == Novelty::Novel
    }
}

impl MatchResult {
    pub fn novelty(&self, threshold: u8) -> Novelty {
        Novelty::from_score(self.score, threshold)
    }
}
