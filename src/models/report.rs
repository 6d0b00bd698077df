use std::fmt;

use serde::Serialize;

use super::{MatchResult, QuoteCandidate};

/// One output row of the novelty report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReportRow {
    /// Classification was skipped
    Bare { quote: String },
    /// Classified against the reference corpus
    Scored {
        quote: String,
        best_match: String,
        match_score: u8,
    },
}

impl ReportRow {
    pub fn quote(&self) -> &str {
        match self {
            ReportRow::Bare { quote } | ReportRow::Scored { quote, .. } => quote,
        }
    }

    pub fn score(&self) -> Option<u8> {
        match self {
            ReportRow::Bare { .. } => None,
            ReportRow::Scored { match_score, .. } => Some(*match_score),
        }
    }
}

impl From<MatchResult> for ReportRow {
    fn from(result: MatchResult) -> Self {
        ReportRow::Scored {
            quote: result.candidate.text,
            best_match: result.best_match,
            match_score: result.score,
        }
    }
}

impl From<QuoteCandidate> for ReportRow {
    fn from(candidate: QuoteCandidate) -> Self {
        ReportRow::Bare {
            quote: candidate.text,
        }
    }
}

/// Summary counters for a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoveltySummary {
    pub total_candidates: usize,
    pub novel_count: usize,
    /// `None` when there were no candidates
    pub novel_fraction: Option<f64>,
}

impl NoveltySummary {
    pub fn new(total_candidates: usize, novel_count: usize) -> Self {
        let novel_fraction = if total_candidates > 0 {
            Some(novel_count as f64 / total_candidates as f64)
        } else {
            None
        };
        Self {
            total_candidates,
            novel_count,
            novel_fraction,
        }
    }

    pub fn duplicate_count(&self) -> usize {
        self.total_candidates - self.novel_count
    }

    pub fn is_applicable(&self) -> bool {
        self.novel_fraction.is_some()
    }
}

impl fmt::Display for NoveltySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.novel_fraction {
            Some(fraction) => write!(
                f,
                "Novel quotes generated: {} of {} ({:.2}%)",
                self.novel_count,
                self.total_candidates,
                fraction * 100.0
            ),
            None => write!(
                f,
                "Novel quotes generated: {} of {} (not applicable)",
                self.novel_count, self.total_candidates
            ),
        }
    }
}

/// Ordered report rows plus the derived summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoveltyReport {
    /// Whether rows were scored or written bare
    pub scored: bool,
    pub rows: Vec<ReportRow>,
    pub summary: NoveltySummary,
}

impl NoveltyReport {
    /// Column headers for the persisted report
    pub fn headers(&self) -> &'static [&'static str] {
        if self.scored {
            &["quote", "best_match", "match_score"]
        } else {
            &["quote"]
        }
    }
}
