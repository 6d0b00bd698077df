use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::io::write_report_file;
use crate::models::{MatchResult, Novelty, NoveltyReport, NoveltySummary, QuoteCandidate, ReportRow};

/// Configuration for Stage 4
#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    /// Where the report is written
    pub output: PathBuf,
    /// Replace an existing report
    pub overwrite: bool,
}

/// Streaming aggregation of classified quotes
///
/// `threshold` is `None` in bypass mode, where every quote counts as generated.
#[derive(Debug)]
pub struct NoveltyAggregator {
    threshold: Option<u8>,
    rows: Vec<ReportRow>,
    total_candidates: usize,
    novel_count: usize,
}

impl NoveltyAggregator {
    /// Aggregator for scored results
    pub fn scored(threshold: u8) -> Self {
        Self::with_threshold(Some(threshold))
    }

    /// Aggregator for bypass mode
    pub fn bare() -> Self {
        Self::with_threshold(None)
    }

    fn with_threshold(threshold: Option<u8>) -> Self {
        Self {
            threshold,
            rows: Vec::new(),
            total_candidates: 0,
            novel_count: 0,
        }
    }

    pub fn push_scored(&mut self, result: MatchResult) {
        self.total_candidates += 1;
        let threshold = self.threshold.unwrap_or_default();
        if result.novelty(threshold) == Novelty::Novel {
            info!("{}", result.candidate.text);
            self.novel_count += 1;
        }
        self.rows.push(result.into());
    }

    pub fn push_bare(&mut self, candidate: QuoteCandidate) {
        self.total_candidates += 1;
        self.novel_count += 1;
        self.rows.push(candidate.into());
    }

    pub fn summary(&self) -> NoveltySummary {
        NoveltySummary::new(self.total_candidates, self.novel_count)
    }

    pub fn finish(self) -> NoveltyReport {
        let summary = self.summary();
        NoveltyReport {
            scored: self.threshold.is_some(),
            rows: self.rows,
            summary,
        }
    }
}

/// Execute Stage 4: persist the report and announce the summary
pub fn execute_report(report: &NoveltyReport, path: &Path) -> Result<()> {
    info!("Writing {} report rows to {:?}", report.rows.len(), path);
    write_report_file(path, report)?;
    info!("{}", report.summary);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(text: &str, score: u8) -> MatchResult {
        MatchResult {
            candidate: QuoteCandidate::new(0, 0, text),
            best_match: "ref".to_string(),
            score,
        }
    }

    #[test]
    fn test_boundary_score_moves_between_buckets() {
        let mut below = NoveltyAggregator::scored(90);
        below.push_scored(scored("a", 89));
        assert_eq!(below.summary().novel_count, 1);

        let mut at = NoveltyAggregator::scored(90);
        at.push_scored(scored("a", 90));
        assert_eq!(at.summary().novel_count, 0);
        assert_eq!(at.summary().total_candidates, 1);
    }

    #[test]
    fn test_counts_add_up() {
        let mut agg = NoveltyAggregator::scored(75);
        for score in [0, 50, 74, 75, 99, 100] {
            agg.push_scored(scored("q", score));
        }
        let summary = agg.summary();
        assert_eq!(summary.total_candidates, 6);
        assert_eq!(summary.novel_count, 3);
        assert_eq!(summary.novel_count + summary.duplicate_count(), summary.total_candidates);
    }

    #[test]
    fn test_bare_rows_always_count_as_generated() {
        let mut agg = NoveltyAggregator::bare();
        agg.push_bare(QuoteCandidate::new(0, 0, "one"));
        agg.push_bare(QuoteCandidate::new(1, 0, "two"));

        let report = agg.finish();
        assert!(!report.scored);
        assert_eq!(report.headers(), &["quote"]);
        assert_eq!(report.summary.novel_fraction, Some(1.0));
        assert_eq!(report.rows[1].quote(), "two");
    }

    #[test]
    fn test_empty_report_is_not_applicable() {
        let report = NoveltyAggregator::scored(90).finish();
        assert!(report.rows.is_empty());
        assert!(report.summary.novel_fraction.is_none());
    }

    #[test]
    fn test_execute_report_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run1_quotes.csv");
        let mut agg = NoveltyAggregator::scored(90);
        agg.push_scored(scored("Seize the day.", 40));

        execute_report(&agg.finish(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "quote,best_match,match_score\nSeize the day.,ref,40\n");
    }
}
