use tracing::{debug, info};

use crate::error::{QuoteError, Result};
use crate::matching::{PreparedCorpus, Scorer, MAX_SCORE};
use crate::models::{MatchResult, QuoteCandidate, ReferenceCorpus};

/// Default score at or above which a quote counts as a copy
pub const DEFAULT_THRESHOLD: u8 = 90;

/// Configuration for Stage 3
#[derive(Debug, Clone, Copy)]
pub struct ClassifierConfig {
    /// Scores at or above this are duplicates
    pub threshold: u8,
    /// Similarity metric
    pub scorer: Scorer,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            scorer: Scorer::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        if self.threshold > MAX_SCORE {
            return Err(QuoteError::InvalidConfig(format!(
                "threshold must be between 0 and {}, got {}",
                MAX_SCORE, self.threshold
            )));
        }
        Ok(())
    }
}

/// Scores candidates against a borrowed reference corpus
///
/// The corpus is preprocessed once, when the classifier is built.
#[derive(Debug)]
pub struct NoveltyClassifier<'a> {
    corpus: PreparedCorpus<'a>,
    config: ClassifierConfig,
}

impl<'a> NoveltyClassifier<'a> {
    /// Fails when the corpus is empty, since no best match exists
    pub fn new(corpus: &'a ReferenceCorpus, config: ClassifierConfig) -> Result<Self> {
        config.validate()?;
        let corpus = PreparedCorpus::new(corpus).ok_or(QuoteError::EmptyCorpus)?;
        Ok(Self { corpus, config })
    }

    pub fn threshold(&self) -> u8 {
        self.config.threshold
    }

    /// Best match for one candidate
    pub fn classify(&self, candidate: &QuoteCandidate) -> MatchResult {
        let (index, score) = self.corpus.best_match(self.config.scorer, &candidate.text);
        let best = self.corpus.entry(index);

        debug!("Quote {} best match ({}): {:?}", candidate.index, score, best);

        MatchResult {
            candidate: candidate.clone(),
            best_match: best.to_string(),
            score,
        }
    }

    /// Results in candidate order
    pub fn classify_all(&self, candidates: &[QuoteCandidate]) -> Vec<MatchResult> {
        info!(
            "Stage 3: Checking {} quotes against {} references",
            candidates.len(),
            self.corpus.len()
        );
        candidates.iter().map(|c| self.classify(c)).collect()
    }
}
