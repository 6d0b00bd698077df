pub mod process;
pub mod scorer;

pub use process::*;
pub use scorer::*;

use crate::models::ReferenceCorpus;

/// Reference entries preprocessed once for repeated matching
///
/// Never empty, so every candidate has a best match.
#[derive(Debug, Clone)]
pub struct PreparedCorpus<'a> {
    entries: Vec<Prepared<'a>>,
}

impl<'a> PreparedCorpus<'a> {
    /// `None` for an empty corpus
    pub fn new(corpus: &'a ReferenceCorpus) -> Option<Self> {
        if corpus.is_empty() {
            return None;
        }
        Some(Self {
            entries: corpus.iter().map(Prepared::new).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw text of entry `index`
    pub fn entry(&self, index: usize) -> &'a str {
        self.entries[index].raw()
    }

    /// Best-scoring entry: `(index, score)`
    ///
    /// Earliest entry wins ties.
    pub fn best_match(&self, scorer: Scorer, candidate: &str) -> (usize, u8) {
        let candidate = Prepared::new(candidate);
        let mut best = (0, scorer.score_prepared(&candidate, &self.entries[0]));

        for (index, reference) in self.entries.iter().enumerate().skip(1) {
            if best.1 == MAX_SCORE {
                break;
            }
            let score = scorer.score_prepared(&candidate, reference);
            if score > best.1 {
                best = (index, score);
            }
        }

        best
    }
}

/// Best-scoring reference entry: `(index, score)`
///
/// Earliest entry wins ties. Returns `None` only for an empty corpus.
pub fn best_match(scorer: Scorer, candidate: &str, corpus: &ReferenceCorpus) -> Option<(usize, u8)> {
    PreparedCorpus::new(corpus).map(|prepared| prepared.best_match(scorer, candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(quotes: &[&str]) -> ReferenceCorpus {
        quotes.iter().map(|q| q.to_string()).collect()
    }

    #[test]
    fn test_best_match_picks_exact_entry() {
        let corpus = corpus(&["Be the change.", "Carpe diem.", "Stay hungry."]);
        assert_eq!(best_match(Scorer::Weighted, "Carpe diem.", &corpus), Some((1, 100)));
    }

    #[test]
    fn test_best_match_ties_go_to_earliest() {
        let corpus = corpus(&["Carpe diem!", "carpe diem", "Carpe diem."]);
        // All three normalize to the same text and score 100
        assert_eq!(best_match(Scorer::Ratio, "CARPE DIEM", &corpus), Some((0, 100)));

        let corpus = corpus_of_unrelated();
        let (index, _) = best_match(Scorer::Ratio, "zzzz", &corpus).unwrap();
        assert_eq!(index, 0);
    }

    fn corpus_of_unrelated() -> ReferenceCorpus {
        corpus(&["aaaa", "bbbb", "cccc"])
    }

    #[test]
    fn test_best_match_empty_corpus() {
        assert_eq!(best_match(Scorer::Weighted, "anything", &ReferenceCorpus::default()), None);
    }

    #[test]
    fn test_prepared_corpus_keeps_entries() {
        let corpus = corpus(&["Be the change.", "Carpe diem."]);
        let prepared = PreparedCorpus::new(&corpus).unwrap();

        assert_eq!(prepared.len(), 2);
        assert_eq!(prepared.entry(1), "Carpe diem.");
        assert_eq!(prepared.best_match(Scorer::Weighted, "carpe diem"), (1, 100));
        assert!(PreparedCorpus::new(&ReferenceCorpus::default()).is_none());
    }
}
