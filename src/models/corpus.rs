use std::collections::HashMap;

use serde::Serialize;

/// Bucket used for rows with no attribution value
pub const UNKNOWN_ATTRIBUTION: &str = "unknown";

/// Ordered, read-only snapshot of the source quotes
///
/// Built once by the normalizer; the classifier only ever borrows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceCorpus {
    quotes: Vec<String>,
}

impl ReferenceCorpus {
    pub fn new(quotes: Vec<String>) -> Self {
        Self { quotes }
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.quotes.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.quotes.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.quotes
    }
}

impl FromIterator<String> for ReferenceCorpus {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Attribution entry with its occurrence count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributionCount {
    pub name: String,
    pub count: usize,
}

/// Occurrence counts per attribution name
///
/// Keeps first-encounter order so that ranking ties resolve to whichever
/// attribution showed up first in the source.
#[derive(Debug, Clone, Default)]
pub struct AttributionTable {
    entries: Vec<AttributionCount>,
    index: HashMap<String, usize>,
}

impl AttributionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one row for `name`. Missing or blank names go to the unknown bucket.
    pub fn record(&mut self, name: Option<&str>) {
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n,
            _ => UNKNOWN_ATTRIBUTION,
        };

        match self.index.get(name) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push(AttributionCount {
                    name: name.to_string(),
                    count: 1,
                });
            }
        }
    }

    pub fn count(&self, name: &str) -> usize {
        self.index
            .get(name)
            .map(|&i| self.entries[i].count)
            .unwrap_or(0)
    }

    /// Number of distinct attributions
    pub fn distinct(&self) -> usize {
        self.entries.len()
    }

    /// Total rows counted
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// The `n` most frequent attributions, ties in first-encountered order
    pub fn top(&self, n: usize) -> Vec<AttributionCount> {
        let mut ranked = self.entries.clone();
        // sort_by is stable, so equal counts keep insertion order
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(n);
        ranked
    }
}
