use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the normalization, classification and reporting stages.
///
/// Every variant is fatal for the run. Extraction anomalies and an empty
/// summary are not errors; they surface through counters instead.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// A configured column is absent from the source header
    #[error("column '{column}' not found in source header (available: {available})")]
    MissingColumn { column: String, available: String },

    /// A source row has no value for the quote column
    #[error("row {row} has no value for required column '{column}'")]
    MissingQuote { row: u64, column: String },

    /// The reference corpus has no entries to compare against
    #[error("reference corpus is empty; no best match can be computed")]
    EmptyCorpus,

    /// The report path already exists and overwriting was not requested
    #[error("output file {0:?} already exists (pass --overwrite to replace it)")]
    OutputExists(PathBuf),

    /// Any other invalid setting
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed delimited data in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The external text generator failed
    #[error("text generator failed: {0}")]
    Generator(String),
}

impl QuoteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    /// Whether the error stems from bad input data rather than bad settings
    pub fn is_data_integrity(&self) -> bool {
        matches!(self, Self::MissingQuote { .. })
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message_lists_headers() {
        let err = QuoteError::MissingColumn {
            column: "quote".to_string(),
            available: "text, author".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'quote'"));
        assert!(msg.contains("text, author"));
        assert!(!err.is_data_integrity());
    }

    #[test]
    fn test_missing_quote_is_data_integrity() {
        let err = QuoteError::MissingQuote {
            row: 7,
            column: "quote".to_string(),
        };
        assert!(err.is_data_integrity());
        assert!(err.to_string().contains("row 7"));
    }
}
