use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::Result;
use crate::io::{read_source_file, write_training_file, SourceLayout};
use crate::models::{AttributionCount, AttributionTable, ReferenceCorpus};

/// Fixed location of the canonical training file handed to the text generator
pub const CANONICAL_TRAINING_FILE: &str = "barequotes.csv";

/// How many attributions the corpus report lists
pub const TOP_ATTRIBUTIONS: usize = 10;

/// Configuration for Stage 0
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Delimited source table
    pub source: PathBuf,
    /// Field delimiter of the source
    pub delimiter: u8,
    /// Header name of the quote column
    pub quote_column: String,
    /// Header name of the attribution column
    pub attribution_column: String,
    /// Where the canonical training file is written
    pub training_path: PathBuf,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            delimiter: b',',
            quote_column: "quote".to_string(),
            attribution_column: "attrib_name".to_string(),
            training_path: PathBuf::from(CANONICAL_TRAINING_FILE),
        }
    }
}

/// Result of Stage 0 normalization
#[derive(Debug)]
pub struct NormalizationResult {
    /// Source quotes in source order
    pub corpus: ReferenceCorpus,
    /// Per-attribution row counts for this run
    pub attributions: AttributionTable,
    /// Path of the written training file
    pub training_path: PathBuf,
}

impl NormalizationResult {
    pub fn top_attributions(&self) -> Vec<AttributionCount> {
        self.attributions.top(TOP_ATTRIBUTIONS)
    }
}

/// Perform Stage 0: corpus normalization
///
/// This stage:
/// 1. Reads the source table and validates its header
/// 2. Builds the reference corpus and attribution counts
/// 3. Writes the single-column training file
///
/// Any bad row aborts before the training file is put in place.
pub fn normalize_corpus(config: &NormalizeConfig) -> Result<NormalizationResult> {
    let layout = SourceLayout {
        delimiter: config.delimiter,
        quote_column: config.quote_column.clone(),
        attribution_column: config.attribution_column.clone(),
    };

    let rows = read_source_file(&config.source, &layout)?;

    let mut attributions = AttributionTable::new();
    let mut quotes = Vec::with_capacity(rows.len());
    for row in rows {
        attributions.record(row.attribution.as_deref());
        quotes.push(row.quote);
    }
    let corpus = ReferenceCorpus::new(quotes);

    write_training_file(&config.training_path, corpus.iter())?;
    debug!("Training file written to {:?}", config.training_path);

    info!(
        "Loaded {} quotes attributed to {} sources",
        corpus.len(),
        attributions.distinct()
    );

    Ok(NormalizationResult {
        corpus,
        attributions,
        training_path: config.training_path.clone(),
    })
}
