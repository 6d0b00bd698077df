pub mod error;
pub mod generator;
pub mod io;
pub mod matching;
pub mod models;
pub mod pipeline;
pub mod stages;

pub use error::QuoteError;
pub use generator::{FixedGenerator, HttpGenerator, HttpGeneratorConfig, ReplayGenerator, TextGenerator};
pub use io::{default_report_path, parse_delimiter};
pub use matching::Scorer;
pub use models::{
    AttributionTable, MatchResult, Novelty, NoveltyReport, NoveltySummary, QuoteCandidate,
    ReferenceCorpus, ReportRow,
};
pub use pipeline::{is_data_error, run_pipeline, PipelineConfig, PipelineOutcome};
pub use stages::{
    extract_all, extract_quotes, normalize_corpus, ClassifierConfig, GenerationConfig,
    NormalizeConfig, NoveltyAggregator, NoveltyClassifier, ReportConfig, Sentinels,
};
