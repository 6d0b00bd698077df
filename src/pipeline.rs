use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::error::QuoteError;
use crate::generator::TextGenerator;
use crate::io::{ensure_writable, RunSummary};
use crate::models::NoveltyReport;
use crate::stages::{
    ensure_model, execute_generation, execute_report, extract_all, normalize_corpus,
    ClassifierConfig, ExtractionStats, GenerationConfig, NormalizeConfig, NoveltyAggregator,
    NoveltyClassifier, ReportConfig, Sentinels,
};

/// Everything one run needs
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub normalize: NormalizeConfig,
    pub generation: GenerationConfig,
    pub classifier: ClassifierConfig,
    pub report: ReportConfig,
    pub sentinels: Sentinels,
    /// Skip novelty classification and report bare quotes
    pub skip_check: bool,
    /// Optional JSON summary path
    pub summary_json: Option<PathBuf>,
}

/// What a completed run produced
#[derive(Debug)]
pub struct PipelineOutcome {
    pub report: NoveltyReport,
    pub report_path: PathBuf,
    pub extraction: ExtractionStats,
    pub corpus_size: usize,
}

/// Run every stage in order: normalize, generate, extract, classify, report
///
/// Configuration problems (bad columns, empty corpus, existing report,
/// missing model) are detected before the generator is asked for anything.
pub async fn run_pipeline<G: TextGenerator>(generator: &G, config: &PipelineConfig) -> Result<PipelineOutcome> {
    ensure_writable(&config.report.output, config.report.overwrite)?;
    if !config.skip_check {
        config.classifier.validate()?;
    }

    // Stage 0: Normalize the corpus
    info!("Stage 0: Normalizing corpus from {:?}", config.normalize.source);
    let normalized = normalize_corpus(&config.normalize).context("Corpus normalization failed")?;
    for entry in normalized.top_attributions() {
        info!("  {}: {}", entry.name, entry.count);
    }

    let classifier = if config.skip_check {
        info!("Skipping novelty check (--skip-check)");
        None
    } else {
        Some(NoveltyClassifier::new(&normalized.corpus, config.classifier)?)
    };

    // Stage 1: Fine-tune and sample
    info!("Stage 1: Driving text generator...");
    ensure_model(generator, &config.generation).await?;
    let generation = execute_generation(generator, &normalized.training_path, &config.generation).await?;

    // Stage 2: Extract candidates
    info!("Stage 2: Extracting quotes...");
    let extraction = extract_all(&generation.blocks, &config.sentinels);
    info!(
        "Stage 2: {} quotes from {} blocks ({} empty, {} unterminated spans)",
        extraction.candidates.len(),
        extraction.stats.blocks,
        extraction.stats.empty_blocks,
        extraction.stats.unterminated_spans
    );

    // Stage 3 & 4: Classify and aggregate
    let report = match &classifier {
        Some(classifier) => {
            info!("Stage 3: Checking for plagiarism...");
            let mut aggregator = NoveltyAggregator::scored(classifier.threshold());
            for result in classifier.classify_all(&extraction.candidates) {
                aggregator.push_scored(result);
            }
            aggregator.finish()
        }
        None => {
            let mut aggregator = NoveltyAggregator::bare();
            for candidate in extraction.candidates {
                aggregator.push_bare(candidate);
            }
            aggregator.finish()
        }
    };

    info!("Stage 4: Writing report...");
    execute_report(&report, &config.report.output).context("Failed to write novelty report")?;

    if let Some(path) = &config.summary_json {
        let summary = RunSummary {
            run_name: config.generation.run_name.clone(),
            source: config.normalize.source.clone(),
            report: config.report.output.clone(),
            threshold: classifier.as_ref().map(|c| c.threshold()),
            skip_check: config.skip_check,
            total_candidates: report.summary.total_candidates,
            novel_count: report.summary.novel_count,
            novel_fraction: report.summary.novel_fraction,
            extraction: extraction.stats,
            completed_at: chrono::Utc::now(),
        };
        summary.write_json(path)?;
        info!("Summary written to {:?}", path);
    }

    Ok(PipelineOutcome {
        report,
        report_path: config.report.output.clone(),
        extraction: extraction.stats,
        corpus_size: normalized.corpus.len(),
    })
}

/// Whether a pipeline error was a data-integrity failure in the source
pub fn is_data_error(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|e| e.downcast_ref::<QuoteError>())
        .any(QuoteError::is_data_integrity)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::generator::FixedGenerator;
    use crate::models::ReportRow;

    const SOURCE: &str = "quote,attrib_name\n\
                          Be the change.,Gandhi\n\
                          Carpe diem.,Horace\n\
                          Stay hungry.,Jobs\n";

    fn config_in(dir: &Path, source: &str) -> PipelineConfig {
        let source_path = dir.join("quotes.csv");
        fs::write(&source_path, source).unwrap();

        PipelineConfig {
            normalize: NormalizeConfig {
                source: source_path,
                training_path: dir.join("barequotes.csv"),
                ..Default::default()
            },
            report: ReportConfig {
                output: dir.join("run1_quotes.csv"),
                overwrite: false,
            },
            ..Default::default()
        }
    }

    fn scenario_a_block() -> Vec<String> {
        vec![
            "<|startoftext|>Be the change.<|endoftext|><|startoftext|>Seize the day.<|endoftext|>"
                .to_string(),
        ]
    }

    #[tokio::test]
    async fn test_duplicate_and_novel_quote() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), SOURCE);
        let generator = FixedGenerator::new(scenario_a_block());

        let outcome = run_pipeline(&generator, &config).await.unwrap();

        let rows = &outcome.report.rows;
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            ReportRow::Scored {
                quote: "Be the change.".to_string(),
                best_match: "Be the change.".to_string(),
                match_score: 100,
            }
        );
        assert_eq!(rows[1].quote(), "Seize the day.");
        assert!(rows[1].score().unwrap() < 90);
        assert_eq!(outcome.report.summary.novel_count, 1);
        assert_eq!(outcome.report.summary.novel_fraction, Some(0.5));

        let written = fs::read_to_string(&outcome.report_path).unwrap();
        assert!(written.starts_with("quote,best_match,match_score\n"));
        assert_eq!(written.lines().count(), 3);

        let training = fs::read_to_string(dir.path().join("barequotes.csv")).unwrap();
        assert_eq!(training.lines().count(), 4);
    }

    #[tokio::test]
    async fn test_no_blocks_is_not_applicable() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), SOURCE);
        let generator = FixedGenerator::new(vec![]);

        let outcome = run_pipeline(&generator, &config).await.unwrap();

        assert!(outcome.report.rows.is_empty());
        assert_eq!(outcome.report.summary.total_candidates, 0);
        assert!(outcome.report.summary.novel_fraction.is_none());
        let written = fs::read_to_string(&outcome.report_path).unwrap();
        assert_eq!(written, "quote,best_match,match_score\n");
    }

    #[tokio::test]
    async fn test_skip_check_reports_bare_quotes() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path(), SOURCE);
        config.skip_check = true;
        let generator = FixedGenerator::new(scenario_a_block());

        let outcome = run_pipeline(&generator, &config).await.unwrap();

        assert!(!outcome.report.scored);
        assert!(outcome.report.rows.iter().all(|r| r.score().is_none()));
        let written = fs::read_to_string(&outcome.report_path).unwrap();
        assert_eq!(written, "quote\nBe the change.\nSeize the day.\n");
    }

    #[tokio::test]
    async fn test_empty_corpus_fails_before_generation() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "quote,attrib_name\n");
        let generator = FixedGenerator::new(scenario_a_block());

        let err = run_pipeline(&generator, &config).await.unwrap_err();

        assert!(matches!(err.downcast_ref::<QuoteError>(), Some(QuoteError::EmptyCorpus)));
        assert_eq!(generator.calls().generates, 0);
    }

    #[tokio::test]
    async fn test_empty_corpus_allowed_with_skip_check() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path(), "quote,attrib_name\n");
        config.skip_check = true;
        let generator = FixedGenerator::new(scenario_a_block());

        let outcome = run_pipeline(&generator, &config).await.unwrap();
        assert_eq!(outcome.report.rows.len(), 2);
        assert_eq!(outcome.corpus_size, 0);
    }

    #[tokio::test]
    async fn test_bad_row_is_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "quote,attrib_name\nCarpe diem.,Horace\n,Nobody\n");
        let generator = FixedGenerator::new(scenario_a_block());

        let err = run_pipeline(&generator, &config).await.unwrap_err();

        assert!(is_data_error(&err));
        assert_eq!(generator.calls().generates, 0);
        assert!(!config.report.output.exists());
    }

    #[tokio::test]
    async fn test_generator_failure_is_not_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), SOURCE);
        let generator = FixedGenerator::new(scenario_a_block()).failing();

        let err = run_pipeline(&generator, &config).await.unwrap_err();

        assert!(matches!(err.downcast_ref::<QuoteError>(), Some(QuoteError::Generator(_))));
        assert!(!is_data_error(&err));
        assert!(!config.report.output.exists());
    }

    #[tokio::test]
    async fn test_existing_report_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path(), SOURCE);
        fs::write(&config.report.output, "keep me").unwrap();
        let generator = FixedGenerator::new(scenario_a_block());

        let err = run_pipeline(&generator, &config).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<QuoteError>(), Some(QuoteError::OutputExists(_))));
        assert_eq!(fs::read_to_string(&config.report.output).unwrap(), "keep me");

        config.report.overwrite = true;
        run_pipeline(&generator, &config).await.unwrap();
        assert_ne!(fs::read_to_string(&config.report.output).unwrap(), "keep me");
    }

    #[tokio::test]
    async fn test_threshold_is_configurable() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path(), SOURCE);
        // Every score is >= 0
        config.classifier.threshold = 0;
        let generator = FixedGenerator::new(scenario_a_block());

        let outcome = run_pipeline(&generator, &config).await.unwrap();
        assert_eq!(outcome.report.summary.novel_count, 0);
    }

    #[tokio::test]
    async fn test_summary_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path(), SOURCE);
        let summary_path = dir.path().join("summary.json");
        config.summary_json = Some(summary_path.clone());
        let generator = FixedGenerator::new(scenario_a_block());

        run_pipeline(&generator, &config).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
        assert_eq!(json["total_candidates"], 2);
        assert_eq!(json["novel_count"], 1);
        assert_eq!(json["threshold"], 90);
        assert_eq!(json["extraction"]["blocks"], 1);
    }
}
