use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use quotesmith::stages::{CANONICAL_TRAINING_FILE, DEFAULT_THRESHOLD, TOP_ATTRIBUTIONS};
use quotesmith::{
    default_report_path, is_data_error, normalize_corpus, parse_delimiter, run_pipeline, ClassifierConfig,
    GenerationConfig, HttpGenerator, HttpGeneratorConfig, NormalizeConfig, PipelineConfig,
    ReplayGenerator, ReportConfig, Scorer, Sentinels,
};

#[derive(Parser)]
#[command(name = "quotesmith")]
#[command(author, version, about = "Generate quotes and check them for novelty against the training corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the source table lives and how to read it
#[derive(clap::Args)]
struct SourceArgs {
    /// Source file to load quotes from
    source: PathBuf,

    /// Field delimiter of the source file (use \t for tabs)
    #[arg(long, default_value = ",")]
    delimiter: String,

    /// Name of the quote column
    #[arg(long, default_value = "quote")]
    quote_column: String,

    /// Name of the attribution column
    #[arg(long, default_value = "attrib_name")]
    attribution_column: String,
}

impl SourceArgs {
    fn normalize_config(&self) -> Result<NormalizeConfig> {
        Ok(NormalizeConfig {
            source: self.source.clone(),
            delimiter: parse_delimiter(&self.delimiter)?,
            quote_column: self.quote_column.clone(),
            attribution_column: self.attribution_column.clone(),
            training_path: PathBuf::from(CANONICAL_TRAINING_FILE),
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fine-tune, generate quotes and check them for novelty
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Automatically download the model if needed
        #[arg(long)]
        autodownload: bool,

        /// Run a fine-tuning pass on the model
        #[arg(long)]
        finetune: bool,

        /// Resume training from a prior run
        #[arg(long)]
        resume: bool,

        /// Name of the base model to use
        #[arg(long, default_value = "124M")]
        model_name: String,

        /// Name of this run, used for resuming and the default report name
        #[arg(long, default_value = "run1")]
        run_name: String,

        /// Number of training steps
        #[arg(long, default_value = "100")]
        steps: u32,

        /// Steps between checkpoints
        #[arg(long, default_value = "500")]
        checkpoint_interval: u32,

        /// Number of generation passes
        #[arg(long, default_value = "1")]
        nsamples: u32,

        /// Score at or above which a quote counts as a copy (0-100)
        #[arg(long, default_value_t = DEFAULT_THRESHOLD, value_parser = clap::value_parser!(u8).range(0..=100))]
        threshold: u8,

        /// Similarity metric
        #[arg(long, value_enum, default_value_t = Scorer::Weighted)]
        scorer: Scorer,

        /// Skip the novelty check and report bare quotes
        #[arg(long)]
        skip_check: bool,

        /// Report file (default: <run-name>_<source file name>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace the report file if it exists
        #[arg(long)]
        overwrite: bool,

        /// Also write a JSON summary of the run
        #[arg(long)]
        summary_json: Option<PathBuf>,

        /// Replay samples from a file instead of calling the generator service
        #[arg(long)]
        samples_file: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Normalize the source corpus and print its statistics
    Analyze {
        #[command(flatten)]
        source: SourceArgs,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            autodownload,
            finetune,
            resume,
            model_name,
            run_name,
            steps,
            checkpoint_interval,
            nsamples,
            threshold,
            scorer,
            skip_check,
            output,
            overwrite,
            summary_json,
            samples_file,
            verbose,
        } => {
            setup_logging(verbose);
            let output = output.unwrap_or_else(|| default_report_path(&run_name, &source.source));
            let config = PipelineConfig {
                normalize: source.normalize_config()?,
                generation: GenerationConfig {
                    model_name,
                    run_name,
                    autodownload,
                    finetune,
                    resume,
                    steps,
                    checkpoint_interval,
                    sample_count: nsamples,
                },
                classifier: ClassifierConfig { threshold, scorer },
                report: ReportConfig { output, overwrite },
                sentinels: Sentinels::default(),
                skip_check,
                summary_json,
            };
            run(config, samples_file).await
        }
        Commands::Analyze { source, verbose } => {
            setup_logging(verbose);
            analyze_corpus(source.normalize_config()?)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn run(config: PipelineConfig, samples_file: Option<PathBuf>) -> Result<()> {
    let result = match samples_file {
        Some(path) => {
            info!("Replaying samples from {:?}", path);
            let generator = ReplayGenerator::from_file(&path)?;
            run_pipeline(&generator, &config).await
        }
        None => {
            let generator = HttpGenerator::new(HttpGeneratorConfig::from_env());
            run_pipeline(&generator, &config).await
        }
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            if is_data_error(&err) {
                error!(
                    "Source data in {:?} is corrupt; fix the offending row and rerun",
                    config.normalize.source
                );
            }
            return Err(err.context("Quote run failed"));
        }
    };

    info!("Report written to {:?}", outcome.report_path);
    println!("{}", outcome.report.summary);

    Ok(())
}

fn analyze_corpus(config: NormalizeConfig) -> Result<()> {
    info!("Analyzing corpus from {:?}", config.source);
    let result = normalize_corpus(&config).context("Failed to normalize corpus")?;

    println!("Corpus Analysis");
    println!("===============");
    println!("Total quotes: {}", result.corpus.len());
    println!("Distinct attributions: {}", result.attributions.distinct());
    println!("Training file: {:?}", result.training_path);
    println!();

    println!("Top {} Sources", TOP_ATTRIBUTIONS);
    println!("--------------");
    for entry in result.top_attributions() {
        println!("{}: {}", entry.name, entry.count);
    }

    Ok(())
}
