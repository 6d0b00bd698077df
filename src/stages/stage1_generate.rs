use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::error::QuoteError;
use crate::generator::{FineTuneParams, Session, TextGenerator};

/// Configuration for Stage 1
///
/// Everything here is passed through to the generator. Fewer training steps
/// make the model reproduce fewer corpus lines verbatim; that interacts with
/// the novelty threshold, but the two are tuned independently.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Base model name
    pub model_name: String,
    /// Run name used for checkpoints and the default report name
    pub run_name: String,
    /// Download the base model when it is missing
    pub autodownload: bool,
    /// Run a fine-tuning pass before sampling
    pub finetune: bool,
    /// Resume from the checkpoints of `run_name`
    pub resume: bool,
    /// Training steps for the fine-tuning pass
    pub steps: u32,
    /// Steps between checkpoints
    pub checkpoint_interval: u32,
    /// Number of generation passes
    pub sample_count: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_name: "124M".to_string(),
            run_name: "run1".to_string(),
            autodownload: false,
            finetune: false,
            resume: false,
            steps: 100,
            checkpoint_interval: 500,
            sample_count: 1,
        }
    }
}

/// Result of Stage 1 generation
#[derive(Debug)]
pub struct GenerationResult {
    pub session: Session,
    /// Raw blocks as returned by the generator
    pub blocks: Vec<String>,
    pub fine_tuned: bool,
}

/// Backend failures become `QuoteError::Generator`, keeping the backend's cause chain
fn generator_error(action: &str, err: anyhow::Error) -> anyhow::Error {
    QuoteError::Generator(format!("{}: {:#}", action, err)).into()
}

/// Make sure the base model is present, downloading it if allowed
///
/// Run before any expensive work so a missing model fails the run early.
pub async fn ensure_model<G: TextGenerator>(generator: &G, config: &GenerationConfig) -> Result<()> {
    info!("Using model: {}", config.model_name);

    if generator
        .has_model(&config.model_name)
        .await
        .map_err(|e| generator_error("failed to check for base model", e))?
    {
        return Ok(());
    }

    if !config.autodownload {
        return Err(QuoteError::InvalidConfig(format!(
            "model {} is not available; pass --autodownload to fetch it",
            config.model_name
        ))
        .into());
    }

    info!("Downloading {} model...", config.model_name);
    generator
        .download(&config.model_name)
        .await
        .map_err(|e| generator_error(&format!("failed to download model {}", config.model_name), e))
}

/// Execute Stage 1: fine-tune (optionally) and sample the generator
///
/// 1. Start a fresh session or resume `run_name`
/// 2. Fine-tune on the canonical training file if requested
/// 3. Generate `sample_count` raw blocks
pub async fn execute_generation<G: TextGenerator>(
    generator: &G,
    training_file: &Path,
    config: &GenerationConfig,
) -> Result<GenerationResult> {
    let session = if config.resume {
        info!("Loading run {}", config.run_name);
        generator
            .load(&config.run_name)
            .await
            .map_err(|e| generator_error(&format!("failed to load run {}", config.run_name), e))?
    } else {
        generator
            .start_session(&config.model_name, &config.run_name)
            .await
            .map_err(|e| generator_error("failed to start session", e))?
    };

    if config.finetune {
        info!(
            "Fine-tuning the model from training data ({} steps)",
            config.steps
        );
        let params = FineTuneParams {
            training_file: training_file.to_path_buf(),
            model_name: config.model_name.clone(),
            run_name: config.run_name.clone(),
            steps: config.steps,
            checkpoint_interval: config.checkpoint_interval,
        };
        generator
            .fine_tune(&session, &params)
            .await
            .map_err(|e| generator_error("fine-tuning failed", e))?;
    }

    info!("Generating quotes ({} passes)", config.sample_count);
    let blocks = generator
        .generate(&session, config.sample_count)
        .await
        .map_err(|e| generator_error("generation failed", e))?;
    info!("Received {} samples", blocks.len());

    Ok(GenerationResult {
        session,
        blocks,
        fine_tuned: config.finetune,
    })
}
