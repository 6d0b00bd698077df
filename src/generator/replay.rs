use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use super::{FineTuneParams, Session, TextGenerator};

/// Serves samples captured from an earlier generation run
///
/// A `.json` file holds an array of blocks; any other file is one block.
/// Model management and fine-tuning are no-ops, so a prior run's output
/// can be re-checked against a corpus without a model service.
#[derive(Debug, Clone)]
pub struct ReplayGenerator {
    path: PathBuf,
    samples: Vec<String>,
}

impl ReplayGenerator {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read samples file: {:?}", path))?;

        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let samples = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse samples array in {:?}", path))?
        } else {
            vec![content]
        };

        Ok(Self {
            path: path.to_path_buf(),
            samples,
        })
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }
}

impl TextGenerator for ReplayGenerator {
    async fn has_model(&self, _model_name: &str) -> Result<bool> {
        Ok(true)
    }

    async fn download(&self, _model_name: &str) -> Result<()> {
        Ok(())
    }

    async fn start_session(&self, model_name: &str, run_name: &str) -> Result<Session> {
        Ok(Session::new(model_name, run_name))
    }

    async fn load(&self, run_name: &str) -> Result<Session> {
        Ok(Session::new("replay", run_name))
    }

    async fn fine_tune(&self, _session: &Session, _params: &FineTuneParams) -> Result<()> {
        info!("Replaying samples from {:?}; skipping fine-tuning", self.path);
        Ok(())
    }

    /// Replays every captured block regardless of `sample_count`
    async fn generate(&self, _session: &Session, _sample_count: u32) -> Result<Vec<String>> {
        Ok(self.samples.clone())
    }
}
