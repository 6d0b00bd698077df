use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use super::{FineTuneParams, Session, TextGenerator};

/// Calls observed by a [`FixedGenerator`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorCalls {
    pub downloads: Vec<String>,
    pub sessions_started: usize,
    pub loads: Vec<String>,
    pub fine_tunes: Vec<u32>,
    pub generates: usize,
}

/// Deterministic in-memory generator for tests
///
/// Returns the same blocks on every `generate` call and records what the
/// pipeline asked of it.
///
/// ```
/// use quotesmith::generator::{FixedGenerator, TextGenerator};
///
/// let generator = FixedGenerator::new(vec!["<|startoftext|>Hi<|endoftext|>".to_string()]);
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// let blocks = runtime.block_on(async {
///     let session = generator.start_session("124M", "run1").await.unwrap();
///     generator.generate(&session, 1).await.unwrap()
/// });
/// assert_eq!(blocks.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct FixedGenerator {
    blocks: Vec<String>,
    model_available: bool,
    fail_generate: bool,
    calls: Arc<Mutex<GeneratorCalls>>,
}

impl FixedGenerator {
    pub fn new(blocks: Vec<String>) -> Self {
        Self {
            blocks,
            model_available: true,
            fail_generate: false,
            calls: Arc::default(),
        }
    }

    /// Pretend the base model has not been downloaded yet
    pub fn without_model(mut self) -> Self {
        self.model_available = false;
        self
    }

    /// Make every `generate` call fail, as an unreachable service would
    pub fn failing(mut self) -> Self {
        self.fail_generate = true;
        self
    }

    pub fn calls(&self) -> GeneratorCalls {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, f: impl FnOnce(&mut GeneratorCalls)) {
        if let Ok(mut calls) = self.calls.lock() {
            f(&mut calls);
        }
    }
}

impl TextGenerator for FixedGenerator {
    async fn has_model(&self, _model_name: &str) -> Result<bool> {
        let downloaded = !self.calls().downloads.is_empty();
        Ok(self.model_available || downloaded)
    }

    async fn download(&self, model_name: &str) -> Result<()> {
        self.record(|c| c.downloads.push(model_name.to_string()));
        Ok(())
    }

    async fn start_session(&self, model_name: &str, run_name: &str) -> Result<Session> {
        self.record(|c| c.sessions_started += 1);
        Ok(Session::new(model_name, run_name))
    }

    async fn load(&self, run_name: &str) -> Result<Session> {
        self.record(|c| c.loads.push(run_name.to_string()));
        Ok(Session::new("fixed", run_name))
    }

    async fn fine_tune(&self, _session: &Session, params: &FineTuneParams) -> Result<()> {
        self.record(|c| c.fine_tunes.push(params.steps));
        Ok(())
    }

    async fn generate(&self, _session: &Session, _sample_count: u32) -> Result<Vec<String>> {
        self.record(|c| c.generates += 1);
        if self.fail_generate {
            bail!("generator unavailable");
        }
        Ok(self.blocks.clone())
    }
}
