//! External text generation collaborator.
//!
//! The pipeline never trains or samples a model itself. It talks to a
//! [`TextGenerator`] backend and only relies on the shape of its output:
//! raw blocks containing sentinel-delimited quotes.

pub mod client;
pub mod fixed;
pub mod replay;

pub use client::*;
pub use fixed::*;
pub use replay::*;

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Handle to a loaded generator run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Backend-assigned session identifier
    pub id: String,
    /// Base model the session runs on
    pub model_name: String,
    /// Run name checkpoints are stored under
    pub run_name: String,
}

impl Session {
    pub fn new(model_name: &str, run_name: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            model_name: model_name.to_string(),
            run_name: run_name.to_string(),
        }
    }
}

/// Parameters forwarded untouched to the fine-tuning call
#[derive(Debug, Clone, Serialize)]
pub struct FineTuneParams {
    /// Canonical training file
    pub training_file: PathBuf,
    pub model_name: String,
    pub run_name: String,
    /// Number of training steps
    pub steps: u32,
    /// Steps between checkpoints
    pub checkpoint_interval: u32,
}

/// A model backend able to fine-tune on the quote corpus and sample from it
///
/// Calls are awaited one at a time; any of them may be long-running.
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    /// Whether the base model is available locally
    async fn has_model(&self, model_name: &str) -> Result<bool>;

    /// Fetch the base model
    async fn download(&self, model_name: &str) -> Result<()>;

    /// Start a fresh session on the base model
    async fn start_session(&self, model_name: &str, run_name: &str) -> Result<Session>;

    /// Resume the checkpoints of a prior run
    async fn load(&self, run_name: &str) -> Result<Session>;

    /// Fine-tune the session on the training file
    async fn fine_tune(&self, session: &Session, params: &FineTuneParams) -> Result<()>;

    /// Produce `sample_count` raw text blocks
    async fn generate(&self, session: &Session, sample_count: u32) -> Result<Vec<String>>;
}
