use std::path::PathBuf;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FineTuneParams, Session, TextGenerator};

/// Configuration for the HTTP generator backend
#[derive(Debug, Clone)]
pub struct HttpGeneratorConfig {
    /// Base URL of the inference service (from QUOTESMITH_GENERATOR_URL)
    pub base_url: String,
    /// Directory the service keeps base models in (from QUOTESMITH_MODEL_DIR)
    pub model_dir: String,
}

impl HttpGeneratorConfig {
    pub const DEFAULT_URL: &'static str = "http://127.0.0.1:8765";
    pub const DEFAULT_MODEL_DIR: &'static str = "models";

    /// Create config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("QUOTESMITH_GENERATOR_URL")
                .unwrap_or_else(|_| Self::DEFAULT_URL.to_string()),
            model_dir: std::env::var("QUOTESMITH_MODEL_DIR")
                .unwrap_or_else(|_| Self::DEFAULT_MODEL_DIR.to_string()),
        }
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model_dir: Self::DEFAULT_MODEL_DIR.to_string(),
        }
    }
}

/// Text generator served over JSON/HTTP by a model inference service
pub struct HttpGenerator {
    client: Client,
    config: HttpGeneratorConfig,
}

impl HttpGenerator {
    pub fn new(config: HttpGeneratorConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<R> {
        let url = self.url(endpoint);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send request to generator at {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Generator error on {}: {} - {}", endpoint, status, body);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse generator response from {}", endpoint))
    }
}

impl TextGenerator for HttpGenerator {
    async fn has_model(&self, model_name: &str) -> Result<bool> {
        let response: ModelStatus = self
            .post(
                "models/status",
                &ModelRequest {
                    model_name,
                    model_dir: &self.config.model_dir,
                },
            )
            .await?;
        Ok(response.available)
    }

    async fn download(&self, model_name: &str) -> Result<()> {
        let _: Ack = self
            .post(
                "models/download",
                &ModelRequest {
                    model_name,
                    model_dir: &self.config.model_dir,
                },
            )
            .await?;
        Ok(())
    }

    async fn start_session(&self, model_name: &str, run_name: &str) -> Result<Session> {
        let response: SessionResponse = self
            .post(
                "sessions",
                &SessionRequest {
                    model_name: Some(model_name),
                    run_name,
                    resume: false,
                },
            )
            .await?;
        Ok(response.session)
    }

    async fn load(&self, run_name: &str) -> Result<Session> {
        let response: SessionResponse = self
            .post(
                "sessions",
                &SessionRequest {
                    model_name: None,
                    run_name,
                    resume: true,
                },
            )
            .await?;
        Ok(response.session)
    }

    async fn fine_tune(&self, session: &Session, params: &FineTuneParams) -> Result<()> {
        let _: Ack = self
            .post(
                "finetune",
                &FineTuneRequest {
                    session_id: &session.id,
                    training_file: params.training_file.clone(),
                    model_name: &params.model_name,
                    run_name: &params.run_name,
                    steps: params.steps,
                    save_every: params.checkpoint_interval,
                },
            )
            .await?;
        Ok(())
    }

    async fn generate(&self, session: &Session, sample_count: u32) -> Result<Vec<String>> {
        let response: GenerateResponse = self
            .post(
                "generate",
                &GenerateRequest {
                    session_id: &session.id,
                    nsamples: sample_count,
                },
            )
            .await?;
        Ok(response.samples)
    }
}

#[derive(Debug, Serialize)]
struct ModelRequest<'a> {
    model_name: &'a str,
    model_dir: &'a str,
}

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model_name: Option<&'a str>,
    run_name: &'a str,
    resume: bool,
}

#[derive(Debug, Serialize)]
struct FineTuneRequest<'a> {
    session_id: &'a str,
    training_file: PathBuf,
    model_name: &'a str,
    run_name: &'a str,
    steps: u32,
    save_every: u32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    session_id: &'a str,
    nsamples: u32,
}

#[derive(Debug, Deserialize)]
struct ModelStatus {
    available: bool,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session: Session,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    samples: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Ack {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let generator = HttpGenerator::new(HttpGeneratorConfig::new("http://localhost:9000/"));
        assert_eq!(generator.url("generate"), "http://localhost:9000/generate");
    }

    #[test]
    fn test_parse_generate_response() {
        let json = r#"{"samples": ["<|startoftext|>Carpe diem.<|endoftext|>"]}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.samples.len(), 1);
    }

    #[test]
    fn test_session_request_omits_model_on_resume() {
        let request = SessionRequest {
            model_name: None,
            run_name: "run1",
            resume: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"run_name": "run1", "resume": true}));
    }
}
