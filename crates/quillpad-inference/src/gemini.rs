//! Gemini text-generation backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use quillpad_core::{defaults, Error, Result, TextGenerator};

/// Default Gemini API endpoint.
pub const DEFAULT_GEMINI_URL: &str = defaults::GEMINI_URL;

/// Default generation model.
pub const DEFAULT_GEN_MODEL: &str = defaults::GEMINI_MODEL;

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = defaults::GEN_TIMEOUT_SECS;

/// Gemini text-generation backend.
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    gen_timeout_secs: u64,
}

impl GeminiBackend {
    /// Create a new Gemini backend with custom configuration.
    pub fn with_config(base_url: String, model: String, api_key: String) -> Self {
        let gen_timeout = std::env::var("QUILLPAD_GEN_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(GEN_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(gen_timeout))
            .build()
            .expect("Failed to create HTTP client");

        info!(
            "Initializing Gemini backend: url={}, model={}",
            base_url, model
        );

        Self {
            client,
            base_url,
            model,
            api_key,
            gen_timeout_secs: gen_timeout,
        }
    }

    /// Create from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GEMINI_BASE` | `https://generativelanguage.googleapis.com` |
    /// | `GEMINI_MODEL` | `gemini-1.5-flash` |
    /// | `GEMINI_API_KEY` | (empty — requests will be rejected upstream) |
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("GEMINI_BASE").unwrap_or_else(|_| DEFAULT_GEMINI_URL.to_string());
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEN_MODEL.to_string());
        let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();

        Self::with_config(base_url, model, api_key)
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[async_trait]
impl TextGenerator for GeminiBackend {
    #[instrument(skip(self, prompt), fields(subsystem = "inference", component = "gemini", op = "generate", model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .timeout(Duration::from_secs(self.gen_timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Gemini returned {}: {}",
                status, body
            )));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let content: String = result
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .concat()
            })
            .unwrap_or_default();

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = content.len(),
            duration_ms = elapsed,
            "Generation complete"
        );
        if elapsed > 30000 {
            warn!(
                duration_ms = elapsed,
                prompt_len = prompt.len(),
                slow = true,
                "Slow generation operation"
            );
        }
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
