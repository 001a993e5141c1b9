//! Hugging Face text-to-image backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use quillpad_core::{defaults, Error, GeneratedImage, ImageGenerator, Result};

/// Default Hugging Face inference API endpoint.
pub const DEFAULT_HF_URL: &str = defaults::HF_URL;

/// Default text-to-image model.
pub const DEFAULT_IMAGE_MODEL: &str = defaults::IMAGE_MODEL;

/// Timeout for image generation requests (seconds). Diffusion models are
/// slow on cold starts.
pub const IMAGE_TIMEOUT_SECS: u64 = defaults::IMAGE_TIMEOUT_SECS;

/// Hugging Face text-to-image backend.
pub struct HfImageBackend {
    client: Client,
    base_url: String,
    model: String,
    api_token: String,
    timeout_secs: u64,
}

impl HfImageBackend {
    /// Create a new image backend with custom configuration.
    pub fn with_config(base_url: String, model: String, api_token: String) -> Self {
        let timeout = std::env::var("QUILLPAD_IMAGE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(IMAGE_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .expect("Failed to create HTTP client");

        info!(
            "Initializing image backend: url={}, model={}",
            base_url, model
        );

        Self {
            client,
            base_url,
            model,
            api_token,
            timeout_secs: timeout,
        }
    }

    /// Create from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `HF_BASE` | `https://api-inference.huggingface.co` |
    /// | `HF_IMAGE_MODEL` | `black-forest-labs/FLUX.1-dev` |
    /// | `HF_API_TOKEN` | (empty — requests will be rejected upstream) |
    pub fn from_env() -> Self {
        let base_url = std::env::var("HF_BASE").unwrap_or_else(|_| DEFAULT_HF_URL.to_string());
        let model =
            std::env::var("HF_IMAGE_MODEL").unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string());
        let api_token = std::env::var("HF_API_TOKEN").unwrap_or_default();

        Self::with_config(base_url, model, api_token)
    }
}

#[derive(Serialize)]
struct TextToImageRequest {
    inputs: String,
    parameters: TextToImageParameters,
}

#[derive(Serialize)]
struct TextToImageParameters {
    width: u32,
    height: u32,
    num_inference_steps: u32,
}

#[async_trait]
impl ImageGenerator for HfImageBackend {
    #[instrument(skip(self, description), fields(subsystem = "inference", component = "hf_image", op = "generate", model = %self.model, prompt_len = description.len()))]
    async fn generate(&self, description: &str) -> Result<GeneratedImage> {
        let start = Instant::now();

        let request = TextToImageRequest {
            inputs: description.to_string(),
            parameters: TextToImageParameters {
                width: defaults::IMAGE_WIDTH,
                height: defaults::IMAGE_HEIGHT,
                num_inference_steps: defaults::IMAGE_INFERENCE_STEPS,
            },
        };

        let url = format!("{}/models/{}", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Image API returned {}: {}",
                status, body
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();

        // The API returns either raw image bytes or a JSON error document;
        // anything that is not an image is an unexpected response shape.
        if !content_type.starts_with("image/") {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Unexpected response content-type {}: {}",
                content_type, body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Inference(format!("Failed to read image bytes: {}", e)))?
            .to_vec();

        if bytes.is_empty() {
            return Err(Error::Inference("Image API returned empty body".to_string()));
        }

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            image_bytes = bytes.len(),
            duration_ms = elapsed,
            "Image generation complete"
        );
        if elapsed > 60000 {
            warn!(
                duration_ms = elapsed,
                slow = true,
                "Slow image generation operation"
            );
        }

        Ok(GeneratedImage {
            bytes,
            content_type,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_HF_URL, "https://api-inference.huggingface.co");
        assert_eq!(DEFAULT_IMAGE_MODEL, "black-forest-labs/FLUX.1-dev");
    }

    #[test]
    fn test_model_name() {
        let backend = HfImageBackend::with_config(
            "http://localhost:9".to_string(),
            "black-forest-labs/FLUX.1-dev".to_string(),
            "tok".to_string(),
        );
        assert_eq!(backend.model_name(), "black-forest-labs/FLUX.1-dev");
    }

    #[tokio::test]
    async fn test_generate_returns_bytes_and_content_type() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/black-forest-labs/FLUX.1-dev"))
            .and(header("authorization", "Bearer tok"))
            .and(body_partial_json(serde_json::json!({
                "parameters": {"width": 512, "height": 512, "num_inference_steps": 50}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(b"fake-png".to_vec()),
            )
            .mount(&server)
            .await;

        let backend = HfImageBackend::with_config(
            server.uri(),
            "black-forest-labs/FLUX.1-dev".to_string(),
            "tok".to_string(),
        );

        let image = backend.generate("a minimal flat mountain").await.unwrap();
        assert_eq!(image.bytes, b"fake-png");
        assert_eq!(image.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_generate_rejects_non_image_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/m"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_string("{\"estimated_time\": 20.0}"),
            )
            .mount(&server)
            .await;

        let backend =
            HfImageBackend::with_config(server.uri(), "m".to_string(), "tok".to_string());

        let err = backend.generate("anything").await.unwrap_err();
        match err {
            Error::Inference(msg) => assert!(msg.contains("Unexpected response content-type")),
            other => panic!("Expected Inference error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_surfaces_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/m"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
            .mount(&server)
            .await;

        let backend =
            HfImageBackend::with_config(server.uri(), "m".to_string(), "tok".to_string());

        let err = backend.generate("anything").await.unwrap_err();
        match err {
            Error::Inference(msg) => {
                assert!(msg.contains("503"));
                assert!(msg.contains("model loading"));
            }
            other => panic!("Expected Inference error, got {:?}", other),
        }
    }
}
