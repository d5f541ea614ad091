//! Remote image generation — the expensive, rate-limited fallback path.
//!
//! [`ImageGenerator`] is the async seam the orchestrator calls through;
//! [`TogetherImageGenerator`] implements it against a Together-style
//! `/inference` endpoint. Image parameters (dimensions, steps, output count,
//! encoding) are static configuration, never part of the cache key.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::GenerationConfig;
use crate::error::GenerationError;

/// Data-URI prefix prepended to the base64 payload returned by the backend.
const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Produces an artifact (a base64 image data URI) from a text prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate one image for `prompt`. No internal retries; any non-success
    /// response or malformed result is a [`GenerationError`].
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    negative_prompt: &'a str,
    width: u32,
    height: u32,
    steps: u32,
    n: u32,
    response_format: &'a str,
}

/// HTTP client for a Together-style image generation backend.
pub struct TogetherImageGenerator {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl TogetherImageGenerator {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl ImageGenerator for TogetherImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        tracing::info!(title = prompt, "generating a new image");

        let request = InferenceRequest {
            model: &self.model,
            prompt,
            negative_prompt: "",
            width: 1024,
            height: 768,
            steps: 4,
            n: 1,
            response_format: "b64_json",
        };

        let response = self
            .http
            .post(format!("{}/inference", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        let image_b64 = body
            .pointer("/output/choices/0/image_base64")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                GenerationError::MalformedResponse(
                    "missing output.choices[0].image_base64".into(),
                )
            })?;

        Ok(format!("{DATA_URI_PREFIX}{image_b64}"))
    }
}
