//! Boundary over the hosted vision and image-generation models. The
//! production implementation talks to an OpenAI-compatible API over HTTPS;
//! tests substitute a scripted backend.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

/// Error reported by the hosted service or the transport layer. `code` is
/// the service's machine-readable error code when one was returned.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct UpstreamError {
    pub code: Option<String>,
    pub message: String,
}

impl UpstreamError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Natural-language description of an uploaded portrait, if the model
    /// produced one.
    async fn describe_image(
        &self,
        mime_type: &str,
        image_bytes: &[u8],
        instructions: &str,
    ) -> Result<Option<String>, UpstreamError>;

    /// One square image for the prompt, returned as a URL if the service
    /// produced one.
    async fn generate_image(&self, prompt: &str) -> Result<Option<String>, UpstreamError>;
}

/// Deadline on every outbound call; expiry surfaces as a server error.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const VISION_MODEL: &str = "gpt-4o";
const IMAGE_MODEL: &str = "dall-e-3";
const DESCRIPTION_MAX_TOKENS: u32 = 300;

pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiBackend {
    pub fn new(api_key: String, base_url: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?;
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(api_key, base_url)
    }

    async fn post_json(&self, path: &str, payload: Value) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| UpstreamError::transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| UpstreamError::transport(e.to_string()))?;

        if !status.is_success() {
            let body: Option<Value> = serde_json::from_str(&text).ok();
            let error = body.as_ref().map(|b| &b["error"]);
            let code = error
                .and_then(|e| e["code"].as_str().or_else(|| e["type"].as_str()))
                .map(str::to_string);
            let message = error
                .and_then(|e| e["message"].as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("generation request failed with status {status}"));
            return Err(UpstreamError { code, message });
        }

        serde_json::from_str(&text).map_err(|e| UpstreamError::transport(e.to_string()))
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    async fn describe_image(
        &self,
        mime_type: &str,
        image_bytes: &[u8],
        instructions: &str,
    ) -> Result<Option<String>, UpstreamError> {
        let data_url = format!("data:{};base64,{}", mime_type, STANDARD.encode(image_bytes));
        let payload = json!({
            "model": VISION_MODEL,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": instructions },
                    { "type": "image_url", "image_url": { "url": data_url } }
                ]
            }],
            "max_tokens": DESCRIPTION_MAX_TOKENS
        });

        let body = self.post_json("/chat/completions", payload).await?;
        Ok(body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string))
    }

    async fn generate_image(&self, prompt: &str) -> Result<Option<String>, UpstreamError> {
        let payload = json!({
            "model": IMAGE_MODEL,
            "prompt": prompt,
            "n": 1,
            "size": "1024x1024",
            "response_format": "url"
        });

        let body = self.post_json("/images/generations", payload).await?;
        Ok(body["data"][0]["url"].as_str().map(str::to_string))
    }
}
