//! Language-model client for the Anthropic messages API

use crate::config::AnthropicConfig;
use crate::error::{NovaMindError, Result};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::json;
use std::sync::Arc;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// One prompt/response exchange with a language model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            temperature,
        }
    }
}

/// Text completion seam. Production uses `AnthropicClient`; tests script replies.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send a single user prompt and return the reply text
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// How a component reaches the language model, chosen once at construction
#[derive(Clone)]
pub enum ModelAccess {
    Live(Arc<dyn LanguageModel>),
    /// No credential: deterministic canned output
    Canned,
}

impl std::fmt::Debug for ModelAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelAccess::Live(_) => f.write_str("ModelAccess::Live"),
            ModelAccess::Canned => f.write_str("ModelAccess::Canned"),
        }
    }
}

pub struct AnthropicClient {
    config: AnthropicConfig,
    http_client: HttpClient,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(NovaMindError::Config("Anthropic API key is required".to_string()));
        }

        // No request timeout: long generations block until the API answers
        let http_client = HttpClient::builder()
            .build()
            .map_err(|e| NovaMindError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModel for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        log::debug!(
            "Anthropic request: model={} max_tokens={} temperature={}",
            self.config.model, request.max_tokens, request.temperature
        );

        let response = self.http_client
            .post(self.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": self.config.model,
                "max_tokens": request.max_tokens,
                "temperature": request.temperature,
                "messages": [
                    {
                        "role": "user",
                        "content": request.prompt
                    }
                ]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NovaMindError::LanguageModel(
                format!("Anthropic API returned {}: {}", status, error_text)
            ));
        }

        let result: serde_json::Value = response.json().await?;
        extract_reply_text(&result)
    }
}

/// Pull the first text block out of a messages API response body
fn extract_reply_text(body: &serde_json::Value) -> Result<String> {
    body["content"][0]["text"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| NovaMindError::LanguageModel("No text content in Anthropic response".to_string()))
}
