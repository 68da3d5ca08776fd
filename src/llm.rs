//! LLM call: text in, text out.
//!
//! [`OpenAiCompatClient`] talks to any endpoint exposing `/chat/completions`
//! (OpenAI, OpenRouter, Ollama, vLLM). Failures are returned as-is; there is no
//! retry at this layer.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::brief::prompt::Prompt;
use crate::config::LlmConfig;
use crate::error::BriefError;

/// A chat model that turns a system + user message into one reply.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn model_name(&self) -> &str;

    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Run a rendered prompt through `model`. Any failure is the LLM stage's.
pub async fn generate(model: &dyn LanguageModel, prompt: &Prompt) -> Result<String, BriefError> {
    tracing::info!(model = model.model_name(), "generating brief");
    model
        .complete(&prompt.system, &prompt.user)
        .await
        .map_err(|e| BriefError::Llm(format!("{e:#}")))
}

pub struct OpenAiCompatClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: Option<u32>,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    /// Build a client from `[llm]` config. The API key is read from the
    /// environment variable named by `api_key_env`; local endpoints may run
    /// without one.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            warn!(env = %config.api_key_env, "no API key set, sending unauthenticated requests");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn request_body(&self, system: &str, user: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": self.temperature,
            "stream": false,
        });
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        body
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, %url, "sending completion request");

        let mut request = self.client.post(&url).json(&self.request_body(system, user));
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("HTTP request failed for {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("model endpoint returned HTTP {status}: {body}");
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("failed to parse completion response")?;
        extract_text(parsed)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_text(response: ChatResponse) -> Result<String> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|t| t.trim().to_string())
        .unwrap_or_default();
    anyhow::ensure!(!text.is_empty(), "no text in completion response");
    Ok(text)
}
