//! Webhook delivery: POSTs `{"text": "<brief>"}` as JSON.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use super::Channel;

pub struct WebhookChannel {
    url: String,
    client: reqwest::Client,
}

impl WebhookChannel {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

pub(crate) fn payload(text: &str) -> serde_json::Value {
    serde_json::json!({ "text": text })
}

#[async_trait]
impl Channel for WebhookChannel {
    fn name(&self) -> String {
        format!("webhook:{}", self.url)
    }

    async fn deliver(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&payload(text))
            .send()
            .await
            .with_context(|| format!("HTTP request failed for {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("webhook returned HTTP {status}: {body}");
        }
        Ok(())
    }
}
