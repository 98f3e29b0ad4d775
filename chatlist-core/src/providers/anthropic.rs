//! Anthropic Messages API client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{http_error, text_at, tokens_at, transport_error, ProviderClient, Reply, SendError};
use crate::config::DEFAULT_MAX_TOKENS;
use crate::models::ModelConfig;

/// Messages API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API.
pub struct AnthropicClient {
    api_url: String,
    api_key: String,
    model_id: String,
}

impl AnthropicClient {
    pub fn new(config: &ModelConfig, api_key: String) -> Self {
        Self {
            api_url: config.api_url.clone(),
            api_key,
            model_id: config.model_id.clone(),
        }
    }
}

#[async_trait]
impl ProviderClient for AnthropicClient {
    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn send(&self, prompt: &str, timeout: Duration) -> Result<Reply, SendError> {
        if !self.is_configured() {
            return Err(SendError::NotConfigured);
        }

        let body = json!({
            "model": self.model_id,
            "max_tokens": DEFAULT_MAX_TOKENS,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = reqwest::Client::new()
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .timeout(timeout)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(http_error(response).await);
        }

        let value: Value = response.json().await.map_err(transport_error)?;
        let content = text_at(&value, "/content/0/text")?;
        // Anthropic reports input and output usage separately
        let tokens = tokens_at(&value, "/usage/input_tokens") + tokens_at(&value, "/usage/output_tokens");

        Ok(Reply { content, tokens })
    }
}

// =============================================================================
// Tests
// =============================================================================
