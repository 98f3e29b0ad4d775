//! OpenRouter API client (https://openrouter.ai/).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{http_error, text_at, tokens_at, transport_error, ProviderClient, Reply, SendError};
use crate::config::DEFAULT_MAX_TOKENS;
use crate::models::ModelConfig;

/// App identification headers requested by OpenRouter.
const REFERER: &str = "https://github.com/chatlist";
const TITLE: &str = "ChatList";

/// Client for the OpenRouter aggregator.
///
/// Speaks the OpenAI chat-completions wire format with extra identifying
/// headers and the `/chat/completions` path.
pub struct OpenRouterClient {
    api_url: String,
    api_key: String,
    model_id: String,
}

impl OpenRouterClient {
    pub fn new(config: &ModelConfig, api_key: String) -> Self {
        Self {
            api_url: config.api_url.clone(),
            api_key,
            model_id: config.model_id.clone(),
        }
    }
}

#[async_trait]
impl ProviderClient for OpenRouterClient {
    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn send(&self, prompt: &str, timeout: Duration) -> Result<Reply, SendError> {
        if !self.is_configured() {
            return Err(SendError::NotConfigured);
        }

        let body = json!({
            "model": self.model_id,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": DEFAULT_MAX_TOKENS,
        });

        let response = reqwest::Client::new()
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", TITLE)
            .json(&body)
            .timeout(timeout)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(http_error(response).await);
        }

        let value: Value = response.json().await.map_err(transport_error)?;
        let content = text_at(&value, "/choices/0/message/content")?;
        let tokens = tokens_at(&value, "/usage/total_tokens");

        Ok(Reply { content, tokens })
    }
}

// =============================================================================
// Tests
// =============================================================================
