//! Provider adapters for the supported LLM APIs.
//!
//! Each adapter translates the uniform `{prompt, timeout}` call into one
//! vendor's wire format and normalizes the response into a [`Reply`]. Every
//! failure mode is a [`SendError`] value - adapters never panic on a bad
//! response and never raise past the dispatch boundary.

mod anthropic;
mod google;
mod openai;
mod openrouter;

pub use anthropic::AnthropicClient;
pub use google::GoogleClient;
pub use openai::OpenAiClient;
pub use openrouter::OpenRouterClient;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::{ModelConfig, Provider};

/// How much of a non-JSON error body to keep in the error detail.
const BODY_PREVIEW_CHARS: usize = 200;

/// Why a single provider call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The referenced API key is absent; no network call was made.
    #[error("API key is not configured")]
    NotConfigured,
    /// No response within the timeout.
    #[error("Request timed out")]
    Timeout,
    /// Non-2xx status from the provider.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    /// Connection failure or a response body that doesn't match the
    /// provider's schema.
    #[error("{0}")]
    Transport(String),
}

/// Normalized successful response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// The generated text.
    pub content: String,
    /// Provider-reported token usage, 0 if the provider didn't report any.
    pub tokens: u32,
}

/// Capability contract every provider adapter implements.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// True iff the resolved credential is non-empty.
    ///
    /// An unconfigured client never issues a network call.
    fn is_configured(&self) -> bool;

    /// Issue exactly one HTTP call with the given prompt.
    async fn send(&self, prompt: &str, timeout: Duration) -> Result<Reply, SendError>;
}

/// Build the adapter for a model configuration.
///
/// The caller resolves the credential (see [`crate::credentials::resolve`])
/// and passes the key in; an empty key produces a client that reports
/// `is_configured() == false`.
pub fn client_for(model: &ModelConfig, api_key: String) -> Box<dyn ProviderClient> {
    match model.provider {
        Provider::OpenAi => Box::new(OpenAiClient::new(model, api_key)),
        Provider::Anthropic => Box::new(AnthropicClient::new(model, api_key)),
        Provider::Google => Box::new(GoogleClient::new(model, api_key)),
        Provider::OpenRouter => Box::new(OpenRouterClient::new(model, api_key)),
    }
}

// =============================================================================
// Shared wire helpers
// =============================================================================

/// Map a reqwest error to the failure taxonomy.
pub(crate) fn transport_error(e: reqwest::Error) -> SendError {
    if e.is_timeout() {
        SendError::Timeout
    } else {
        SendError::Transport(e.to_string())
    }
}

/// Build an [`SendError::Http`] from a non-2xx response.
///
/// Prefers the JSON `error.message` field when the body carries one, and
/// falls back to the first [`BODY_PREVIEW_CHARS`] characters of the raw body.
pub(crate) async fn http_error(response: reqwest::Response) -> SendError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(BODY_PREVIEW_CHARS).collect());

    SendError::Http { status, message }
}

/// Extract the response text at a JSON pointer.
///
/// A missing or non-string field is a `Transport` error, not a panic.
pub(crate) fn text_at(value: &Value, pointer: &str) -> Result<String, SendError> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| SendError::Transport(format!("Unexpected response shape: missing {pointer}")))
}

/// Extract a token count at a JSON pointer, defaulting to 0 when absent.
pub(crate) fn tokens_at(value: &Value, pointer: &str) -> u32 {
    value
        .pointer(pointer)
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model(provider: Provider) -> ModelConfig {
        ModelConfig {
            provider,
            name: "test".to_string(),
            api_url: "https://example.com".to_string(),
            api_key_env: "TEST_KEY".to_string(),
            model_id: "test-model".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_for_covers_every_provider() {
        for provider in Provider::all() {
            let client = client_for(&model(*provider), "key".to_string());
            assert!(client.is_configured());
        }
    }

    #[test]
    fn test_client_for_empty_key_is_unconfigured() {
        for provider in Provider::all() {
            let client = client_for(&model(*provider), String::new());
            assert!(!client.is_configured());
        }
    }

    #[test]
    fn test_text_at_missing_field_is_transport_error() {
        let value = json!({"choices": []});
        let err = text_at(&value, "/choices/0/message/content").unwrap_err();
        assert!(matches!(err, SendError::Transport(_)));
    }

    #[test]
    fn test_text_at_wrong_type_is_transport_error() {
        let value = json!({"content": 42});
        let err = text_at(&value, "/content").unwrap_err();
        assert!(matches!(err, SendError::Transport(_)));
    }

    #[test]
    fn test_tokens_at_defaults_to_zero() {
        let value = json!({});
        assert_eq!(tokens_at(&value, "/usage/total_tokens"), 0);

        let value = json!({"usage": {"total_tokens": 42}});
        assert_eq!(tokens_at(&value, "/usage/total_tokens"), 42);
    }

    #[test]
    fn test_send_error_display() {
        let err = SendError::Http {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
        assert_eq!(SendError::NotConfigured.to_string(), "API key is not configured");
    }
}
