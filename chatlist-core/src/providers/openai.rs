//! OpenAI-compatible chat API client (OpenAI, DeepSeek, Groq, Together, ...).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{http_error, text_at, tokens_at, transport_error, ProviderClient, Reply, SendError};
use crate::config::DEFAULT_MAX_TOKENS;
use crate::models::ModelConfig;

/// Client for APIs speaking the OpenAI chat-completions wire format.
pub struct OpenAiClient {
    api_url: String,
    api_key: String,
    model_id: String,
}

impl OpenAiClient {
    pub fn new(config: &ModelConfig, api_key: String) -> Self {
        Self {
            api_url: config.api_url.clone(),
            api_key,
            model_id: config.model_id.clone(),
        }
    }
}

#[async_trait]
impl ProviderClient for OpenAiClient {
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
            .post(format!("{}/completions", self.api_url))
            .bearer_auth(&self.api_key)
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: String, api_key: &str) -> OpenAiClient {
        let config = ModelConfig {
            name: "GPT-4o".to_string(),
            api_url: base_url,
            api_key_env: "OPENAI_API_KEY".to_string(),
            model_id: "gpt-4o".to_string(),
            ..Default::default()
        };
        OpenAiClient::new(&config, api_key.to_string())
    }

    #[tokio::test]
    async fn test_send_success_extracts_content_and_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "gpt-4o",
                "messages": [{"role": "user", "content": "Say hi"}],
                "max_tokens": 4096,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "hi"}}],
                "usage": {"total_tokens": 7},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(server.uri(), "test-key")
            .send("Say hi", Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(reply.content, "hi");
        assert_eq!(reply.tokens, 7);
    }

    #[tokio::test]
    async fn test_send_missing_usage_defaults_to_zero_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "hi"}}],
            })))
            .mount(&server)
            .await;

        let reply = client(server.uri(), "test-key")
            .send("Say hi", Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(reply.tokens, 0);
    }

    #[tokio::test]
    async fn test_send_http_error_uses_json_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"error": {"message": "boom"}})),
            )
            .mount(&server)
            .await;

        let err = client(server.uri(), "test-key")
            .send("Say hi", Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SendError::Http {
                status: 500,
                message: "boom".to_string()
            }
        );
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_send_http_error_truncates_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("x".repeat(500)))
            .mount(&server)
            .await;

        let err = client(server.uri(), "test-key")
            .send("Say hi", Duration::from_secs(5))
            .await
            .unwrap_err();

        match err {
            SendError::Http { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message.len(), 200);
            }
            other => panic!("expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_malformed_body_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client(server.uri(), "test-key")
            .send("Say hi", Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, SendError::Transport(_)));
    }

    #[tokio::test]
    async fn test_send_slow_response_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": [{"message": {"content": "late"}}]}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = client(server.uri(), "test-key")
            .send("Say hi", Duration::from_millis(50))
            .await
            .unwrap_err();

        assert_eq!(err, SendError::Timeout);
    }

    #[tokio::test]
    async fn test_send_unconfigured_makes_no_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(server.uri(), "")
            .send("Say hi", Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err, SendError::NotConfigured);
        server.verify().await;
    }
}
