//! Google Gemini generateContent API client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{http_error, text_at, tokens_at, transport_error, ProviderClient, Reply, SendError};
use crate::models::ModelConfig;

/// Client for the Google Gemini API.
///
/// Unlike the other providers, Gemini authenticates with the API key as a
/// query parameter rather than a header.
pub struct GoogleClient {
    api_url: String,
    api_key: String,
    model_id: String,
}

impl GoogleClient {
    pub fn new(config: &ModelConfig, api_key: String) -> Self {
        Self {
            api_url: config.api_url.clone(),
            api_key,
            model_id: config.model_id.clone(),
        }
    }
}

#[async_trait]
impl ProviderClient for GoogleClient {
    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn send(&self, prompt: &str, timeout: Duration) -> Result<Reply, SendError> {
        if !self.is_configured() {
            return Err(SendError::NotConfigured);
        }

        let url = format!("{}/models/{}:generateContent", self.api_url, self.model_id);
        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
        });

        let response = reqwest::Client::new()
            .post(url)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .timeout(timeout)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(http_error(response).await);
        }

        let value: Value = response.json().await.map_err(transport_error)?;
        let content = text_at(&value, "/candidates/0/content/parts/0/text")?;
        let tokens = tokens_at(&value, "/usageMetadata/totalTokenCount");

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
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: String, api_key: &str) -> GoogleClient {
        let config = ModelConfig {
            name: "Gemini 1.5 Pro".to_string(),
            api_url: base_url,
            api_key_env: "GOOGLE_API_KEY".to_string(),
            model_id: "gemini-1.5-pro".to_string(),
            ..Default::default()
        };
        GoogleClient::new(&config, api_key.to_string())
    }

    #[tokio::test]
    async fn test_send_success_uses_key_query_param() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-pro:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"parts": [{"text": "Say hi"}]}],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "hi"}]}}],
                "usageMetadata": {"totalTokenCount": 11},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(server.uri(), "test-key")
            .send("Say hi", Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(reply.content, "hi");
        assert_eq!(reply.tokens, 11);
    }

    #[tokio::test]
    async fn test_send_missing_usage_metadata_defaults_to_zero() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "hi"}]}}],
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
    async fn test_send_http_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": {"message": "API key not valid"}})),
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
                status: 400,
                message: "API key not valid".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_send_missing_candidates_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = client(server.uri(), "test-key")
            .send("Say hi", Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, SendError::Transport(_)));
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
