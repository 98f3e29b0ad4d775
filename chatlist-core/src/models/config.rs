//! Model configuration struct.

use serde::{Deserialize, Serialize};

use super::types::Provider;

/// Configuration for one request target.
///
/// A row in the `models` table: which vendor API to call, where, with which
/// credential, and which vendor model to ask for. The `api_key_env` field
/// names an environment variable - the secret itself is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Database id (0 for configs not yet saved).
    #[serde(default)]
    pub id: i64,
    /// Display name (e.g., "GPT-4o"). Not required to be unique.
    pub name: String,
    /// Provider API family.
    #[serde(default)]
    pub provider: Provider,
    /// Base URL of the API endpoint (without the provider-specific suffix).
    pub api_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Provider-specific model identifier (e.g., "gpt-4o").
    pub model_id: String,
    /// Whether this model participates in fan-out requests.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            provider: Provider::OpenAi,
            api_url: String::new(),
            api_key_env: String::new(),
            model_id: String::new(),
            is_active: true,
        }
    }
}
