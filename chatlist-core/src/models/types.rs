//! Core model type definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while working with model configurations.
#[derive(Debug, Error)]
pub enum ModelConfigError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Model not found: {0}")]
    ModelNotFound(i64),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("API key {0} is not set in the environment")]
    MissingCredential(String),
}

/// Supported provider API families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI-compatible chat API (OpenAI, DeepSeek, Groq, Together, ...)
    #[default]
    OpenAi,
    /// Anthropic Messages API
    Anthropic,
    /// Google Gemini generateContent API
    Google,
    /// OpenRouter aggregator (OpenAI-compatible wire format)
    OpenRouter,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "openai"),
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::Google => write!(f, "google"),
            Provider::OpenRouter => write!(f, "openrouter"),
        }
    }
}

impl Provider {
    /// Get all supported providers.
    pub fn all() -> &'static [Provider] {
        &[
            Self::OpenAi,
            Self::Anthropic,
            Self::Google,
            Self::OpenRouter,
        ]
    }

    /// Parse from a stored string.
    ///
    /// Unrecognized values fall back to the OpenAI-compatible provider so that
    /// rows written by older versions keep working; the fallback is logged
    /// because it can also hide a typo in a hand-edited configuration.
    pub fn parse_lossy(s: &str) -> Self {
        match s {
            "openai" => Provider::OpenAi,
            "anthropic" => Provider::Anthropic,
            "google" | "gemini" => Provider::Google,
            "openrouter" => Provider::OpenRouter,
            other => {
                tracing::warn!(
                    provider = %other,
                    "Unknown provider, falling back to the OpenAI-compatible client"
                );
                Provider::OpenAi
            }
        }
    }
}
