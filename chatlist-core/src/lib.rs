//! ChatList Core Library
//!
//! This crate provides the core functionality for ChatList, a desktop tool
//! that sends one prompt to many LLM APIs at once and compares the answers.
//! It includes:
//!
//! - Model registry for storing model configurations
//! - Provider adapters (OpenAI-compatible, Anthropic, Google, OpenRouter)
//! - Concurrent fan-out dispatch with per-call timeout and panic isolation
//! - Database layer for prompts, models, results, and settings
//! - Session store with per-row selection for persisting results
//! - Prompt improvement via a single model call
//! - Markdown and JSON export of result history

pub mod config;
pub mod credentials;
pub mod db;
pub mod dispatch;
pub mod export;
pub mod improve;
pub mod logging;
pub mod models;
pub mod providers;
pub mod store;

// Re-exports for convenience
pub use config::{Settings, DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT_SECS};
pub use db::{Database, StoredPrompt, StoredResult};

// Re-export models
pub use models::{ModelConfig, ModelConfigError, ModelRegistry, Provider};

// Re-export the fan-out core
pub use dispatch::{dispatch, dispatch_blocking, dispatch_clients, CallOutcome};

// Re-export provider adapters
pub use providers::{
    client_for, AnthropicClient, GoogleClient, OpenAiClient, OpenRouterClient, ProviderClient,
    Reply, SendError,
};

// Re-export the session store
pub use store::{ResultsStore, SessionResult};

// Re-export prompt improvement
pub use improve::{extract_improved, improve_prompt};

// Re-export export helpers
pub use export::{export_json, export_markdown};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn exports_are_accessible() {
        // Verify all public types are accessible
        fn _check_types(
            _db: &Database,
            _settings: &Settings,
            _config: &ModelConfig,
            _registry: &ModelRegistry,
            _provider: Provider,
            _outcome: &CallOutcome,
            _reply: &Reply,
            _error: &SendError,
            _store: &ResultsStore,
            _row: &SessionResult,
            _prompt: &StoredPrompt,
            _result: &StoredResult,
        ) {
        }
    }
}
