//! Model registry for loading and validating model configurations.

use tracing::debug;

use crate::credentials;
use crate::db::Database;

use super::config::ModelConfig;
use super::types::{ModelConfigError, Provider};

/// Registry of model configurations loaded from the database.
///
/// Holds the ordered list the dispatcher consumes. Loading with
/// `active_only = true` gives exactly the set that participates in a
/// fan-out request.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Vec<ModelConfig>,
}

impl ModelRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load models from the database, sorted by name.
    pub fn load_from_db(db: &Database, active_only: bool) -> Result<Self, ModelConfigError> {
        let models = db
            .get_models(active_only)
            .map_err(|e| ModelConfigError::Database(e.to_string()))?;

        debug!(
            total_models = models.len(),
            active_only, "ModelRegistry loaded from database"
        );

        Ok(Self { models })
    }

    /// The loaded configurations, in load order.
    pub fn models(&self) -> &[ModelConfig] {
        &self.models
    }

    /// Look up a loaded model by database id.
    pub fn get(&self, id: i64) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Check that a configuration is complete and its credential resolves.
    ///
    /// A missing credential is a validation error here, even though at
    /// dispatch time it only produces a per-model `NotConfigured` outcome -
    /// the configuration UI wants to warn up front.
    pub fn validate(config: &ModelConfig) -> Result<(), ModelConfigError> {
        if config.name.is_empty() {
            return Err(ModelConfigError::MissingField("name"));
        }
        if config.api_url.is_empty() {
            return Err(ModelConfigError::MissingField("api_url"));
        }
        if config.api_key_env.is_empty() {
            return Err(ModelConfigError::MissingField("api_key_env"));
        }
        if config.model_id.is_empty() {
            return Err(ModelConfigError::MissingField("model_id"));
        }
        if !credentials::is_configured(&config.api_key_env) {
            return Err(ModelConfigError::MissingCredential(
                config.api_key_env.clone(),
            ));
        }
        Ok(())
    }

    /// Seed the database with a starter catalog of well-known models.
    ///
    /// Models are matched by name; existing entries are left untouched. New
    /// entries are inserted inactive so the user opts in explicitly.
    /// Returns the number of models added.
    pub fn add_default_models(db: &Database) -> Result<usize, ModelConfigError> {
        let existing: Vec<String> = db
            .get_models(false)
            .map_err(|e| ModelConfigError::Database(e.to_string()))?
            .into_iter()
            .map(|m| m.name)
            .collect();

        let mut added = 0;
        for model in Self::default_catalog() {
            if !existing.contains(&model.name) {
                db.add_model(&model)
                    .map_err(|e| ModelConfigError::Database(e.to_string()))?;
                added += 1;
            }
        }

        debug!(added, "Seeded default models");
        Ok(added)
    }

    /// The starter catalog.
    fn default_catalog() -> Vec<ModelConfig> {
        let entry = |name: &str, provider: Provider, api_url: &str, key: &str, model: &str| {
            ModelConfig {
                id: 0,
                name: name.to_string(),
                provider,
                api_url: api_url.to_string(),
                api_key_env: key.to_string(),
                model_id: model.to_string(),
                is_active: false,
            }
        };

        vec![
            entry(
                "GPT-4o",
                Provider::OpenAi,
                "https://api.openai.com/v1/chat",
                "OPENAI_API_KEY",
                "gpt-4o",
            ),
            entry(
                "GPT-4o-mini",
                Provider::OpenAi,
                "https://api.openai.com/v1/chat",
                "OPENAI_API_KEY",
                "gpt-4o-mini",
            ),
            entry(
                "Claude 3.5 Sonnet",
                Provider::Anthropic,
                "https://api.anthropic.com/v1/messages",
                "ANTHROPIC_API_KEY",
                "claude-3-5-sonnet-20241022",
            ),
            entry(
                "DeepSeek Chat",
                Provider::OpenAi,
                "https://api.deepseek.com/v1/chat",
                "DEEPSEEK_API_KEY",
                "deepseek-chat",
            ),
            entry(
                "Groq Llama 3.1 70B",
                Provider::OpenAi,
                "https://api.groq.com/openai/v1/chat",
                "GROQ_API_KEY",
                "llama-3.1-70b-versatile",
            ),
            entry(
                "Gemini 1.5 Pro",
                Provider::Google,
                "https://generativelanguage.googleapis.com/v1beta",
                "GOOGLE_API_KEY",
                "gemini-1.5-pro",
            ),
        ]
    }
}

// =============================================================================
// Tests
// =============================================================================
