//! Application settings for ChatList.
//!
//! Settings are persisted to the SQLite database as JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default response token budget.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Application settings - persisted to database as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Per-request timeout in seconds, applied uniformly to every model in a
    /// fan-out call. Valid range: 10-300.
    pub request_timeout_secs: u64,

    /// Response token budget shown in the settings UI. Valid range: 100-16000.
    pub max_tokens: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl Settings {
    /// Load settings from database, using defaults for missing values.
    ///
    /// If settings don't exist or can't be parsed, returns defaults.
    pub fn load(db: &crate::db::Database) -> Self {
        let mut settings = Self::default();

        if let Ok(Some(json)) = db.get_setting("settings") {
            match serde_json::from_str::<Settings>(&json) {
                Ok(loaded) => settings = loaded,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to parse settings, using defaults");
                }
            }
        }

        settings.validate();
        settings
    }

    /// Save settings to database.
    pub fn save(&self, db: &crate::db::Database) -> anyhow::Result<()> {
        let json = serde_json::to_string(self)?;
        db.set_setting("settings", &json)?;
        Ok(())
    }

    /// Clamp settings to valid ranges.
    pub fn validate(&mut self) {
        self.request_timeout_secs = self.request_timeout_secs.clamp(10, 300);
        self.max_tokens = self.max_tokens.clamp(100, 16_000);
    }

    /// The request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// =============================================================================
// Tests
// =============================================================================
