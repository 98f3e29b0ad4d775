//! SQLite database layer for ChatList.
//!
//! Provides persistent storage for:
//! - Prompts (the user's saved prompt library)
//! - Models (request targets with provider and credential reference)
//! - Results (persisted responses from past fan-out requests)
//! - Settings (app preferences)

mod migrations;

use rusqlite::{params, params_from_iter, types::ToSql, Connection};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{ModelConfig, Provider};

/// A saved prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPrompt {
    pub id: i64,
    pub text: String,
    /// Comma-separated tags.
    pub tags: String,
    /// Unix timestamp.
    pub created_at: i64,
    /// Unix timestamp.
    pub updated_at: i64,
}

/// A persisted response row.
///
/// `prompt_id` and `model_id` are soft references - deleting the prompt or
/// model keeps the result row with the reference nulled out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResult {
    pub id: i64,
    pub prompt_id: Option<i64>,
    pub prompt_text: String,
    pub model_id: Option<i64>,
    pub model_name: String,
    pub response: String,
    pub tokens: i64,
    /// Unix timestamp.
    pub created_at: i64,
}

/// Database connection wrapper.
///
/// Provides a high-level API for interacting with the SQLite database.
/// Automatically handles connection setup, migrations, and file permissions.
pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    /// Open the database at the default location.
    ///
    /// Default path: `~/.local/share/chatlist/chatlist.db`
    pub fn open() -> anyhow::Result<Self> {
        let path = Self::default_path()?;
        Self::open_at(path)
    }

    /// Open the database at a specific path.
    ///
    /// Creates parent directories if they don't exist.
    /// Sets file permissions to 0600 on Unix.
    pub fn open_at(path: PathBuf) -> anyhow::Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
            {
                tracing::warn!(path = %path.display(), error = %e, "Failed to set database file permissions");
            }
        }

        // Enable foreign keys for referential integrity
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self { conn, path })
    }

    /// Get the default database path.
    ///
    /// Returns `~/.local/share/chatlist/chatlist.db` (or platform equivalent).
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

        Ok(data_dir.join("chatlist").join("chatlist.db"))
    }

    /// Run database migrations.
    ///
    /// Safe to call multiple times - migrations are tracked and only run once.
    pub fn migrate(&self) -> anyhow::Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get a reference to the underlying connection.
    ///
    /// Use sparingly - prefer the high-level methods when possible.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Get the database file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    // =========================================================================
    // Prompts
    // =========================================================================

    /// Add a new prompt. Returns the id of the created row.
    pub fn add_prompt(&self, text: &str, tags: &str) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO prompts (text, tags) VALUES (?, ?)",
            [text, tags],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List prompts, newest first.
    ///
    /// A non-empty `search` filters on prompt text and tags (substring match).
    pub fn get_prompts(
        &self,
        search: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<StoredPrompt>, rusqlite::Error> {
        let map_row = |row: &rusqlite::Row<'_>| {
            Ok(StoredPrompt {
                id: row.get(0)?,
                text: row.get(1)?,
                tags: row.get(2)?,
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
            })
        };

        if search.is_empty() {
            let mut stmt = self.conn.prepare(
                "SELECT id, text, tags, created_at, updated_at FROM prompts
                 ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )?;
            let rows = stmt.query_map(params![limit, offset], map_row)?;
            rows.collect()
        } else {
            let pattern = format!("%{}%", search);
            let mut stmt = self.conn.prepare(
                "SELECT id, text, tags, created_at, updated_at FROM prompts
                 WHERE text LIKE ? OR tags LIKE ?
                 ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )?;
            let rows = stmt.query_map(params![pattern, pattern, limit, offset], map_row)?;
            rows.collect()
        }
    }

    /// Get a prompt by id. Returns `None` if it doesn't exist.
    pub fn get_prompt(&self, id: i64) -> Result<Option<StoredPrompt>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, text, tags, created_at, updated_at FROM prompts WHERE id = ?",
        )?;
        let result = stmt.query_row([id], |row| {
            Ok(StoredPrompt {
                id: row.get(0)?,
                text: row.get(1)?,
                tags: row.get(2)?,
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
            })
        });
        match result {
            Ok(prompt) => Ok(Some(prompt)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Update a prompt. Returns `false` if the id doesn't exist.
    pub fn update_prompt(&self, id: i64, text: &str, tags: &str) -> Result<bool, rusqlite::Error> {
        let changed = self.conn.execute(
            "UPDATE prompts SET text = ?, tags = ?, updated_at = unixepoch() WHERE id = ?",
            params![text, tags, id],
        )?;
        Ok(changed > 0)
    }

    /// Delete a prompt. Returns `false` if the id doesn't exist.
    pub fn delete_prompt(&self, id: i64) -> Result<bool, rusqlite::Error> {
        let changed = self.conn.execute("DELETE FROM prompts WHERE id = ?", [id])?;
        Ok(changed > 0)
    }

    // =========================================================================
    // Models
    // =========================================================================

    /// Add a model configuration. Returns the id of the created row.
    ///
    /// The `id` field of the input config is ignored.
    pub fn add_model(&self, config: &ModelConfig) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO models (name, provider, api_url, api_key_env, model_id, is_active)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                config.name,
                config.provider.to_string(),
                config.api_url,
                config.api_key_env,
                config.model_id,
                config.is_active as i64,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List model configurations, sorted by name.
    pub fn get_models(&self, active_only: bool) -> Result<Vec<ModelConfig>, rusqlite::Error> {
        let sql = if active_only {
            "SELECT id, name, provider, api_url, api_key_env, model_id, is_active
             FROM models WHERE is_active = 1 ORDER BY name"
        } else {
            "SELECT id, name, provider, api_url, api_key_env, model_id, is_active
             FROM models ORDER BY name"
        };
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], Self::map_model_row)?;
        rows.collect()
    }

    /// Get a model configuration by id. Returns `None` if it doesn't exist.
    pub fn get_model(&self, id: i64) -> Result<Option<ModelConfig>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, provider, api_url, api_key_env, model_id, is_active
             FROM models WHERE id = ?",
        )?;
        let result = stmt.query_row([id], Self::map_model_row);
        match result {
            Ok(model) => Ok(Some(model)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Update a model configuration by its `id` field.
    ///
    /// Returns `false` if the id doesn't exist.
    pub fn update_model(&self, config: &ModelConfig) -> Result<bool, rusqlite::Error> {
        let changed = self.conn.execute(
            "UPDATE models
             SET name = ?, provider = ?, api_url = ?, api_key_env = ?, model_id = ?, is_active = ?
             WHERE id = ?",
            params![
                config.name,
                config.provider.to_string(),
                config.api_url,
                config.api_key_env,
                config.model_id,
                config.is_active as i64,
                config.id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Flip a model's active flag. Returns `false` if the id doesn't exist.
    pub fn toggle_model_active(&self, id: i64) -> Result<bool, rusqlite::Error> {
        let changed = self.conn.execute(
            "UPDATE models SET is_active = NOT is_active WHERE id = ?",
            [id],
        )?;
        Ok(changed > 0)
    }

    /// Delete a model. Returns `false` if the id doesn't exist.
    pub fn delete_model(&self, id: i64) -> Result<bool, rusqlite::Error> {
        let changed = self.conn.execute("DELETE FROM models WHERE id = ?", [id])?;
        Ok(changed > 0)
    }

    fn map_model_row(row: &rusqlite::Row<'_>) -> Result<ModelConfig, rusqlite::Error> {
        let provider_str: String = row.get(2)?;
        Ok(ModelConfig {
            id: row.get(0)?,
            name: row.get(1)?,
            provider: Provider::parse_lossy(&provider_str),
            api_url: row.get(3)?,
            api_key_env: row.get(4)?,
            model_id: row.get(5)?,
            is_active: row.get::<_, i64>(6)? != 0,
        })
    }

    // =========================================================================
    // Results
    // =========================================================================

    /// Save one response row. Returns the id of the created row.
    pub fn save_result(
        &self,
        prompt_id: Option<i64>,
        prompt_text: &str,
        model_id: Option<i64>,
        model_name: &str,
        response: &str,
        tokens: i64,
    ) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO results (prompt_id, prompt_text, model_id, model_name, response, tokens)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![prompt_id, prompt_text, model_id, model_name, response, tokens],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List persisted results, newest first.
    ///
    /// A non-empty `search` filters on prompt text, response, and model name;
    /// `model_id` additionally restricts to one model.
    pub fn get_results(
        &self,
        search: &str,
        model_id: Option<i64>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<StoredResult>, rusqlite::Error> {
        let mut sql = String::from(
            "SELECT id, prompt_id, prompt_text, model_id, model_name, response, tokens, created_at
             FROM results WHERE 1=1",
        );
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if !search.is_empty() {
            sql.push_str(" AND (prompt_text LIKE ? OR response LIKE ? OR model_name LIKE ?)");
            let pattern = format!("%{}%", search);
            params.push(Box::new(pattern.clone()));
            params.push(Box::new(pattern.clone()));
            params.push(Box::new(pattern));
        }

        if let Some(model_id) = model_id {
            sql.push_str(" AND model_id = ?");
            params.push(Box::new(model_id));
        }

        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");
        params.push(Box::new(limit as i64));
        params.push(Box::new(offset as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), Self::map_result_row)?;
        rows.collect()
    }

    /// Get a result by id. Returns `None` if it doesn't exist.
    pub fn get_result(&self, id: i64) -> Result<Option<StoredResult>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, prompt_id, prompt_text, model_id, model_name, response, tokens, created_at
             FROM results WHERE id = ?",
        )?;
        let result = stmt.query_row([id], Self::map_result_row);
        match result {
            Ok(row) => Ok(Some(row)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete a result. Returns `false` if the id doesn't exist.
    pub fn delete_result(&self, id: i64) -> Result<bool, rusqlite::Error> {
        let changed = self.conn.execute("DELETE FROM results WHERE id = ?", [id])?;
        Ok(changed > 0)
    }

    fn map_result_row(row: &rusqlite::Row<'_>) -> Result<StoredResult, rusqlite::Error> {
        Ok(StoredResult {
            id: row.get(0)?,
            prompt_id: row.get(1)?,
            prompt_text: row.get(2)?,
            model_id: row.get(3)?,
            model_name: row.get(4)?,
            response: row.get(5)?,
            tokens: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    // =========================================================================
    // Settings Storage
    // =========================================================================

    /// Save a setting to the database (upsert).
    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, unixepoch())
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            [key, value],
        )?;
        Ok(())
    }

    /// Get a setting from the database.
    ///
    /// Returns `None` if the setting doesn't exist.
    pub fn get_setting(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM settings WHERE key = ?")?;
        let result = stmt.query_row([key], |row| row.get(0));
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get a setting with a default value.
    ///
    /// Returns the default if the setting doesn't exist or on error.
    pub fn get_setting_or(&self, key: &str, default: &str) -> String {
        self.get_setting(key)
            .ok()
            .flatten()
            .unwrap_or_else(|| default.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================
