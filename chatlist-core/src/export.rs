//! Export of persisted results to Markdown or JSON files.

use std::fmt::Write as _;
use std::path::Path;

use chrono::DateTime;
use tracing::info;

use crate::db::Database;

/// How many rows an export pulls at most.
const EXPORT_LIMIT: usize = 1000;

/// Export results matching `search` to a Markdown file.
///
/// Returns the number of exported rows; exporting nothing is an error so the
/// caller can tell the user instead of writing an empty file.
pub fn export_markdown(db: &Database, path: &Path, search: &str) -> anyhow::Result<usize> {
    let results = db.get_results(search, None, EXPORT_LIMIT, 0)?;
    anyhow::ensure!(!results.is_empty(), "No results to export");

    let mut out = String::from("# ChatList history\n\n");
    for result in &results {
        writeln!(
            out,
            "## {} - {}\n",
            result.model_name,
            format_timestamp(result.created_at)
        )?;
        writeln!(out, "**Prompt:** {}\n", result.prompt_text)?;
        writeln!(out, "**Response:**\n\n{}\n\n---\n", result.response)?;
    }

    std::fs::write(path, out)?;
    info!(path = %path.display(), count = results.len(), "Exported results to Markdown");
    Ok(results.len())
}

/// Export results matching `search` to a pretty-printed JSON file.
///
/// Returns the number of exported rows.
pub fn export_json(db: &Database, path: &Path, search: &str) -> anyhow::Result<usize> {
    let results = db.get_results(search, None, EXPORT_LIMIT, 0)?;
    anyhow::ensure!(!results.is_empty(), "No results to export");

    let json = serde_json::to_string_pretty(&results)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), count = results.len(), "Exported results to JSON");
    Ok(results.len())
}

fn format_timestamp(unix: i64) -> String {
    DateTime::from_timestamp(unix, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| unix.to_string())
}

// =============================================================================
// Tests
// =============================================================================
