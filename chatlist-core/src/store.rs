//! In-memory store for the current batch of results.
//!
//! Holds the outcomes of the most recent fan-out for the duration of a
//! session, with per-row selection so the user can pick which responses to
//! persist. Nothing here touches the database until `persist_selected`.

use crate::db::Database;
use crate::dispatch::CallOutcome;

/// One outcome plus its selection state.
#[derive(Debug, Clone)]
pub struct SessionResult {
    pub outcome: CallOutcome,
    pub selected: bool,
}

/// Session-scoped store for the latest batch.
#[derive(Debug, Default)]
pub struct ResultsStore {
    results: Vec<SessionResult>,
    current_prompt: String,
}

impl ResultsStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored batch with a fresh one, all rows deselected.
    pub fn set_results(&mut self, prompt: &str, outcomes: Vec<CallOutcome>) {
        self.current_prompt = prompt.to_string();
        self.results = outcomes
            .into_iter()
            .map(|outcome| SessionResult {
                outcome,
                selected: false,
            })
            .collect();
    }

    /// All rows, in dispatch order.
    pub fn results(&self) -> &[SessionResult] {
        &self.results
    }

    /// The prompt the current batch was produced from.
    pub fn current_prompt(&self) -> &str {
        &self.current_prompt
    }

    /// Flip the selection of one row. Out-of-range indices are ignored.
    pub fn toggle_selection(&mut self, index: usize) {
        if let Some(row) = self.results.get_mut(index) {
            row.selected = !row.selected;
        }
    }

    pub fn select_all(&mut self) {
        for row in &mut self.results {
            row.selected = true;
        }
    }

    pub fn deselect_all(&mut self) {
        for row in &mut self.results {
            row.selected = false;
        }
    }

    /// The currently selected rows, in dispatch order.
    pub fn selected(&self) -> Vec<&SessionResult> {
        self.results.iter().filter(|r| r.selected).collect()
    }

    pub fn clear(&mut self) {
        self.results.clear();
        self.current_prompt.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Persist the selected rows to the database.
    ///
    /// Returns the ids of the created result rows, in dispatch order.
    pub fn persist_selected(&self, db: &Database) -> Result<Vec<i64>, rusqlite::Error> {
        let mut ids = Vec::new();
        for row in self.results.iter().filter(|r| r.selected) {
            let outcome = &row.outcome;
            let model_id = (outcome.model_id > 0).then_some(outcome.model_id);
            let id = db.save_result(
                None,
                &outcome.prompt_text,
                model_id,
                &outcome.model_name,
                &outcome.response,
                outcome.tokens as i64,
            )?;
            ids.push(id);
        }
        Ok(ids)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn outcome(model_id: i64, name: &str, success: bool) -> CallOutcome {
        CallOutcome {
            model_id,
            model_name: name.to_string(),
            prompt_text: "Say hi".to_string(),
            response: if success { "hi".to_string() } else { String::new() },
            tokens: if success { 3 } else { 0 },
            success,
            error: (!success).then(|| "Request timed out".to_string()),
        }
    }

    fn setup_test_db() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open_at(temp_dir.path().join("test.db")).unwrap();
        db.migrate().unwrap();
        (temp_dir, db)
    }

    #[test]
    fn test_set_results_resets_selection_and_prompt() {
        let mut store = ResultsStore::new();
        store.set_results("Say hi", vec![outcome(1, "A", true)]);
        store.select_all();

        store.set_results("Other prompt", vec![outcome(2, "B", true)]);

        assert_eq!(store.current_prompt(), "Other prompt");
        assert_eq!(store.results().len(), 1);
        assert!(store.selected().is_empty());
    }

    #[test]
    fn test_toggle_selection() {
        let mut store = ResultsStore::new();
        store.set_results("p", vec![outcome(1, "A", true), outcome(2, "B", true)]);

        store.toggle_selection(1);
        assert!(!store.results()[0].selected);
        assert!(store.results()[1].selected);

        store.toggle_selection(1);
        assert!(!store.results()[1].selected);

        // Out of range is a no-op
        store.toggle_selection(99);
    }

    #[test]
    fn test_select_and_deselect_all() {
        let mut store = ResultsStore::new();
        store.set_results("p", vec![outcome(1, "A", true), outcome(2, "B", false)]);

        store.select_all();
        assert_eq!(store.selected().len(), 2);

        store.deselect_all();
        assert!(store.selected().is_empty());
    }

    #[test]
    fn test_clear() {
        let mut store = ResultsStore::new();
        store.set_results("p", vec![outcome(1, "A", true)]);
        assert!(!store.is_empty());

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.current_prompt(), "");
    }

    #[test]
    fn test_persist_selected_writes_only_selected_rows() {
        let (_temp, db) = setup_test_db();
        let mut store = ResultsStore::new();
        store.set_results("Say hi", vec![outcome(0, "A", true), outcome(0, "B", true)]);
        store.toggle_selection(1);

        let ids = store.persist_selected(&db).unwrap();
        assert_eq!(ids.len(), 1);

        let stored = db.get_results("", None, 10, 0).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].model_name, "B");
        // Session outcomes with no db-backed model keep a null reference
        assert!(stored[0].model_id.is_none());
    }
}
