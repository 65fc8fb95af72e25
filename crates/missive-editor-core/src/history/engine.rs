use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

use super::locator::SelectionLocator;

/// Default number of snapshots kept.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Capacity floor. With fewer than two entries drift capture could evict the
/// entry it is about to restore.
pub const MIN_ENTRIES: usize = 2;

/// One recorded state of the editing surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub html: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionLocator>,
}

impl HistoryEntry {
    pub fn new(html: impl Into<String>, selection: Option<SelectionLocator>) -> Self {
        Self {
            html: html.into(),
            timestamp: now_millis(),
            selection,
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

/// Bounded, linear snapshot history with a movable pointer.
///
/// Pure data: callers pass the live html and selection in, and get the entry
/// to restore back. [`HistoryController`](super::HistoryController) binds it
/// to an editing surface.
///
/// Invariants: there is always at least one entry, `current_index` is in
/// bounds, and `entries().len() <= max_entries()`.
#[derive(Debug, Clone)]
pub struct EditorHistory {
    entries: Vec<HistoryEntry>,
    current_index: usize,
    max_entries: usize,
}

impl Default for EditorHistory {
    fn default() -> Self {
        Self::new("")
    }
}

impl EditorHistory {
    /// Start a history seeded with the surface's initial content.
    pub fn new(initial_html: impl Into<String>) -> Self {
        Self::with_max_entries(initial_html, DEFAULT_MAX_ENTRIES)
    }

    /// Like [`new`](Self::new) with a custom capacity, clamped to
    /// [`MIN_ENTRIES`].
    pub fn with_max_entries(initial_html: impl Into<String>, max_entries: usize) -> Self {
        Self {
            entries: vec![HistoryEntry::new(initial_html, None)],
            current_index: 0,
            max_entries: max_entries.max(MIN_ENTRIES),
        }
    }

    pub fn current_state(&self) -> &HistoryEntry {
        &self.entries[self.current_index]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Number of recorded entries. Never zero.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current_index + 1 < self.entries.len()
    }

    /// Whether the live content differs from the entry under the pointer.
    pub fn has_drift(&self, live_html: &str) -> bool {
        self.current_state().html != live_html
    }

    /// Record a snapshot. Returns false, recording nothing, when `html`
    /// matches the current entry.
    pub fn save_state(&mut self, html: &str, selection: Option<SelectionLocator>) -> bool {
        if !self.has_drift(html) {
            return false;
        }
        self.append(HistoryEntry::new(html, selection));
        self.current_index = self.entries.len() - 1;
        tracing::trace!(
            target: "missive::history",
            index = self.current_index,
            len = self.entries.len(),
            "saved state"
        );
        true
    }

    /// Record unsaved live content as a trailing entry without moving the
    /// pointer off the entry it was drifting from.
    ///
    /// Goes through the same truncate and evict path as
    /// [`save_state`](Self::save_state). Returns false when there is no drift.
    pub fn capture_drift(&mut self, live_html: &str, selection: Option<SelectionLocator>) -> bool {
        if !self.has_drift(live_html) {
            return false;
        }
        if self.append(HistoryEntry::new(live_html, selection)) {
            // The capacity floor guarantees the pointer was not on entry 0.
            self.current_index = self.current_index.saturating_sub(1);
        }
        tracing::debug!(
            target: "missive::history",
            index = self.current_index,
            len = self.entries.len(),
            "captured drift before undo"
        );
        true
    }

    /// Step back. Returns the entry the surface should now show.
    ///
    /// If the live content has drifted from the current entry, the drift is
    /// captured first and the current entry itself is returned; the pointer
    /// stays put. Otherwise the pointer moves back one entry, if it can.
    pub fn undo(
        &mut self,
        live_html: &str,
        live_selection: Option<SelectionLocator>,
    ) -> Option<&HistoryEntry> {
        if self.capture_drift(live_html, live_selection) {
            return Some(self.current_state());
        }
        if !self.can_undo() {
            return None;
        }
        self.current_index -= 1;
        tracing::trace!(target: "missive::history", index = self.current_index, "undo");
        Some(self.current_state())
    }

    /// Step forward. Returns the entry the surface should now show.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.current_index += 1;
        tracing::trace!(target: "missive::history", index = self.current_index, "redo");
        Some(self.current_state())
    }

    /// Reset to a single empty entry.
    pub fn clear_state(&mut self) {
        self.entries.clear();
        self.entries.push(HistoryEntry::new("", None));
        self.current_index = 0;
        tracing::trace!(target: "missive::history", "cleared");
    }

    /// Drop redo entries, push `entry` and evict the oldest when over
    /// capacity. Returns whether an entry was evicted. Leaves the pointer
    /// for the caller.
    fn append(&mut self, entry: HistoryEntry) -> bool {
        self.entries.truncate(self.current_index + 1);
        self.entries.push(entry);
        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn htmls(history: &EditorHistory) -> Vec<&str> {
        history.entries().iter().map(|e| e.html.as_str()).collect()
    }

    #[test]
    fn test_new_history_has_one_entry() {
        let history = EditorHistory::new("start");
        assert_eq!(history.len(), 1);
        assert_eq!(history.current_state().html, "start");
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.current_state().timestamp > 0);
    }

    #[test]
    fn test_save_state_appends_and_moves_pointer() {
        let mut history = EditorHistory::new("");
        assert!(history.save_state("a", None));
        assert!(history.save_state("ab", None));
        assert_eq!(htmls(&history), ["", "a", "ab"]);
        assert_eq!(history.current_index(), 2);
        assert!(history.can_undo());
    }

    #[test]
    fn test_save_unchanged_is_noop() {
        let mut history = EditorHistory::new("");
        assert!(history.save_state("same", None));
        assert!(!history.save_state("same", None));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_undo_redo_walks_pointer() {
        let mut history = EditorHistory::new("");
        history.save_state("a", None);
        history.save_state("ab", None);

        assert_eq!(history.undo("ab", None).map(|e| e.html.as_str()), Some("a"));
        assert_eq!(history.undo("a", None).map(|e| e.html.as_str()), Some(""));
        assert!(history.undo("", None).is_none());

        assert_eq!(history.redo().map(|e| e.html.as_str()), Some("a"));
        assert_eq!(history.redo().map(|e| e.html.as_str()), Some("ab"));
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_save_after_undo_drops_redo_branch() {
        let mut history = EditorHistory::new("");
        history.save_state("a", None);
        history.save_state("ab", None);
        history.undo("ab", None);
        history.save_state("ax", None);
        assert_eq!(htmls(&history), ["", "a", "ax"]);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_with_drift_restores_current_entry() {
        let mut history = EditorHistory::new("");
        history.save_state("hello", None);

        let caret = SelectionLocator::Path {
            path: vec![0],
            offset: 11,
        };
        let restored = history.undo("hello world", Some(caret.clone())).cloned();

        assert_eq!(restored.map(|e| e.html), Some("hello".to_owned()));
        assert_eq!(history.current_index(), 1);
        assert_eq!(htmls(&history), ["", "hello", "hello world"]);
        assert_eq!(history.entries()[2].selection, Some(caret));
        assert!(history.can_redo());

        // The drifted text is reachable again.
        assert_eq!(
            history.redo().map(|e| e.html.as_str()),
            Some("hello world")
        );
    }

    #[test]
    fn test_drift_on_oldest_entry_is_captured() {
        let mut history = EditorHistory::new("");
        assert!(!history.can_undo());
        let restored = history.undo("typed", None).map(|e| e.html.clone());
        assert_eq!(restored.as_deref(), Some(""));
        assert_eq!(history.current_index(), 0);
        assert_eq!(htmls(&history), ["", "typed"]);
    }

    #[test]
    fn test_drift_capture_truncates_redo_branch() {
        let mut history = EditorHistory::new("");
        history.save_state("a", None);
        history.save_state("b", None);
        history.undo("b", None);
        history.undo("a", None);
        history.undo("edited", None);
        assert_eq!(htmls(&history), ["", "edited"]);
        assert_eq!(history.current_index(), 0);
    }

    #[test]
    fn test_drift_capture_eviction_keeps_pointer_on_entry() {
        let mut history = EditorHistory::with_max_entries("", 3);
        history.save_state("a", None);
        history.save_state("b", None);

        let restored = history.undo("c", None).map(|e| e.html.clone());
        assert_eq!(restored.as_deref(), Some("b"));
        assert_eq!(htmls(&history), ["a", "b", "c"]);
        assert_eq!(history.current_state().html, "b");
    }

    #[test]
    fn test_capacity_clamped() {
        let mut history = EditorHistory::with_max_entries("", 0);
        assert_eq!(history.max_entries(), MIN_ENTRIES);
        history.save_state("a", None);
        history.save_state("b", None);
        assert_eq!(htmls(&history), ["a", "b"]);
    }

    #[test]
    fn test_clear_resets_to_single_empty_entry() {
        let mut history = EditorHistory::new("x");
        history.save_state("y", None);
        history.clear_state();
        assert_eq!(htmls(&history), [""]);
        assert_eq!(history.current_index(), 0);
        assert!(!history.is_empty());
    }

    #[test]
    fn test_entry_json_omits_missing_selection() {
        let entry = HistoryEntry {
            html: "<b>x</b>".into(),
            timestamp: 7,
            selection: None,
        };
        insta::assert_snapshot!(
            serde_json::to_string(&entry).unwrap(),
            @r#"{"html":"<b>x</b>","timestamp":7}"#
        );
    }
}
