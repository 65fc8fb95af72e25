//! Snapshot-based undo/redo for a contenteditable composer.
//!
//! The browser's native undo stack does not survive programmatic content
//! replacement, so the composer keeps its own: whole-content HTML snapshots
//! taken at word and clipboard boundaries, each with a recorded caret.
//!
//! - [`EditorHistory`]: the bounded entry list and pointer, surface-free.
//! - [`HistoryController`]: drives an [`EditorSurface`], handles keydown
//!   shortcuts and snapshot triggers, and restores the caret in a second
//!   phase via [`PendingSelection`].
//! - [`SelectionLocator`]: caret positions that survive content replacement,
//!   computed over any [`NodeTree`].

mod controller;
mod engine;
mod locator;
mod memory;

pub use controller::{EditorSurface, HistoryController, KeydownOutcome, PendingSelection};
pub use engine::{DEFAULT_MAX_ENTRIES, EditorHistory, HistoryEntry, MIN_ENTRIES};
pub use locator::{DomPoint, NodeTree, SelectionLocator, end_point, locate, resolve};
pub use memory::{MemorySurface, MemoryTree, NodeId};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn entries_never_exceed_capacity(max in 2usize..20, saves in 0usize..60) {
            let mut history = EditorHistory::with_max_entries("", max);
            for i in 0..saves {
                history.save_state(&format!("s{i}"), None);
            }
            prop_assert!(history.len() <= max);
            prop_assert_eq!(history.current_index(), history.len() - 1);
        }

        #[test]
        fn oldest_survivor_after_overflow(max in 2usize..20) {
            let mut history = EditorHistory::with_max_entries("", max);
            for i in 1..=max + 5 {
                history.save_state(&format!("s{i}"), None);
            }
            prop_assert_eq!(history.len(), max);
            // The seed and the first five saves were evicted.
            prop_assert_eq!(history.entries()[0].html.as_str(), "s6");
            let newest = format!("s{}", max + 5);
            prop_assert_eq!(history.current_state().html.as_str(), newest.as_str());
        }

        #[test]
        fn undo_then_redo_round_trips(saves in 1usize..15, k in 0usize..15) {
            let mut history = EditorHistory::new("");
            for i in 0..saves {
                history.save_state(&format!("s{i}"), None);
            }
            let before = history.current_state().html.clone();
            let k = k.min(history.current_index());

            let mut live = before.clone();
            for _ in 0..k {
                live = history.undo(&live, None).map(|e| e.html.clone()).unwrap_or(live);
            }
            for _ in 0..k {
                live = history.redo().map(|e| e.html.clone()).unwrap_or(live);
            }
            prop_assert_eq!(live, before);
        }

        #[test]
        fn repeated_save_is_idempotent(html in "[a-z ]{0,12}") {
            let mut history = EditorHistory::new("seed");
            history.save_state(&html, None);
            let len = history.len();
            prop_assert!(!history.save_state(&html, None));
            prop_assert_eq!(history.len(), len);
        }
    }

    #[test]
    fn test_drift_is_kept_as_entry() {
        let mut surface_html = String::from("typed");
        let mut history = EditorHistory::new("");
        history.save_state("ty", None);
        if let Some(entry) = history.undo(&surface_html, None) {
            surface_html = entry.html.clone();
        }
        assert_eq!(surface_html, "ty");
        assert!(history.entries().iter().any(|e| e.html == "typed"));
    }
}
