//! Binds an [`EditorHistory`] to a live editing surface.

use super::engine::{EditorHistory, HistoryEntry};
use super::locator::SelectionLocator;
use crate::actions::{HistoryAction, Key, KeyCombo, KeydownResult};
use crate::config::HistoryConfig;
use crate::error::SelectionError;

/// The editing surface as the history sees it: html in and out, and a caret
/// that can be recorded and restored.
///
/// The browser adapter implements this over a contenteditable element,
/// [`MemorySurface`](super::MemorySurface) over an in-memory tree.
pub trait EditorSurface {
    fn html(&self) -> String;

    /// Replace the whole content.
    fn set_html(&mut self, html: &str);

    /// The current caret, if it is inside the editing root.
    fn caret(&self) -> Option<SelectionLocator>;

    fn set_caret(&mut self, locator: &SelectionLocator) -> Result<(), SelectionError>;

    /// Collapse the caret after the last child of the root.
    fn set_caret_to_end(&mut self) -> Result<(), SelectionError>;
}

/// Second phase of a restoration: the selection to reapply once the content
/// swap has been committed.
///
/// Pass it to [`HistoryController::apply_pending`]. A newer history call
/// supersedes it, after which applying it does nothing.
#[must_use = "the recorded selection is only restored by `apply_pending`"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSelection {
    generation: u64,
    selection: Option<SelectionLocator>,
}

impl PendingSelection {
    pub fn selection(&self) -> Option<&SelectionLocator> {
        self.selection.as_ref()
    }
}

/// What the controller did with a keydown.
#[derive(Debug, Clone, PartialEq)]
pub struct KeydownOutcome {
    pub result: KeydownResult,
    /// Set when a shortcut restored an entry.
    pub pending: Option<PendingSelection>,
}

impl KeydownOutcome {
    fn not_handled() -> Self {
        Self {
            result: KeydownResult::NotHandled,
            pending: None,
        }
    }
}

/// Undo/redo for one editing surface.
pub struct HistoryController<S> {
    surface: S,
    history: EditorHistory,
    config: HistoryConfig,
    generation: u64,
}

impl<S: EditorSurface> HistoryController<S> {
    /// Seed the history with the surface's current content.
    pub fn new(surface: S) -> Self {
        Self::with_config(surface, HistoryConfig::default())
    }

    pub fn with_config(surface: S, config: HistoryConfig) -> Self {
        let history = EditorHistory::with_max_entries(surface.html(), config.max_entries);
        Self {
            surface,
            history,
            config,
            generation: 0,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct access to the surface. Edits made through it are picked up as
    /// drift on the next undo, or recorded by the next save.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn history(&self) -> &EditorHistory {
        &self.history
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn current_state(&self) -> &HistoryEntry {
        self.history.current_state()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Record `html` with the surface's current caret.
    pub fn save_state(&mut self, html: &str) -> bool {
        self.generation += 1;
        let caret = self.surface.caret();
        self.history.save_state(html, caret)
    }

    /// Record whatever the surface currently shows.
    pub fn save_current(&mut self) -> bool {
        let html = self.surface.html();
        self.save_state(&html)
    }

    pub fn undo(&mut self) -> Option<PendingSelection> {
        self.generation += 1;
        let live_html = self.surface.html();
        let live_caret = self.surface.caret();
        let entry = self.history.undo(&live_html, live_caret)?.clone();
        Some(self.restore(entry))
    }

    pub fn redo(&mut self) -> Option<PendingSelection> {
        self.generation += 1;
        let entry = self.history.redo()?.clone();
        Some(self.restore(entry))
    }

    /// Forget everything, e.g. after the message was sent.
    pub fn clear_state(&mut self) {
        self.generation += 1;
        self.history.clear_state();
    }

    /// Run `action` if it is available.
    pub fn perform(&mut self, action: HistoryAction) -> Option<PendingSelection> {
        match action {
            HistoryAction::Undo => self.undo(),
            HistoryAction::Redo => self.redo(),
        }
    }

    /// Reapply the selection recorded with a restored entry.
    ///
    /// Returns false if `pending` was superseded. A selection that no longer
    /// resolves puts the caret at the end of the content instead.
    pub fn apply_pending(&mut self, pending: PendingSelection) -> bool {
        if pending.generation != self.generation {
            tracing::trace!(
                target: "missive::history",
                pending = pending.generation,
                current = self.generation,
                "dropping superseded selection restore"
            );
            return false;
        }
        let Some(selection) = pending.selection else {
            return true;
        };
        if let Err(err) = self.surface.set_caret(&selection) {
            tracing::debug!(target: "missive::history", %err, "restoring caret at end");
            if let Err(err) = self.surface.set_caret_to_end() {
                tracing::debug!(target: "missive::history", %err, "could not place caret");
            }
        }
        true
    }

    /// Handle a keydown: history shortcuts first, then snapshot triggers.
    ///
    /// A shortcut that runs returns [`KeydownResult::Handled`] and the host
    /// should prevent the default. Navigation and bare modifier keys are
    /// `PassThrough`. Everything else is `NotHandled`, including keys that
    /// only took a snapshot.
    pub fn handle_keydown(&mut self, combo: &KeyCombo) -> KeydownOutcome {
        if let Some(action) = self.shortcut_action(combo) {
            let pending = self.perform(action);
            return KeydownOutcome {
                result: KeydownResult::Handled,
                pending,
            };
        }

        if combo.key.is_navigation() || combo.key.is_modifier() {
            return KeydownOutcome {
                result: KeydownResult::PassThrough,
                pending: None,
            };
        }

        if self.is_snapshot_trigger(combo) {
            tracing::trace!(target: "missive::history", key = ?combo.key, "snapshot trigger");
            self.save_current();
        }
        KeydownOutcome::not_handled()
    }

    fn shortcut_action(&self, combo: &KeyCombo) -> Option<HistoryAction> {
        let action = match &combo.key {
            Key::Undo => HistoryAction::Undo,
            Key::Redo => HistoryAction::Redo,
            Key::Character(c) if combo.modifiers.has_primary() => {
                if c.eq_ignore_ascii_case("z") {
                    if combo.modifiers.shift {
                        HistoryAction::Redo
                    } else {
                        HistoryAction::Undo
                    }
                } else if c.eq_ignore_ascii_case("y") {
                    HistoryAction::Redo
                } else {
                    return None;
                }
            }
            _ => return None,
        };

        let available = match action {
            HistoryAction::Undo => self.can_undo(),
            HistoryAction::Redo => self.can_redo(),
        };
        available.then_some(action)
    }

    fn is_snapshot_trigger(&self, combo: &KeyCombo) -> bool {
        match &combo.key {
            Key::Space | Key::Enter => self.config.snapshot_on_whitespace,
            Key::Backspace | Key::Delete => self.config.snapshot_on_delete,
            Key::Paste | Key::Cut => self.config.snapshot_on_clipboard,
            Key::Character(c) if combo.modifiers.has_primary() => {
                (c.eq_ignore_ascii_case("v") || c.eq_ignore_ascii_case("x"))
                    && self.config.snapshot_on_clipboard
            }
            _ => false,
        }
    }

    fn restore(&mut self, entry: HistoryEntry) -> PendingSelection {
        self.surface.set_html(&entry.html);
        PendingSelection {
            generation: self.generation,
            selection: entry.selection,
        }
    }
}
