//! missive-editor-core: composer logic without platform dependencies.
//!
//! This crate provides:
//! - [`markdown`]: editor HTML → sanitized composer HTML (or text + entities)
//! - [`history`]: snapshot undo/redo with caret restoration, generic over an
//!   [`EditorSurface`]
//! - Keyboard types the history controller consumes, and configuration

pub mod actions;
pub mod config;
pub mod error;
pub mod history;
pub mod markdown;

pub use actions::{HistoryAction, Key, KeyCombo, KeydownResult, Modifiers};
pub use config::{ComposerConfig, HistoryConfig, MarkdownConfig};
pub use error::{ConfigError, SelectionError};
pub use history::{
    EditorHistory, EditorSurface, HistoryController, HistoryEntry, KeydownOutcome,
    PendingSelection, SelectionLocator,
};
pub use markdown::{FormattedText, RenderOptions, Token, parse, parse_with, to_entities, tokenize};
pub use smol_str::SmolStr;
