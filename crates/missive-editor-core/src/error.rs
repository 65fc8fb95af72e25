//! Error types for the composer core.

use miette::Diagnostic;

use crate::history::SelectionLocator;

/// Failure to place the caret on an editing surface.
///
/// Restoration treats these as non-fatal: the controller logs them and falls
/// back to the end of the content.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
    /// The recorded position does not exist in the current content.
    #[error("selection {0:?} does not resolve in the current content")]
    Unresolved(SelectionLocator),

    /// The editing root has no children to place a caret after.
    #[error("editing root is empty")]
    EmptyContent,

    /// The platform has no selection object to update.
    #[error("no selection available")]
    NoSelection,

    /// The platform selection API rejected the change.
    #[error("platform selection error: {0}")]
    Platform(String),
}

/// Failure to load a [`ComposerConfig`](crate::config::ComposerConfig).
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unsupported config format: {0:?}")]
    #[diagnostic(
        code(missive::config::format),
        help("use a file ending in .json or .toml")
    )]
    UnsupportedFormat(Option<String>),

    #[error("could not read config file")]
    #[diagnostic(code(missive::config::io))]
    Io(#[from] std::io::Error),

    #[error("invalid JSON config: {0}")]
    #[diagnostic(code(missive::config::json))]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML config: {0}")]
    #[diagnostic(code(missive::config::toml))]
    Toml(#[from] toml::de::Error),

    #[error("history.max_entries must be at least {min}, got {got}")]
    #[diagnostic(
        code(missive::config::max_entries),
        help("the history needs room for the current entry and one more")
    )]
    MaxEntries { min: usize, got: usize },

    #[error("markdown.document_id_attribute {0:?} is not a valid attribute name")]
    #[diagnostic(
        code(missive::config::attribute_name),
        help("start with an ASCII letter and use only letters, digits and hyphens")
    )]
    AttributeName(String),
}
