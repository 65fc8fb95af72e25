//! Composer configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes. Files are read as JSON or TOML depending on their extension.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::history::{DEFAULT_MAX_ENTRIES, MIN_ENTRIES};
use crate::markdown::RenderOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub history: HistoryConfig,
    pub markdown: MarkdownConfig,
}

/// Snapshot history settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Entries kept before the oldest is evicted.
    pub max_entries: usize,
    /// Snapshot before space and enter.
    pub snapshot_on_whitespace: bool,
    /// Snapshot before backspace and delete.
    pub snapshot_on_delete: bool,
    /// Snapshot before paste and cut.
    pub snapshot_on_clipboard: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            snapshot_on_whitespace: true,
            snapshot_on_delete: true,
            snapshot_on_clipboard: true,
        }
    }
}

/// Attribute values written by the markdown serializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    pub spoiler_entity_type: String,
    pub document_id_attribute: String,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        let options = RenderOptions::default();
        Self {
            spoiler_entity_type: options.spoiler_entity_type().to_owned(),
            document_id_attribute: options.document_id_attribute().to_owned(),
        }
    }
}

impl TryFrom<&MarkdownConfig> for RenderOptions {
    type Error = ConfigError;

    fn try_from(config: &MarkdownConfig) -> Result<Self, Self::Error> {
        RenderOptions::new(
            config.spoiler_entity_type.clone(),
            config.document_id_attribute.clone(),
        )
    }
}

impl ComposerConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()
    }

    /// Load from a `.json` or `.toml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path.extension().and_then(|ext| ext.to_str());
        let config = match extension {
            Some("json") => Self::from_json_str(&std::fs::read_to_string(path)?)?,
            Some("toml") => Self::from_toml_str(&std::fs::read_to_string(path)?)?,
            other => return Err(ConfigError::UnsupportedFormat(other.map(str::to_owned))),
        };
        tracing::debug!(target: "missive::config", path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Fails only for a config built in code with an invalid attribute
    /// name; loaded configs are already validated.
    pub fn render_options(&self) -> Result<RenderOptions, ConfigError> {
        RenderOptions::try_from(&self.markdown)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.history.max_entries < MIN_ENTRIES {
            return Err(ConfigError::MaxEntries {
                min: MIN_ENTRIES,
                got: self.history.max_entries,
            });
        }
        self.render_options()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ComposerConfig::default();
        assert_eq!(config.history.max_entries, 100);
        assert!(config.history.snapshot_on_whitespace);
        assert_eq!(config.render_options().unwrap(), RenderOptions::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config =
            ComposerConfig::from_json_str(r#"{"history": {"max_entries": 20}}"#).unwrap();
        assert_eq!(config.history.max_entries, 20);
        assert!(config.history.snapshot_on_clipboard);
        assert_eq!(config.markdown, MarkdownConfig::default());
    }

    #[test]
    fn test_toml() {
        let config = ComposerConfig::from_toml_str(
            r#"
            [history]
            snapshot_on_delete = false

            [markdown]
            spoiler_entity_type = "MessageEntitySpoiler"
            "#,
        )
        .unwrap();
        assert!(!config.history.snapshot_on_delete);
        assert_eq!(config.history.max_entries, 100);
        assert_eq!(
            config.render_options().unwrap().spoiler_entity_type(),
            "MessageEntitySpoiler"
        );
    }

    #[test]
    fn test_rejects_tiny_capacity() {
        let err = ComposerConfig::from_json_str(r#"{"history": {"max_entries": 1}}"#)
            .unwrap_err();
        insta::assert_snapshot!(err, @"history.max_entries must be at least 2, got 1");
    }

    #[test]
    fn test_rejects_unsafe_attribute_name() {
        let err = ComposerConfig::from_toml_str(
            r#"
            [markdown]
            document_id_attribute = "x onerror=alert(1)"
            "#,
        )
        .unwrap_err();
        insta::assert_snapshot!(
            err,
            @r#"markdown.document_id_attribute "x onerror=alert(1)" is not a valid attribute name"#
        );

        let mut config = ComposerConfig::default();
        config.markdown.document_id_attribute = "a\"b".into();
        assert!(matches!(
            config.render_options(),
            Err(ConfigError::AttributeName(name)) if name == "a\"b"
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ComposerConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            ComposerConfig::from_toml_str("history = 3"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("composer.toml");
        std::fs::write(&toml_path, "[history]\nmax_entries = 5\n").unwrap();
        assert_eq!(ComposerConfig::load(&toml_path).unwrap().history.max_entries, 5);

        let yaml_path = dir.path().join("composer.yaml");
        assert!(matches!(
            ComposerConfig::load(&yaml_path),
            Err(ConfigError::UnsupportedFormat(Some(ext))) if ext == "yaml"
        ));

        assert!(matches!(
            ComposerConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
