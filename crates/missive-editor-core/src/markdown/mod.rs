//! Composer markdown: a constrained markdown dialect mixed with editor HTML.
//!
//! The pipeline is `preprocess` (flatten the contenteditable line structure)
//! → `tokenize` (single left-to-right scan) → a [`TokenOutput`] that serializes
//! the stream, either to inline HTML ([`HtmlOutput`]) or to text plus
//! entities ([`EntityOutput`]).
//!
//! Supported syntax: ```` ```lang ```` fenced blocks, `` `code` ``,
//! `**bold**`, `__italic__`, `~~strike~~`, `||spoiler||`,
//! `[text](url)` links and `[alt](customEmoji:id)` custom emoji. Spans do not
//! nest, and an unterminated span runs to the end of the input.

mod entities;
mod html_output;
mod preprocess;
mod token;
mod tokenizer;


pub use entities::{EntityKind, EntityOutput, FormattedText, MessageEntity};
pub use html_output::HtmlOutput;
pub use preprocess::preprocess;
pub use token::{Token, TokenKind, normalize_url};
pub use tokenizer::{Tokenizer, tokenize};

use crate::error::ConfigError;

/// A sink for tokens.
pub trait TokenOutput {
    type Error;

    fn write_token(&mut self, token: &Token<'_>) -> Result<(), Self::Error>;

    fn write_tokens<'t, 's: 't, I>(&mut self, tokens: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = &'t Token<'s>>,
    {
        for token in tokens {
            self.write_token(token)?;
        }
        Ok(())
    }
}

/// Attribute values used by the HTML serializer.
///
/// The document id attribute name is written into markup unescaped, so it is
/// checked with [`is_valid_attribute_name`] on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    spoiler_entity_type: String,
    document_id_attribute: String,
}

impl RenderOptions {
    pub fn new(
        spoiler_entity_type: impl Into<String>,
        document_id_attribute: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let document_id_attribute = document_id_attribute.into();
        if !is_valid_attribute_name(&document_id_attribute) {
            return Err(ConfigError::AttributeName(document_id_attribute));
        }
        Ok(Self {
            spoiler_entity_type: spoiler_entity_type.into(),
            document_id_attribute,
        })
    }

    /// Value of `data-entity-type` on spoiler spans.
    pub fn spoiler_entity_type(&self) -> &str {
        &self.spoiler_entity_type
    }

    /// Attribute carrying the custom emoji document id.
    pub fn document_id_attribute(&self) -> &str {
        &self.document_id_attribute
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            spoiler_entity_type: "spoiler".to_owned(),
            document_id_attribute: "data-document-id".to_owned(),
        }
    }
}

/// `[A-Za-z][A-Za-z0-9-]*`
pub fn is_valid_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Convert raw editor HTML into sanitized composer HTML.
pub fn parse(raw_html: &str) -> String {
    parse_with(raw_html, &RenderOptions::default())
}

/// [`parse`] with explicit render options.
pub fn parse_with(raw_html: &str, options: &RenderOptions) -> String {
    let text = preprocess(raw_html);
    let tokens = tokenize(&text);
    render_html(&tokens, options)
}

/// Serialize an already tokenized stream to HTML.
pub fn render_html(tokens: &[Token<'_>], options: &RenderOptions) -> String {
    let mut output = HtmlOutput::new(String::with_capacity(tokens.len() * 8), options);
    // Writing into a String cannot fail.
    let _ = output.write_tokens(tokens);
    output.into_inner()
}

/// Convert raw editor HTML into message text and entities.
pub fn to_entities(raw_html: &str) -> FormattedText {
    let text = preprocess(raw_html);
    let tokens = tokenize(&text);
    let mut output = EntityOutput::new();
    match output.write_tokens(&tokens) {
        Ok(()) => output.into_inner(),
        Err(never) => match never {},
    }
}
