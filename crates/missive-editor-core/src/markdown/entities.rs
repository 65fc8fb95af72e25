//! Structured output: plain text plus formatting entities.
//!
//! This is the form the message-composition layer sends over the wire. Entity
//! offsets and lengths are measured in UTF-16 code units, matching the
//! messaging protocol.

use std::borrow::Cow;
use std::convert::Infallible;
use std::sync::LazyLock;

use regex_lite::{Captures, Regex};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{Token, TokenOutput};

/// Formatting applied to a range of the message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EntityKind {
    Bold,
    Italic,
    Strike,
    Spoiler,
    Code,
    Pre {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<SmolStr>,
    },
    TextUrl {
        url: SmolStr,
    },
    CustomEmoji {
        #[serde(rename = "documentId")]
        document_id: SmolStr,
    },
}

/// An entity anchored to the message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    #[serde(flatten)]
    pub kind: EntityKind,
    /// Start, in UTF-16 code units.
    pub offset: usize,
    /// Length, in UTF-16 code units.
    pub length: usize,
}

/// Message text with its formatting entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedText {
    pub text: String,
    pub entities: Vec<MessageEntity>,
}

/// Collects tokens into a [`FormattedText`].
#[derive(Debug, Default)]
pub struct EntityOutput {
    formatted: FormattedText,
    utf16_len: usize,
}

impl EntityOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> FormattedText {
        self.formatted
    }

    fn push_text(&mut self, html: &str) -> (usize, usize) {
        let text = plain_text(html);
        let offset = self.utf16_len;
        let length = text.encode_utf16().count();
        self.formatted.text.push_str(&text);
        self.utf16_len += length;
        (offset, length)
    }

    fn push_entity(&mut self, content: &str, kind: EntityKind) {
        let (offset, length) = self.push_text(content);
        // Zero-length entities are rejected by the protocol.
        if length > 0 {
            self.formatted.entities.push(MessageEntity {
                kind,
                offset,
                length,
            });
        }
    }
}

impl TokenOutput for EntityOutput {
    type Error = Infallible;

    fn write_token(&mut self, token: &Token<'_>) -> Result<(), Self::Error> {
        match token {
            Token::Text(text) => {
                self.push_text(text);
            }
            Token::Newline => {
                self.push_text("\n");
            }
            Token::Code(content) => self.push_entity(content, EntityKind::Code),
            Token::Pre { language, content } => self.push_entity(
                content,
                EntityKind::Pre {
                    language: language.map(SmolStr::new),
                },
            ),
            Token::Bold(content) => self.push_entity(content, EntityKind::Bold),
            Token::Italic(content) => self.push_entity(content, EntityKind::Italic),
            Token::Strike(content) => self.push_entity(content, EntityKind::Strike),
            Token::Spoiler(content) => self.push_entity(content, EntityKind::Spoiler),
            Token::Emoji { alt, document_id } => self.push_entity(
                alt,
                EntityKind::CustomEmoji {
                    document_id: SmolStr::new(document_id),
                },
            ),
            Token::Link { text, url } => {
                self.push_entity(text, EntityKind::TextUrl { url: url.clone() })
            }
        }
        Ok(())
    }
}

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static IMG_ALT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^<img\b[^>]*?\balt="([^"]*)""#).unwrap());

/// Reduce surface markup to the text a reader sees.
///
/// Images become their `alt` text and every other tag is dropped. Character
/// references are decoded last so an escaped `&lt;` stays literal text.
fn plain_text(html: &str) -> Cow<'_, str> {
    if !html.contains('<') {
        return decode_basic_entities(html);
    }
    let stripped = TAG.replace_all(html, |caps: &Captures<'_>| {
        IMG_ALT
            .captures(&caps[0])
            .map(|alt| alt[1].to_owned())
            .unwrap_or_default()
    });
    Cow::Owned(decode_basic_entities(&stripped).into_owned())
}

/// Decode the character references a contenteditable surface emits for text.
fn decode_basic_entities(html: &str) -> Cow<'_, str> {
    if !html.contains('&') {
        return html.into();
    }
    html.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .into()
}
