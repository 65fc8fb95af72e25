//! Token types produced by the composer markdown tokenizer.

use smol_str::SmolStr;

/// Classification of a [`Token`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Text,
    Code,
    Pre,
    Bold,
    Italic,
    Strike,
    Spoiler,
    Emoji,
    Newline,
    Link,
}

impl TokenKind {
    /// Whether tokens of this kind hold verbatim code.
    pub fn is_code(self) -> bool {
        matches!(self, Self::Code | Self::Pre)
    }
}

/// A single lexical unit of composer markdown.
///
/// Content is borrowed from the normalized input text. Only the link URL is
/// owned, since normalization may prepend a scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// A run of plain text (may contain inline HTML from the editor surface).
    Text(&'a str),
    /// Inline code between single backticks.
    Code(&'a str),
    /// Fenced code block, trimmed, with an optional language tag.
    Pre {
        language: Option<&'a str>,
        content: &'a str,
    },
    /// `**bold**`
    Bold(&'a str),
    /// `__italic__`
    Italic(&'a str),
    /// `~~strike~~`
    Strike(&'a str),
    /// `||spoiler||`
    Spoiler(&'a str),
    /// `[alt](customEmoji:document_id)`
    Emoji {
        alt: &'a str,
        document_id: &'a str,
    },
    /// A literal line break.
    Newline,
    /// `[text](target)` with the target normalized to an absolute URL.
    Link { text: &'a str, url: SmolStr },
}

impl<'a> Token<'a> {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Text(_) => TokenKind::Text,
            Token::Code(_) => TokenKind::Code,
            Token::Pre { .. } => TokenKind::Pre,
            Token::Bold(_) => TokenKind::Bold,
            Token::Italic(_) => TokenKind::Italic,
            Token::Strike(_) => TokenKind::Strike,
            Token::Spoiler(_) => TokenKind::Spoiler,
            Token::Emoji { .. } => TokenKind::Emoji,
            Token::Newline => TokenKind::Newline,
            Token::Link { .. } => TokenKind::Link,
        }
    }

    /// The raw textual content of the token.
    ///
    /// For emoji this is the alt text, for links the display text.
    pub fn content(&self) -> &'a str {
        match self {
            Token::Text(s)
            | Token::Code(s)
            | Token::Bold(s)
            | Token::Italic(s)
            | Token::Strike(s)
            | Token::Spoiler(s) => s,
            Token::Pre { content, .. } => content,
            Token::Emoji { alt, .. } => alt,
            Token::Newline => "\n",
            Token::Link { text, .. } => text,
        }
    }
}

/// Turn a raw link target into an absolute URL.
///
/// Targets that already carry a scheme separator are kept as-is, anything
/// with an `@` is treated as an email address, everything else gets `https://`.
pub fn normalize_url(target: &str) -> SmolStr {
    if target.contains("://") {
        SmolStr::new(target)
    } else if target.contains('@') {
        smol_str::format_smolstr!("mailto:{target}")
    } else {
        smol_str::format_smolstr!("https://{target}")
    }
}
