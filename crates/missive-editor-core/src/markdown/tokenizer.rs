//! Single-pass scanner over normalized composer text.
//!
//! The grammar is deliberately flat: formatting spans do not nest, and the
//! first matching closing delimiter ends a span. Unterminated spans run to
//! the end of input, so scanning always consumes the whole string.

use super::token::{Token, normalize_url};

const FENCE: &str = "```";
const CUSTOM_EMOJI_MARKER: &str = "](customEmoji:";

/// Characters that start a construct when doubled.
const SPECIAL_CHARS: [u8; 6] = [b'`', b'*', b'_', b'~', b'|', b'['];

/// Tokenize normalized text (see [`super::preprocess`]).
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    Tokenizer::new(text).run()
}

/// Cursor-based scanner state.
pub struct Tokenizer<'a> {
    text: &'a str,
    pos: usize,
    tokens: Vec<Token<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    pub fn run(mut self) -> Vec<Token<'a>> {
        while self.pos < self.text.len() {
            let token = self.next_token();
            if let Some(token) = token {
                self.tokens.push(token);
            }
        }
        tracing::trace!(
            target: "missive::markdown",
            input_len = self.text.len(),
            tokens = self.tokens.len(),
            "tokenized composer text"
        );
        self.tokens
    }

    fn next_token(&mut self) -> Option<Token<'a>> {
        let rest = self.rest();

        if rest.starts_with('\n') {
            self.consume(1);
            return Some(Token::Newline);
        }
        if rest.starts_with(FENCE) {
            return Some(self.parse_code_block());
        }
        if rest.starts_with('`') {
            return Some(self.parse_inline_code());
        }
        if let Some(token) = self.parse_paired() {
            return Some(token);
        }
        if self.is_custom_emoji_start() {
            return Some(self.parse_custom_emoji());
        }
        if self.is_valid_link_start() {
            return Some(self.parse_link());
        }
        self.parse_text()
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn consume(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.text.len());
    }

    /// Read up to the next occurrence of `delimiter`, or to the end of input.
    ///
    /// The delimiter itself is not consumed.
    fn read_until(&mut self, delimiter: &str) -> &'a str {
        let rest = self.rest();
        let len = rest.find(delimiter).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// Read a code body through its closing delimiter in one step, so no
    /// formatting is recognized inside it.
    fn read_code_body(&mut self, delimiter: &str) -> &'a str {
        let body = self.read_until(delimiter);
        self.consume(delimiter.len());
        body
    }

    fn parse_code_block(&mut self) -> Token<'a> {
        self.consume(FENCE.len());
        let language = self.read_until("\n").trim();
        self.consume(1);
        let content = self.read_code_body(FENCE).trim();

        Token::Pre {
            language: (!language.is_empty()).then_some(language),
            content,
        }
    }

    fn parse_inline_code(&mut self) -> Token<'a> {
        self.consume(1);
        Token::Code(self.read_code_body("`"))
    }

    /// Doubled-delimiter formatting: `**`, `__`, `~~`, `||`.
    fn parse_paired(&mut self) -> Option<Token<'a>> {
        let rest = self.rest();
        let (delimiter, make): (&str, fn(&'a str) -> Token<'a>) = if rest.starts_with("**") {
            ("**", Token::Bold)
        } else if rest.starts_with("__") {
            ("__", Token::Italic)
        } else if rest.starts_with("~~") {
            ("~~", Token::Strike)
        } else if rest.starts_with("||") {
            ("||", Token::Spoiler)
        } else {
            return None;
        };

        self.consume(delimiter.len());
        let content = self.read_until(delimiter);
        self.consume(delimiter.len());
        Some(make(content))
    }

    /// `[` whose first `]` on the current line opens the custom emoji marker.
    fn is_custom_emoji_start(&self) -> bool {
        let rest = self.rest();
        if !rest.starts_with('[') {
            return false;
        }
        let line = rest.split('\n').next().unwrap_or(rest);
        match line.find(']') {
            Some(close) => line[close..].starts_with(CUSTOM_EMOJI_MARKER),
            None => false,
        }
    }

    fn parse_custom_emoji(&mut self) -> Token<'a> {
        self.consume(1);
        let alt = self.read_until("]");
        self.consume(CUSTOM_EMOJI_MARKER.len());
        let document_id = self.read_until(")");
        self.consume(1);

        Token::Emoji { alt, document_id }
    }

    /// A `[` followed by `]` on the same line, immediately followed by `(`.
    pub fn is_valid_link_start(&self) -> bool {
        let bytes = self.rest().as_bytes();
        if bytes.first() != Some(&b'[') {
            return false;
        }
        for (i, &b) in bytes.iter().enumerate().skip(1) {
            match b {
                b'\n' => return false,
                b']' => return bytes.get(i + 1) == Some(&b'('),
                _ => {}
            }
        }
        false
    }

    fn parse_link(&mut self) -> Token<'a> {
        self.consume(1);
        let text = self.read_until("]");
        self.consume(2);
        let target = self.read_until(")");
        self.consume(1);

        Token::Link {
            text,
            url: normalize_url(target),
        }
    }

    /// Whether the scanner sits at the start of a construct that ends a text run.
    fn at_construct_start(&self) -> bool {
        let bytes = self.rest().as_bytes();
        match bytes {
            [b'\n', ..] => true,
            [a, b, ..] if a == b && SPECIAL_CHARS.contains(a) => true,
            // A lone backtick only opens code when it is closed later on.
            [b'`', ..] => self.rest()[1..].contains('`'),
            [b'[', ..] => self.is_custom_emoji_start() || self.is_valid_link_start(),
            _ => false,
        }
    }

    fn parse_text(&mut self) -> Option<Token<'a>> {
        let start = self.pos;
        // Always take at least one character so a lone delimiter cannot stall the scan.
        if let Some(c) = self.rest().chars().next() {
            self.consume(c.len_utf8());
        }
        while self.pos < self.text.len() && !self.at_construct_start() {
            let c = self.rest().chars().next().map_or(1, char::len_utf8);
            self.consume(c);
        }

        let content = &self.text[start..self.pos];
        (!content.is_empty()).then_some(Token::Text(content))
    }
}
