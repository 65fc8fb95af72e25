use std::fmt::Write;

use super::{RenderOptions, Token, TokenOutput};

/// Serializes tokens to the composer's inline HTML.
pub struct HtmlOutput<'o, W: Write> {
    writer: W,
    options: &'o RenderOptions,
}

impl<'o, W: Write> HtmlOutput<'o, W> {
    pub fn new(writer: W, options: &'o RenderOptions) -> Self {
        Self { writer, options }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_attr(&mut self, value: &str) -> std::fmt::Result {
        for c in value.chars() {
            match c {
                '&' => self.writer.write_str("&amp;")?,
                '"' => self.writer.write_str("&quot;")?,
                '<' => self.writer.write_str("&lt;")?,
                '>' => self.writer.write_str("&gt;")?,
                _ => self.writer.write_char(c)?,
            }
        }
        Ok(())
    }
}

impl<W: Write> TokenOutput for HtmlOutput<'_, W> {
    type Error = std::fmt::Error;

    fn write_token(&mut self, token: &Token<'_>) -> Result<(), Self::Error> {
        match token {
            Token::Text(text) => self.writer.write_str(text),
            Token::Newline => self.writer.write_char('\n'),
            Token::Code(content) => write!(self.writer, "<code>{content}</code>"),
            Token::Pre { language, content } => {
                match language {
                    Some(language) => {
                        self.writer.write_str("<pre data-language=\"")?;
                        self.write_attr(language)?;
                        self.writer.write_str("\">")?;
                    }
                    None => self.writer.write_str("<pre>")?,
                }
                write!(self.writer, "{content}</pre>")
            }
            Token::Bold(content) => write!(self.writer, "<b>{content}</b>"),
            Token::Italic(content) => write!(self.writer, "<i>{content}</i>"),
            Token::Strike(content) => write!(self.writer, "<s>{content}</s>"),
            Token::Spoiler(content) => {
                let options = self.options;
                self.writer.write_str("<span data-entity-type=\"")?;
                self.write_attr(options.spoiler_entity_type())?;
                write!(self.writer, "\">{content}</span>")
            }
            Token::Emoji { alt, document_id } => {
                self.writer.write_str("<img alt=\"")?;
                self.write_attr(alt)?;
                // Validated by `RenderOptions::new`.
                write!(self.writer, "\" {}=\"", self.options.document_id_attribute())?;
                self.write_attr(document_id)?;
                self.writer.write_str("\">")
            }
            Token::Link { text, url } => {
                self.writer.write_str("<a href=\"")?;
                self.write_attr(url)?;
                write!(self.writer, "\">{text}</a>")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(tokens: &[Token<'_>]) -> String {
        let options = RenderOptions::default();
        let mut output = HtmlOutput::new(String::new(), &options);
        for token in tokens {
            output.write_token(token).unwrap();
        }
        output.into_inner()
    }

    #[test]
    fn test_pre_language_attribute_escaped() {
        let html = render(&[Token::Pre {
            language: Some("a\"b"),
            content: "x",
        }]);
        assert_eq!(html, "<pre data-language=\"a&quot;b\">x</pre>");
    }

    #[test]
    fn test_link_href_escaped() {
        let html = render(&[Token::Link {
            text: "t",
            url: "https://x.com/?a=1&b=\"2\"".into(),
        }]);
        assert_eq!(
            html,
            "<a href=\"https://x.com/?a=1&amp;b=&quot;2&quot;\">t</a>"
        );
    }

    #[test]
    fn test_custom_document_id_attribute() {
        let options = RenderOptions::new("spoiler", "data-custom-emoji-id").unwrap();
        let mut output = HtmlOutput::new(String::new(), &options);
        output
            .write_token(&Token::Emoji {
                alt: "x",
                document_id: "7",
            })
            .unwrap();
        assert_eq!(
            output.into_inner(),
            "<img alt=\"x\" data-custom-emoji-id=\"7\">"
        );
    }

    #[test]
    fn test_unsafe_attribute_name_rejected() {
        for name in ["x onerror=alert(1)", "a\"b", "1abc", "", "data_id", "x>"] {
            assert!(
                RenderOptions::new("spoiler", name).is_err(),
                "accepted {name:?}"
            );
        }
        assert!(RenderOptions::new("spoiler", "data-doc-2").is_ok());
    }
}
