//! Flattening of contenteditable markup into a newline-delimited stream.
//!
//! Browsers wrap each line of a contenteditable surface in `<div>` and mark
//! empty lines with `<div><br></div>`. The tokenizer only wants literal `\n`,
//! so those structural tags are rewritten before scanning. Inline markup the
//! surface produces (emoji `<img>` tags, entities) is left untouched.

use std::sync::LazyLock;

use regex_lite::Regex;

static EMPTY_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<div><br[^>]*></div>").unwrap());
static LINE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<br[^>]*>").unwrap());
static DIV_BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</div>\s*<div>").unwrap());

/// Normalize raw editor HTML into the text the tokenizer scans.
///
/// Rewrites, in order: `&nbsp;` to a space, empty `<div><br></div>` lines,
/// `<br>` tags, `</div><div>` boundaries and opening `<div>` tags to `\n`,
/// and drops the remaining closing `</div>` tags.
pub fn preprocess(raw: &str) -> String {
    let text = raw.replace("&nbsp;", " ");
    let text = EMPTY_LINE_RE.replace_all(&text, "\n");
    let text = LINE_BREAK_RE.replace_all(&text, "\n");
    let text = DIV_BOUNDARY_RE.replace_all(&text, "\n");
    text.replace("<div>", "\n").replace("</div>", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(preprocess("hello world"), "hello world");
    }

    #[test]
    fn test_nbsp_becomes_space() {
        assert_eq!(preprocess("a&nbsp;&nbsp;b"), "a  b");
    }

    #[test]
    fn test_br_variants() {
        assert_eq!(preprocess("a<br>b"), "a\nb");
        assert_eq!(preprocess("a<br/>b"), "a\nb");
        assert_eq!(preprocess("a<br class=\"x\">b"), "a\nb");
    }

    #[test]
    fn test_div_lines() {
        // First line is bare text, following lines are wrapped in divs.
        assert_eq!(preprocess("one<div>two</div><div>three</div>"), "one\ntwo\nthree");
    }

    #[test]
    fn test_empty_div_line() {
        assert_eq!(preprocess("one<div><br></div><div>two</div>"), "one\n\ntwo");
    }

    #[test]
    fn test_div_boundary_with_whitespace() {
        assert_eq!(preprocess("<div>a</div>\n  <div>b</div>"), "\na\nb");
    }

    #[test]
    fn test_inline_markup_kept() {
        let raw = r#"hi <img class="emoji" alt="😀"> &amp; bye"#;
        assert_eq!(preprocess(raw), raw);
    }
}
