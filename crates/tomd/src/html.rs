//! HTML parsing support.
//!
//! Parsing itself is delegated to scraper (html5ever underneath), which
//! recovers from malformed markup the way browsers do. The only input this
//! layer rejects is input that is not text at all.

use crate::selection::Document;
use crate::{ConvertError, Result};

/// Parse an HTML string into a [`Document`].
///
/// Useful when the tree should be inspected or rewritten before it is
/// converted to Markdown.
///
/// # Example
///
/// ```rust
/// use tomd::{parse_html, Converter};
///
/// let mut document = parse_html("<h1>Hello <em>World</em></h1>");
///
/// let converter = Converter::default();
/// let markdown = converter.convert_document(&mut document);
/// assert_eq!(markdown, "# Hello _World_");
/// ```
pub fn parse_html(html: &str) -> Document {
    Document::parse(html)
}

/// Parse an HTML fragment, without the implied `<html>`/`<head>`/`<body>`.
pub fn parse_fragment(html: &str) -> Document {
    Document::parse_fragment(html)
}

/// Parse raw bytes, which must be UTF-8 encoded.
pub fn parse_bytes(bytes: &[u8]) -> Result<Document> {
    let html = std::str::from_utf8(bytes)
        .map_err(|e| ConvertError::Parse(format!("input is not valid UTF-8: {e}")))?;
    Ok(Document::parse(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_html() {
        let document = parse_html("<p>Hello World</p>");
        assert_eq!(document.root().tag_name(), "#document");
        assert_eq!(document.find_all("p").len(), 1);
        assert_eq!(document.find_all("body").len(), 1);
    }

    #[test]
    fn test_parse_fragment_has_no_body() {
        let document = parse_fragment("<p>Hello</p>");
        assert_eq!(document.root().tag_name(), "#document-fragment");
        assert!(document.find_all("body").is_empty());
    }

    #[test]
    fn test_parse_bytes_rejects_invalid_utf8() {
        let err = parse_bytes(&[0x3c, 0x70, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, ConvertError::Parse(_)));

        let document = parse_bytes(b"<p>ok</p>").unwrap();
        assert_eq!(document.root().text(), "ok");
    }
}
