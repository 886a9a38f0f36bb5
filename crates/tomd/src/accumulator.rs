//! The header / markdown / footer triple threaded through rendering.

/// Result of rendering a subtree.
///
/// `markdown` is the in-place text. `header` and `footer` float to the very
/// start and end of the final document regardless of nesting depth; link
/// definitions for referenced links travel in the footer, for example.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvancedResult {
    pub header: String,
    pub markdown: String,
    pub footer: String,
}

impl AdvancedResult {
    /// A result carrying only in-place markdown.
    pub fn markdown(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    /// Merge another result's header and footer into this one. The other
    /// result's markdown is left for the caller to place.
    pub fn accumulate(&mut self, other: &AdvancedResult) {
        join_block(&mut self.header, &other.header);
        join_block(&mut self.footer, &other.footer);
    }
}

/// Append `addition` to `current`, separated by exactly one blank line.
/// Nothing is inserted when either side is empty.
pub fn join_block(current: &mut String, addition: &str) {
    let addition = addition.trim_matches('\n');
    if addition.is_empty() {
        return;
    }
    if !current.is_empty() {
        let kept = current.trim_end_matches('\n').len();
        current.truncate(kept);
        current.push_str("\n\n");
    }
    current.push_str(addition);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_block_separates_with_one_blank_line() {
        let mut current = "[1]: a\n".to_string();
        join_block(&mut current, "\n\n[2]: b");
        assert_eq!(current, "[1]: a\n\n[2]: b");
    }

    #[test]
    fn test_join_block_skips_empty_sides() {
        let mut current = String::new();
        join_block(&mut current, "first");
        assert_eq!(current, "first");

        join_block(&mut current, "");
        assert_eq!(current, "first");
    }

    #[test]
    fn test_accumulate_ignores_markdown() {
        let mut result = AdvancedResult::markdown("body");
        let other = AdvancedResult::markdown("other").with_header("top").with_footer("bottom");

        result.accumulate(&other);

        assert_eq!(result.markdown, "body");
        assert_eq!(result.header, "top");
        assert_eq!(result.footer, "bottom");
    }
}
