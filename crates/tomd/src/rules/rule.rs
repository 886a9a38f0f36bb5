//! Rule and Filter types for HTML conversion.

use std::fmt;
use std::sync::Arc;

use crate::accumulator::AdvancedResult;
use crate::options::Options;
use crate::selection::Selection;

/// Simple replacement: `(content, node, options)`, `None` to defer to an
/// older rule for the same tag.
pub type ReplacementFn = dyn Fn(&str, Selection<'_>, &Options) -> Option<String> + Send + Sync;

/// Advanced replacement, able to emit header and footer text.
pub type AdvancedReplacementFn =
    dyn Fn(&str, Selection<'_>, &Options) -> Option<AdvancedResult> + Send + Sync;

/// The two shapes a rule's replacement can take.
pub enum Replacement {
    Simple(Box<ReplacementFn>),
    Advanced(Box<AdvancedReplacementFn>),
}

impl Replacement {
    /// Run the replacement. `None` means the rule skipped this node.
    pub fn apply(&self, content: &str, node: Selection<'_>, options: &Options) -> Option<AdvancedResult> {
        match self {
            Replacement::Simple(f) => f(content, node, options).map(AdvancedResult::markdown),
            Replacement::Advanced(f) => f(content, node, options),
        }
    }
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacement::Simple(_) => f.write_str("Replacement::Simple"),
            Replacement::Advanced(_) => f.write_str("Replacement::Advanced"),
        }
    }
}

/// The set of tag names a rule applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter(Vec<String>);

impl Filter {
    /// Create a filter for a single tag
    pub fn tag(name: &str) -> Self {
        Filter(vec![name.to_lowercase()])
    }

    /// Create a filter for multiple tags
    pub fn tags(names: &[&str]) -> Self {
        Filter(names.iter().map(|s| s.to_lowercase()).collect())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// A rule defines how matching HTML nodes are converted to Markdown
#[derive(Debug, Clone)]
pub struct Rule {
    pub filter: Filter,
    pub replacement: Arc<Replacement>,
}

impl Rule {
    /// Create a rule with a simple replacement
    pub fn new<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&str, Selection<'_>, &Options) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            filter,
            replacement: Arc::new(Replacement::Simple(Box::new(replacement))),
        }
    }

    /// Create a rule with an advanced replacement
    pub fn advanced<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&str, Selection<'_>, &Options) -> Option<AdvancedResult> + Send + Sync + 'static,
    {
        Self {
            filter,
            replacement: Arc::new(Replacement::Advanced(Box::new(replacement))),
        }
    }

    /// Create a rule that matches a single tag
    pub fn for_tag<F>(tag: &str, replacement: F) -> Self
    where
        F: Fn(&str, Selection<'_>, &Options) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    /// Create a rule that matches multiple tags
    pub fn for_tags<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&str, Selection<'_>, &Options) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    /// Apply this rule's replacement
    pub fn replace(&self, content: &str, node: Selection<'_>, options: &Options) -> Option<AdvancedResult> {
        self.replacement.apply(content, node, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Document;

    #[test]
    fn test_filter_matches_case_insensitively() {
        let filter = Filter::tags(&["DEL", "s"]);
        assert!(filter.matches("del"));
        assert!(filter.matches("S"));
        assert!(!filter.matches("strike"));
        assert_eq!(filter.names(), ["del", "s"]);
    }

    #[test]
    fn test_simple_and_advanced_replacements() {
        let doc = Document::parse("<p>x</p>");
        let options = Options::default();

        let simple = Rule::for_tag("p", |content, _, _| Some(format!("<{content}>")));
        let result = simple.replace("x", doc.root(), &options).unwrap();
        assert_eq!(result, AdvancedResult::markdown("<x>"));

        let advanced = Rule::advanced(Filter::tag("p"), |content, _, _| {
            Some(AdvancedResult::markdown(content).with_footer("note"))
        });
        let result = advanced.replace("x", doc.root(), &options).unwrap();
        assert_eq!(result.footer, "note");

        let skipping = Rule::for_tag("p", |_, _, _| None);
        assert!(skipping.replace("x", doc.root(), &options).is_none());
    }
}
