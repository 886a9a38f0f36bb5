//! Rule registry for HTML to Markdown conversion.
//!
//! Rules are stored per tag name in registration order. Lookups happen on
//! every node of every conversion, so the table sits behind a read-write
//! lock: registration takes the write side, rendering the read side.

pub(crate) mod commonmark;
mod rule;

pub use rule::{AdvancedReplacementFn, Filter, Replacement, ReplacementFn, Rule};

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::accumulator::AdvancedResult;
use crate::options::Options;
use crate::selection::Selection;

/// Outcome of looking up a tag.
#[derive(Debug, Clone)]
pub enum Resolved {
    /// The tag's subtree is dropped.
    Removed,
    /// Replacements in registration order; empty means pass-through.
    Replacements(Vec<Arc<Replacement>>),
}

#[derive(Default)]
struct RuleTable {
    rules: IndexMap<String, Vec<Arc<Replacement>>>,
    keep: IndexSet<String>,
    remove: IndexSet<String>,
}

/// Collection of rules for conversion
#[derive(Default)]
pub struct Rules {
    table: RwLock<RuleTable>,
}

/// Renders a kept element as its original markup.
static KEEP_REPLACEMENT: Lazy<Arc<Replacement>> = Lazy::new(|| {
    Arc::new(Replacement::Simple(Box::new(
        |_: &str, node: Selection<'_>, _: &Options| Some(keep_replacement(node)),
    )))
});

impl Rules {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule for every tag in its filter
    pub fn add(&self, rule: Rule) {
        let mut table = self.table.write();
        for tag in rule.filter.names() {
            table
                .rules
                .entry(tag.clone())
                .or_default()
                .push(Arc::clone(&rule.replacement));
        }
    }

    /// Render these tags as their original HTML when no rule handles them
    pub fn keep(&self, tags: &[&str]) {
        let mut table = self.table.write();
        table.keep.extend(tags.iter().map(|t| t.to_lowercase()));
    }

    /// Drop these tags together with everything inside them
    pub fn remove(&self, tags: &[&str]) {
        let mut table = self.table.write();
        table.remove.extend(tags.iter().map(|t| t.to_lowercase()));
    }

    /// Check if a tag's subtree should be dropped
    pub fn is_removed(&self, tag: &str) -> bool {
        self.table.read().remove.contains(tag)
    }

    /// Look up the replacements for a tag.
    ///
    /// The returned list is a snapshot; the lock is released before any
    /// replacement runs, so replacements may safely use the registry.
    pub fn resolve(&self, tag: &str) -> Resolved {
        let table = self.table.read();
        match table.rules.get(tag) {
            Some(list) if !list.is_empty() => Resolved::Replacements(list.clone()),
            _ if table.keep.contains(tag) => {
                Resolved::Replacements(vec![Arc::clone(&KEEP_REPLACEMENT)])
            }
            _ if table.remove.contains(tag) => Resolved::Removed,
            _ => Resolved::Replacements(Vec::new()),
        }
    }

    /// Apply the best matching rule for `tag`.
    ///
    /// Replacements are tried newest first; the first one that does not skip
    /// wins. `None` means every replacement skipped (or none exist, or the tag
    /// is removed) and the caller should use `content` unchanged.
    pub fn apply(
        &self,
        tag: &str,
        content: &str,
        node: Selection<'_>,
        options: &Options,
    ) -> Option<AdvancedResult> {
        match self.resolve(tag) {
            Resolved::Removed => None,
            Resolved::Replacements(list) => list
                .iter()
                .rev()
                .find_map(|replacement| replacement.apply(content, node, options)),
        }
    }

    /// Number of replacements registered for a tag
    pub fn count(&self, tag: &str) -> usize {
        self.table.read().rules.get(tag).map_or(0, Vec::len)
    }
}

/// Re-serialise a kept element; failures are logged and yield nothing.
pub fn keep_replacement(node: Selection<'_>) -> String {
    match node.outer_html() {
        Ok(html) => html,
        Err(err) => {
            tracing::warn!(tag = node.tag_name(), error = %err, "failed to render kept element as html");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Document;

    fn apply(rules: &Rules, tag: &str) -> Option<String> {
        let doc = Document::parse("<p>x</p>");
        let p = doc.get(doc.find_all("p")[0]).unwrap();
        rules
            .apply(tag, "content", p, &Options::default())
            .map(|r| r.markdown)
    }

    #[test]
    fn test_newest_rule_wins() {
        let rules = Rules::new();
        rules.add(Rule::for_tag("p", |_, _, _| Some("old".to_string())));
        rules.add(Rule::for_tag("p", |_, _, _| Some("new".to_string())));

        assert_eq!(apply(&rules, "p").as_deref(), Some("new"));
        assert_eq!(rules.count("p"), 2);
    }

    #[test]
    fn test_skip_falls_back_to_older_rule() {
        let rules = Rules::new();
        rules.add(Rule::for_tag("p", |_, _, _| Some("old".to_string())));
        rules.add(Rule::for_tag("p", |_, _, _| None));

        assert_eq!(apply(&rules, "p").as_deref(), Some("old"));
    }

    #[test]
    fn test_all_skip_means_pass_through() {
        let rules = Rules::new();
        rules.add(Rule::for_tag("p", |_, _, _| None));
        rules.add(Rule::for_tag("p", |_, _, _| None));

        assert_eq!(apply(&rules, "p"), None);
        assert_eq!(apply(&rules, "span"), None);
    }

    #[test]
    fn test_multi_tag_rule_registers_each_tag() {
        let rules = Rules::new();
        rules.add(Rule::for_tags(&["B", "strong"], |c, _, _| Some(format!("**{c}**"))));

        assert_eq!(rules.count("b"), 1);
        assert_eq!(rules.count("strong"), 1);
    }

    #[test]
    fn test_resolve_removed_and_kept() {
        let rules = Rules::new();
        rules.remove(&["script"]);
        rules.keep(&["p"]);

        assert!(rules.is_removed("script"));
        assert!(matches!(rules.resolve("script"), Resolved::Removed));
        assert_eq!(apply(&rules, "p").as_deref(), Some("<p>x</p>"));
    }

    #[test]
    fn test_registered_rule_beats_keep() {
        let rules = Rules::new();
        rules.keep(&["p"]);
        rules.add(Rule::for_tag("p", |c, _, _| Some(c.to_uppercase())));

        assert_eq!(apply(&rules, "p").as_deref(), Some("CONTENT"));
    }
}
