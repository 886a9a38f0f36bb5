//! Converter - the main entry point for HTML to Markdown conversion.

use std::borrow::Cow;
use std::io::Read;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::accumulator::AdvancedResult;
use crate::html::parse_bytes;
use crate::options::{LinkReferenceStyle, LinkStyle, Options};
use crate::rules::commonmark::{commonmark_rules, link_ordinals, DEFAULT_REMOVED};
use crate::rules::{Rule, Rules};
use crate::selection::{Document, Selection};
use crate::utilities::{collapse_newlines, escape_markdown, trim_block};
use crate::Result;

/// Callback run on the parsed tree before rendering starts.
pub type BeforeHook = Arc<dyn Fn(&mut Document) + Send + Sync>;

/// Callback run on the finished Markdown.
pub type AfterHook = Arc<dyn Fn(String) -> String + Send + Sync>;

/// Converts HTML to Markdown.
///
/// Build one converter, install plugins, then share it: every method takes
/// `&self`, and conversions only read the registry.
pub struct Converter {
    options: Options,
    rules: Rules,
    before: RwLock<Vec<BeforeHook>>,
    after: RwLock<Vec<AfterHook>>,
}

impl Converter {
    /// Create a converter.
    ///
    /// `domain` resolves relative URLs, `enable_commonmark` installs the
    /// default rule set, and `options` overrides the default options.
    pub fn new(domain: &str, enable_commonmark: bool, options: Option<Options>) -> Self {
        let options = options.unwrap_or_default().with_domain(domain);
        Self::build(options, enable_commonmark)
    }

    /// Create a converter with the default rules and custom options
    pub fn with_options(options: Options) -> Self {
        Self::build(options, true)
    }

    fn build(options: Options, enable_commonmark: bool) -> Self {
        let converter = Self {
            options,
            rules: Rules::new(),
            before: RwLock::default(),
            after: RwLock::default(),
        };
        if enable_commonmark {
            converter.add_rules(commonmark_rules());
            converter.remove(DEFAULT_REMOVED);
        }
        converter
    }

    /// Get the options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Get the rule registry
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Add a rule. It takes precedence over every rule registered earlier
    /// for the same tags, unless it skips.
    pub fn add_rule(&self, rule: Rule) -> &Self {
        self.rules.add(rule);
        self
    }

    pub fn add_rules(&self, rules: impl IntoIterator<Item = Rule>) -> &Self {
        for rule in rules {
            self.rules.add(rule);
        }
        self
    }

    /// Keep elements as HTML when no rule handles them
    pub fn keep(&self, tags: &[&str]) -> &Self {
        self.rules.keep(tags);
        self
    }

    /// Remove elements together with their content
    pub fn remove(&self, tags: &[&str]) -> &Self {
        self.rules.remove(tags);
        self
    }

    /// Register a hook that may restructure the tree before rendering.
    /// Hooks run in registration order.
    pub fn before<F>(&self, hook: F) -> &Self
    where
        F: Fn(&mut Document) + Send + Sync + 'static,
    {
        self.before.write().push(Arc::new(hook));
        self
    }

    /// Register a hook that rewrites the final Markdown
    pub fn after<F>(&self, hook: F) -> &Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        self.after.write().push(Arc::new(hook));
        self
    }

    /// Apply a plugin and register the rules it returns
    pub fn use_plugin<P>(&self, plugin: P) -> &Self
    where
        P: FnOnce(&Converter) -> Vec<Rule>,
    {
        let rules = plugin(self);
        tracing::debug!(rules = rules.len(), "installing plugin rules");
        self.add_rules(rules)
    }

    /// Escape markdown special characters in a string
    pub fn escape(&self, text: &str) -> String {
        escape_markdown(text)
    }

    /// Convert an HTML string to Markdown
    pub fn convert(&self, html: &str) -> Result<String> {
        let mut document = Document::parse(html);
        Ok(self.convert_document(&mut document))
    }

    /// Convert UTF-8 encoded HTML to Markdown
    pub fn convert_bytes(&self, bytes: &[u8]) -> Result<String> {
        let mut document = parse_bytes(bytes)?;
        Ok(self.convert_document(&mut document))
    }

    /// Read UTF-8 encoded HTML from `reader` and convert it
    pub fn convert_reader<R: Read>(&self, mut reader: R) -> Result<String> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.convert_bytes(&bytes)
    }

    /// Run the hooks on `document`, then render it
    pub fn convert_document(&self, document: &mut Document) -> String {
        let hooks = self.before.read().clone();
        for (i, hook) in hooks.iter().enumerate() {
            tracing::trace!(hook = i, "running before hook");
            hook(document);
        }

        let options = self.conversion_options(document);
        let result = self.render_root(document.root(), &options);
        let mut markdown = assemble(&result);

        let hooks = self.after.read().clone();
        for hook in &hooks {
            markdown = hook(markdown);
        }

        tracing::debug!(
            header = result.header.len(),
            footer = result.footer.len(),
            output = markdown.len(),
            "converted document"
        );
        markdown
    }

    /// Options for one conversion. Full-style reference numbers are computed
    /// here in a single pass over the finished tree.
    fn conversion_options(&self, document: &Document) -> Cow<'_, Options> {
        let numbered = self.options.link_style == LinkStyle::Referenced
            && self.options.link_reference_style == LinkReferenceStyle::Full;
        if !numbered {
            return Cow::Borrowed(&self.options);
        }
        let ordinals = link_ordinals(document.root());
        tracing::trace!(links = ordinals.len(), "numbered reference links");
        Cow::Owned(self.options.clone().with_link_ordinals(ordinals))
    }

    /// Render the children of `node` in document order.
    fn render_children(&self, node: Selection<'_>, options: &Options) -> AdvancedResult {
        let mut result = AdvancedResult::default();
        let mut markdown = String::new();

        for child in node.children() {
            let tag = child.tag_name();
            if self.rules.is_removed(tag) {
                continue;
            }

            let mut content = self.render_children(child, options);
            if child.is_text() {
                content.markdown = child.text();
            }
            result.accumulate(&content);

            match self.rules.apply(tag, &content.markdown, child, options) {
                Some(replaced) => {
                    result.accumulate(&replaced);
                    markdown.push_str(&replaced.markdown);
                }
                None => markdown.push_str(&content.markdown),
            }
        }

        result.markdown = markdown;
        result
    }

    /// Render `root` itself: its children, then any rule for its own tag.
    fn render_root(&self, root: Selection<'_>, options: &Options) -> AdvancedResult {
        let content = self.render_children(root, options);
        let mut result = AdvancedResult {
            header: content.header,
            footer: content.footer,
            markdown: String::new(),
        };

        match self.rules.apply(root.tag_name(), &content.markdown, root, options) {
            Some(replaced) => {
                result.accumulate(&replaced);
                result.markdown = replaced.markdown;
            }
            None => result.markdown = content.markdown,
        }
        result
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new("", true, None)
    }
}

/// Header, body and footer separated by blank lines, with runs of blank
/// lines collapsed.
fn assemble(result: &AdvancedResult) -> String {
    let document = format!(
        "{}\n\n{}\n\n{}",
        result.header.trim(),
        trim_block(&result.markdown),
        result.footer.trim()
    );
    collapse_newlines(&document).trim_matches('\n').to_string()
}
