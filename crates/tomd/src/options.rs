//! Conversion options.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ego_tree::NodeId;
use url::Url;

use crate::selection::Selection;
use crate::ConvertError;

/// Turns a possibly relative URL into the URL written to the output.
///
/// Arguments are the element carrying the URL, the raw URL and the domain
/// the converter was created with.
pub type AbsoluteUrlFn = Arc<dyn Fn(&Selection<'_>, &str, &str) -> String + Send + Sync>;

/// Picks the language tag for a fenced code block from the `<pre>` element
/// and its text. Returning `None` falls back to class-based detection.
pub type CodeLanguageFn = Arc<dyn Fn(&Selection<'_>, &str) -> Option<String> + Send + Sync>;

macro_rules! option_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl FromStr for $name {
            type Err = ConvertError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ConvertError::InvalidOption(format!(
                        "unknown {} `{}`",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

option_enum!(
    /// Heading style options
    HeadingStyle {
        /// Prefix with `#` characters
        #[default]
        Atx => "atx",
        /// Underline with `=` or `-` (levels 1 and 2 only)
        Setext => "setext",
    }
);

option_enum!(
    /// Code block style options
    CodeBlockStyle {
        /// Indent by four spaces
        #[default]
        Indented => "indented",
        /// Wrap in a fence
        Fenced => "fenced",
    }
);

option_enum!(
    /// Link style options
    LinkStyle {
        /// `[text](url)`
        #[default]
        Inlined => "inlined",
        /// `[text][ref]` with the definition in the footer
        Referenced => "referenced",
    }
);

option_enum!(
    /// Reference style for referenced links
    LinkReferenceStyle {
        #[default]
        Full => "full",
        Collapsed => "collapsed",
        Shortcut => "shortcut",
    }
);

option_enum!(
    /// How text content is escaped
    EscapeMode {
        /// Escape characters that would otherwise start Markdown syntax
        #[default]
        Basic => "basic",
        /// Emit text unchanged
        Disabled => "disabled",
    }
);

/// Options for a [`Converter`](crate::Converter).
///
/// Read-only for the duration of a conversion.
#[derive(Clone)]
pub struct Options {
    /// Heading style (atx or setext)
    pub heading_style: HeadingStyle,

    /// Horizontal rule string
    pub horizontal_rule: String,

    /// Bullet list marker (`-`, `+` or `*`)
    pub bullet_list_marker: char,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Fence string for fenced code blocks; its first character is repeated
    /// as often as the content requires
    pub fence: String,

    /// Emphasis delimiter (`_` or `*`)
    pub em_delimiter: char,

    /// Strong delimiter (`**` or `__`)
    pub strong_delimiter: String,

    pub link_style: LinkStyle,

    pub link_reference_style: LinkReferenceStyle,

    pub escape_mode: EscapeMode,

    /// Resolves `href`/`src` values
    pub get_absolute_url: AbsoluteUrlFn,

    /// Optional language detection for fenced code blocks
    pub get_code_block_language: Option<CodeLanguageFn>,

    pub(crate) domain: String,

    /// Full-style reference numbers, filled in for one conversion at a time
    pub(crate) link_ordinals: Option<Arc<HashMap<NodeId, usize>>>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// The domain relative URLs are resolved against.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_heading_style(mut self, style: HeadingStyle) -> Self {
        self.heading_style = style;
        self
    }

    pub fn with_bullet_list_marker(mut self, marker: char) -> Self {
        self.bullet_list_marker = marker;
        self
    }

    pub fn with_code_block_style(mut self, style: CodeBlockStyle) -> Self {
        self.code_block_style = style;
        self
    }

    pub fn with_fence(mut self, fence: impl Into<String>) -> Self {
        self.fence = fence.into();
        self
    }

    pub fn with_link_style(mut self, style: LinkStyle) -> Self {
        self.link_style = style;
        self
    }

    pub fn with_link_reference_style(mut self, style: LinkReferenceStyle) -> Self {
        self.link_reference_style = style;
        self
    }

    pub fn with_escape_mode(mut self, mode: EscapeMode) -> Self {
        self.escape_mode = mode;
        self
    }

    /// Resolve `raw` through the configured URL function.
    pub fn absolute_url(&self, selection: &Selection<'_>, raw: &str) -> String {
        (self.get_absolute_url)(selection, raw, &self.domain)
    }

    pub(crate) fn with_link_ordinals(mut self, ordinals: HashMap<NodeId, usize>) -> Self {
        self.link_ordinals = Some(Arc::new(ordinals));
        self
    }

    /// Precomputed reference number of a link, when the conversion has one.
    pub(crate) fn link_ordinal(&self, id: NodeId) -> Option<usize> {
        self.link_ordinals.as_ref()?.get(&id).copied()
    }

    /// First character of the fence string, backtick when unset.
    pub fn fence_char(&self) -> char {
        self.fence.chars().next().unwrap_or('`')
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Atx,
            horizontal_rule: "* * *".to_string(),
            bullet_list_marker: '-',
            code_block_style: CodeBlockStyle::Indented,
            fence: "```".to_string(),
            em_delimiter: '_',
            strong_delimiter: "**".to_string(),
            link_style: LinkStyle::Inlined,
            link_reference_style: LinkReferenceStyle::Full,
            escape_mode: EscapeMode::Basic,
            get_absolute_url: Arc::new(default_absolute_url),
            get_code_block_language: None,
            domain: String::new(),
            link_ordinals: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("heading_style", &self.heading_style)
            .field("horizontal_rule", &self.horizontal_rule)
            .field("bullet_list_marker", &self.bullet_list_marker)
            .field("code_block_style", &self.code_block_style)
            .field("fence", &self.fence)
            .field("em_delimiter", &self.em_delimiter)
            .field("strong_delimiter", &self.strong_delimiter)
            .field("link_style", &self.link_style)
            .field("link_reference_style", &self.link_reference_style)
            .field("escape_mode", &self.escape_mode)
            .field("get_code_block_language", &self.get_code_block_language.is_some())
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

/// Default URL resolution: relative URLs are placed on `http://<domain>`.
///
/// URLs are returned unchanged when no domain is configured, when they are
/// `data:` URIs, when they are already absolute, or when they cannot be
/// resolved at all.
pub fn default_absolute_url(_selection: &Selection<'_>, raw: &str, domain: &str) -> String {
    if domain.is_empty() {
        return raw.to_string();
    }

    match Url::parse(raw) {
        Ok(_) => raw.to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{domain}/"))
            .and_then(|base| base.join(raw))
            .map(String::from)
            .unwrap_or_else(|_| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Document;

    fn resolve(raw: &str, domain: &str) -> String {
        let doc = Document::parse("<a>x</a>");
        default_absolute_url(&doc.root(), raw, domain)
    }

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.heading_style, HeadingStyle::Atx);
        assert_eq!(options.bullet_list_marker, '-');
        assert_eq!(options.horizontal_rule, "* * *");
        assert_eq!(options.fence_char(), '`');
        assert_eq!(options.domain(), "");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("setext".parse::<HeadingStyle>().unwrap(), HeadingStyle::Setext);
        assert_eq!("Fenced".parse::<CodeBlockStyle>().unwrap(), CodeBlockStyle::Fenced);
        assert_eq!("shortcut".parse::<LinkReferenceStyle>().unwrap(), LinkReferenceStyle::Shortcut);
        assert!(matches!(
            "loud".parse::<EscapeMode>(),
            Err(ConvertError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(resolve("/page.html", ""), "/page.html");
        assert_eq!(resolve("/page.html", "example.com"), "http://example.com/page.html");
        assert_eq!(resolve("page.html", "example.com"), "http://example.com/page.html");
        assert_eq!(resolve("https://other.org/a", "example.com"), "https://other.org/a");
        assert_eq!(resolve("data:image/png;base64,AAAA", "example.com"), "data:image/png;base64,AAAA");
    }
}
