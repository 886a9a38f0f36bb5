//! # tomd
//!
//! Convert HTML documents to Markdown through a pluggable rule engine.
//!
//! ## Design
//!
//! A [`Converter`] owns a registry of rules keyed by tag name. Rendering walks
//! the parsed tree depth first: every node's children are rendered, then the
//! most recently registered rule for the node's tag gets a chance to replace
//! that content. A rule may decline (return `None`), in which case the next
//! older rule for the same tag is tried, down to plain pass-through.
//!
//! Rules may also emit out-of-band text that floats to the very top (header)
//! or bottom (footer) of the document, which is how referenced links place
//! their definitions.
//!
//! - **Plugins**: functions that receive the converter and return extra rules
//!   (tables, robust code blocks, GitHub flavored Markdown).
//! - **Hooks**: callbacks that may restructure the tree before rendering.
//! - **Shareable**: registration takes `&self`; one converter can serve many
//!   threads at once.
//!
//! ## Example
//!
//! ```rust
//! use tomd::Converter;
//!
//! let converter = Converter::default();
//! let markdown = converter.convert("<h1>Hello <em>World</em></h1>").unwrap();
//! assert_eq!(markdown, "# Hello _World_");
//! ```
//!
//! ## Example (plugins)
//!
//! ```rust
//! use tomd::{plugins, Converter};
//!
//! let converter = Converter::default();
//! converter.use_plugin(plugins::github_flavored());
//!
//! let markdown = converter
//!     .convert("<table><tr><th>A</th></tr><tr><td>1</td></tr></table>")
//!     .unwrap();
//! assert_eq!(markdown, "| A |\n| --- |\n| 1 |");
//! ```

mod accumulator;
pub mod html;
mod options;
pub mod plugins;
mod rules;
pub mod selection;
mod service;
mod utilities;

pub use accumulator::AdvancedResult;
pub use html::{parse_fragment, parse_html};
pub use options::{
    default_absolute_url, AbsoluteUrlFn, CodeBlockStyle, CodeLanguageFn, EscapeMode,
    HeadingStyle, LinkReferenceStyle, LinkStyle, Options,
};
pub use rules::{
    AdvancedReplacementFn, Filter, Replacement, ReplacementFn, Resolved, Rule, Rules,
};
pub use selection::{Document, Selection};
pub use service::{AfterHook, BeforeHook, Converter};
pub use utilities::*;

/// Error type for conversions
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
