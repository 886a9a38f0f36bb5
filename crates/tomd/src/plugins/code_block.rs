//! Code extraction that survives syntax highlighter markup.

use ego_tree::NodeRef;
use scraper::Node;

use crate::rules::Rule;
use crate::selection::Selection;
use crate::service::Converter;
use crate::utilities::{calculate_code_fence, language_from_class, trim_trailing_spaces};

/// Elements followed by a line break when collecting code text
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "tr", "table", "thead", "tbody", "tfoot", "section", "article",
    "blockquote", "pre", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Fenced code blocks from arbitrarily nested `<pre>` markup.
///
/// Highlighters wrap lines in `<div>`s, `<span>`s or whole tables and often
/// add a line number column. Text is collected straight from the tree, line
/// number gutters are dropped, and the language comes from a `language-*` or
/// `lang-*` class on the `<code>` or the `<pre>`.
pub fn robust_code_block() -> impl FnOnce(&Converter) -> Vec<Rule> {
    |_: &Converter| {
        let pre = Rule::for_tag("pre", |_, node, options| {
            let code = node.find("code").next();
            let language = code
                .and_then(|c| c.attr("class"))
                .and_then(language_from_class)
                .or_else(|| node.attr("class").and_then(language_from_class))
                .unwrap_or_default();

            let mut text = String::new();
            collect(node.node(), &mut text);
            let text = text.trim_end_matches('\n');

            let fence = calculate_code_fence(options.fence_char(), text);
            Some(format!("\n\n{fence}{language}\n{text}\n{fence}\n\n"))
        });

        let code = Rule::for_tag("code", |_, node, _| {
            if node.has_ancestor("pre") {
                return None;
            }

            let mut text = String::new();
            collect(node.node(), &mut text);
            let code = trim_trailing_spaces(&text.replace("\r\n", "\n"));

            let fence = inline_fence(&code);
            Some(format!("{fence}{code}{fence}"))
        });

        vec![pre, code]
    }
}

/// Depth-first text of `node`, skipping gutters, with `<br>` and block
/// elements turned into line breaks.
fn collect(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) => {
            if element.attr("class").is_some_and(is_gutter) {
                return;
            }

            let name = Selection::new(node).tag_name();
            if name == "br" {
                out.push('\n');
            }
            for child in node.children() {
                collect(child, out);
            }
            if BLOCK_TAGS.contains(&name) {
                out.push('\n');
            }
        }
        _ => {}
    }
}

fn is_gutter(class: &str) -> bool {
    let class = class.to_lowercase();
    class.contains("gutter") || class.contains("line-numbers")
}

/// Shortest backtick delimiter, up to three, that `code` does not contain.
fn inline_fence(code: &str) -> &'static str {
    if !code.contains('`') {
        "`"
    } else if !code.contains("``") {
        "``"
    } else {
        "```"
    }
}
