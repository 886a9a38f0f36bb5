//! CommonMark rules for HTML to Markdown conversion.

use std::collections::HashMap;

use ego_tree::{NodeId, NodeRef};
use scraper::Node;

use super::{Filter, Rule};
use crate::accumulator::AdvancedResult;
use crate::options::{
    CodeBlockStyle, EscapeMode, HeadingStyle, LinkReferenceStyle, LinkStyle, Options,
};
use crate::selection::Selection;
use crate::utilities::{
    calculate_code_fence, collapse_newlines, collapse_whitespace, escape_markdown, indent_lines,
    is_inline_element, language_from_class, longest_run, trim_block,
};

/// Tags whose content never reaches the output
pub const DEFAULT_REMOVED: &[&str] = &["head", "script", "style", "template", "noscript"];

/// Create all CommonMark rules
pub fn commonmark_rules() -> Vec<Rule> {
    vec![
        text_rule(),
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        list_item_rule(),
        code_block_rule(),
        horizontal_rule(),
        link_rule(),
        emphasis_rule(),
        strong_rule(),
        code_rule(),
        image_rule(),
    ]
}

fn text_rule() -> Rule {
    Rule::for_tag("#text", |_, node, options| {
        let text = node.text();
        if node.has_ancestor("pre") {
            return Some(text);
        }

        if text.trim().is_empty() {
            let separator = if between_inline_content(node) { " " } else { "" };
            return Some(separator.to_string());
        }

        let collapsed = collapse_whitespace(&text);
        Some(match options.escape_mode {
            EscapeMode::Basic => escape_markdown(&collapsed),
            EscapeMode::Disabled => collapsed,
        })
    })
}

/// Whitespace between two inline siblings separates words; anywhere else it
/// is formatting noise.
fn between_inline_content(node: Selection<'_>) -> bool {
    let inline = |sibling: Option<Selection<'_>>| {
        sibling.is_some_and(|s| s.is_text() || is_inline_element(s.tag_name()))
    };
    inline(node.prev_sibling()) && inline(node.next_sibling())
}

fn paragraph_rule() -> Rule {
    Rule::for_tags(&["p", "div"], |content, node, _| {
        let content = trim_block(content);
        if content.is_empty() {
            return Some(String::new());
        }

        let tight = node
            .parent()
            .is_some_and(|p| p.is("li") || is_inline_element(p.tag_name()));
        if tight {
            Some(format!("\n{content}\n"))
        } else {
            Some(format!("\n\n{content}\n\n"))
        }
    })
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, _| Some("  \n".to_string()))
}

fn heading_rule() -> Rule {
    Rule::for_tags(&["h1", "h2", "h3", "h4", "h5", "h6"], |content, node, options| {
        let level: usize = node.tag_name()[1..].parse().unwrap_or(1);

        let content = content.replace('\n', " ");
        let content = content.trim();
        if content.is_empty() {
            return Some(String::new());
        }

        match options.heading_style {
            HeadingStyle::Setext if level <= 2 => {
                let underline = if level == 1 { "=" } else { "-" };
                Some(format!(
                    "\n\n{}\n{}\n\n",
                    content,
                    underline.repeat(content.chars().count())
                ))
            }
            _ => Some(format!("\n\n{} {}\n\n", "#".repeat(level), content)),
        }
    })
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |content, _, _| {
        let content = collapse_newlines(trim_block(content));
        if content.is_empty() {
            return Some(String::new());
        }
        let quoted: Vec<String> = content
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {line}")
                }
            })
            .collect();
        Some(format!("\n\n{}\n\n", quoted.join("\n")))
    })
}

fn list_rule() -> Rule {
    Rule::for_tags(&["ul", "ol"], |content, node, _| {
        let body = content.trim_end().trim_start_matches('\n');
        if body.trim().is_empty() {
            return Some(String::new());
        }

        match node.parent() {
            // Nested in an item: the item indents it
            Some(parent) if parent.is("li") => Some(format!("\n{body}")),
            // A list directly inside a list: indent it here
            Some(parent) if parent.is("ul") || parent.is("ol") => {
                Some(format!("    {}\n", indent_lines(body, "    ")))
            }
            _ => Some(format!("\n\n{body}\n\n")),
        }
    })
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |content, node, options| {
        let body = content.trim();
        if body.is_empty() {
            return Some(String::new());
        }

        // An item holding nothing but a nested list gets no marker of its
        // own; the list stays one level deeper than its siblings
        if wraps_list_only(node) {
            return Some(format!("    {}\n", indent_lines(body, "    ")));
        }

        let prefix = match node.parent() {
            Some(list) if list.is("ol") => {
                let start = list
                    .attr("start")
                    .and_then(|s| s.trim().parse::<i64>().ok())
                    .unwrap_or(1);
                // Counts every element sibling, not only <li>
                let index = i64::try_from(node.index()).unwrap_or(i64::MAX);
                format!("{}. ", start.saturating_add(index))
            }
            _ => format!("{} ", options.bullet_list_marker),
        };

        Some(format!("{prefix}{}\n", indent_lines(body, "    ")))
    })
}

fn wraps_list_only(node: Selection<'_>) -> bool {
    node.children()
        .find(|c| !(c.is_text() && c.text().trim().is_empty()))
        .is_some_and(|first| first.is("ul") || first.is("ol"))
}

fn code_block_rule() -> Rule {
    Rule::for_tag("pre", |_, node, options| {
        let code_node = node.element_children().find(|c| c.is("code"));
        let code = code_node.unwrap_or(node).text();
        let code = code.trim_end_matches('\n');

        match options.code_block_style {
            CodeBlockStyle::Indented => {
                if code.is_empty() {
                    return Some(String::new());
                }
                let indented: Vec<String> = code.split('\n').map(|l| format!("    {l}")).collect();
                Some(format!("\n\n{}\n\n", indented.join("\n")))
            }
            CodeBlockStyle::Fenced => {
                let language = options
                    .get_code_block_language
                    .as_ref()
                    .and_then(|detect| detect(&node, code))
                    .or_else(|| code_node.and_then(|c| c.attr("class")).and_then(language_from_class))
                    .unwrap_or_default();

                let fence = calculate_code_fence(options.fence_char(), code);
                Some(format!("\n\n{fence}{language}\n{code}\n{fence}\n\n"))
            }
        }
    })
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, options| {
        Some(format!("\n\n{}\n\n", options.horizontal_rule))
    })
}

fn link_rule() -> Rule {
    Rule::advanced(Filter::tag("a"), |content, node, options| {
        let href = node.attr("href").map(str::trim).unwrap_or_default();
        if href.is_empty() {
            return Some(AdvancedResult::markdown(content));
        }

        let text = content.trim();
        if text.is_empty() {
            return Some(AdvancedResult::default());
        }
        let (lead, trail) = outer_spaces(content);

        let href = options.absolute_url(&node, href);
        let title = title_part(node.attr("title"));

        let result = match options.link_style {
            LinkStyle::Inlined => {
                AdvancedResult::markdown(format!("{lead}[{text}]({href}{title}){trail}"))
            }
            LinkStyle::Referenced => {
                let (reference, definition) = match options.link_reference_style {
                    LinkReferenceStyle::Full => {
                        let n = link_number(node, options);
                        (format!("[{text}][{n}]"), format!("[{n}]: {href}{title}"))
                    }
                    LinkReferenceStyle::Collapsed => {
                        (format!("[{text}][]"), format!("[{text}]: {href}{title}"))
                    }
                    LinkReferenceStyle::Shortcut => {
                        (format!("[{text}]"), format!("[{text}]: {href}{title}"))
                    }
                };
                AdvancedResult::markdown(format!("{lead}{reference}{trail}")).with_footer(definition)
            }
        };
        Some(result)
    })
}

/// Reference number of a link: its 1-based position among all `a[href]`
/// elements of the document.
fn link_number(node: Selection<'_>, options: &Options) -> usize {
    if let Some(n) = options.link_ordinal(node.id()) {
        return n;
    }
    let link = node.node();
    let root = link.ancestors().last().unwrap_or(link);
    let before = root
        .descendants()
        .take_while(|n| n.id() != link.id())
        .filter(|n| is_reference_link(*n))
        .count();
    before + 1
}

/// Reference numbers for every `a[href]` under `root`, in one pass.
pub(crate) fn link_ordinals(root: Selection<'_>) -> HashMap<NodeId, usize> {
    root.node()
        .descendants()
        .filter(|n| is_reference_link(*n))
        .enumerate()
        .map(|(i, n)| (n.id(), i + 1))
        .collect()
}

fn is_reference_link(node: NodeRef<'_, Node>) -> bool {
    node.value().as_element().is_some_and(|e| {
        e.name() == "a" && e.attr("href").is_some_and(|h| !h.trim().is_empty())
    })
}

fn title_part(title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => format!(" \"{}\"", t.replace('"', "\\\"")),
        _ => String::new(),
    }
}

/// Leading and trailing space to keep outside of inline delimiters.
fn outer_spaces(content: &str) -> (&'static str, &'static str) {
    let lead = if content.starts_with(char::is_whitespace) { " " } else { "" };
    let trail = if content.ends_with(char::is_whitespace) { " " } else { "" };
    (lead, trail)
}

fn delimit(content: &str, delimiter: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return content.to_string();
    }
    let (lead, trail) = outer_spaces(content);
    format!("{lead}{delimiter}{trimmed}{delimiter}{trail}")
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |content, _, options| {
        Some(delimit(content, &options.em_delimiter.to_string()))
    })
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |content, _, options| {
        Some(delimit(content, &options.strong_delimiter))
    })
}

fn code_rule() -> Rule {
    Rule::for_tags(&["code", "kbd", "samp", "tt"], |_, node, _| {
        // Code blocks are handled by the <pre> rule
        if node.has_ancestor("pre") {
            return None;
        }

        let code = node.text().replace("\r\n", "\n").replace('\n', " ");
        if code.is_empty() {
            return Some(String::new());
        }

        let backticks = "`".repeat(longest_run('`', &code) + 1);
        if code.starts_with('`') || code.ends_with('`') {
            Some(format!("{backticks} {code} {backticks}"))
        } else {
            Some(format!("{backticks}{code}{backticks}"))
        }
    })
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |_, node, options| {
        let src = node.attr("src").map(str::trim).unwrap_or_default();
        if src.is_empty() {
            return Some(String::new());
        }

        let alt = node
            .attr("alt")
            .map(|a| collapse_whitespace(a.trim()))
            .unwrap_or_default();
        let src = options.absolute_url(&node, src);
        let title = title_part(node.attr("title"));

        Some(format!("![{alt}]({src}{title})"))
    })
}
