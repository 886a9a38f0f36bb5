//! Utility functions and constants shared by rules and plugins.

use once_cell::sync::Lazy;
use regex::Regex;

/// Inline (phrasing) HTML elements
pub const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "acronym", "b", "bdo", "big", "br", "button", "cite", "code", "del", "dfn",
    "em", "i", "iframe", "img", "input", "kbd", "label", "map", "mark", "object", "q", "s",
    "samp", "script", "select", "small", "span", "strike", "strong", "sub", "sup", "textarea",
    "tt", "u", "var",
];

/// Check if a tag is an inline element
pub fn is_inline_element(tag: &str) -> bool {
    INLINE_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Context-sensitive escapes, applied in order. `^` anchors at the start of
/// the text being escaped.
static ESCAPES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\\", r"\\"),
        (r"\*", r"\*"),
        (r"^-", r"\-"),
        (r"^\+ ", r"\+ "),
        (r"^(=+)", r"\${1}"),
        (r"^(#{1,6}) ", r"\${1} "),
        (r"`", r"\`"),
        (r"^~~~", r"\~~~"),
        (r"\[", r"\["),
        (r"\]", r"\]"),
        (r"^>", r"\>"),
        (r"_", r"\_"),
        (r"^(\d+)\. ", r"${1}\. "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("valid escape pattern"), replacement))
    .collect()
});

static NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Escape text so it cannot be mistaken for Markdown syntax
pub fn escape_markdown(text: &str) -> String {
    ESCAPES
        .iter()
        .fold(text.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        })
}

/// Collapse every run of whitespace into a single space
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_whitespace = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_was_whitespace {
                result.push(' ');
                prev_was_whitespace = true;
            }
        } else {
            result.push(c);
            prev_was_whitespace = false;
        }
    }

    result
}

/// Replace runs of three or more newlines with exactly two
pub fn collapse_newlines(s: &str) -> String {
    NEWLINE_RUNS.replace_all(s, "\n\n").into_owned()
}

/// Remove trailing spaces and tabs from every line
pub fn trim_trailing_spaces(s: &str) -> String {
    s.split('\n')
        .map(|line| line.trim_end_matches([' ', '\t']))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefix every non-empty line after the first with `indent`
pub fn indent_lines(s: &str, indent: &str) -> String {
    let mut lines = s.split('\n');
    let mut result = lines.next().unwrap_or_default().to_string();
    for line in lines {
        result.push('\n');
        if !line.is_empty() {
            result.push_str(indent);
            result.push_str(line);
        }
    }
    result
}

/// Trim a rendered block: leading blank lines and trailing whitespace go,
/// and the first line loses any indentation too shallow to start a code block.
pub fn trim_block(content: &str) -> &str {
    let trimmed = content.trim_end();
    let leading = trimmed.len() - trimmed.trim_start().len();
    let line_start = trimmed[..leading].rfind('\n').map_or(0, |i| i + 1);
    let rest = &trimmed[line_start..];

    let indent = rest.len() - rest.trim_start_matches(' ').len();
    if indent < 4 {
        rest.trim_start()
    } else {
        rest
    }
}

/// Language named by a `language-*` or `lang-*` token in a class list
pub fn language_from_class(class: &str) -> Option<String> {
    class.split_whitespace().find_map(|token| {
        let token = token.to_lowercase();
        token
            .strip_prefix("language-")
            .or_else(|| token.strip_prefix("lang-"))
            .filter(|lang| !lang.is_empty())
            .map(str::to_string)
    })
}

/// Fence for a code block: one more `fence_char` than the longest run of it
/// inside `content`, and never fewer than three.
pub fn calculate_code_fence(fence_char: char, content: &str) -> String {
    let longest = longest_run(fence_char, content);
    fence_char.to_string().repeat((longest + 1).max(3))
}

/// Length of the longest run of `c` in `s`
pub fn longest_run(c: char, s: &str) -> usize {
    s.chars()
        .fold((0, 0), |(max, current), ch| {
            if ch == c {
                (max.max(current + 1), current + 1)
            } else {
                (max, 0)
            }
        })
        .0
}
