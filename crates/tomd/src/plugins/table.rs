//! Pipe tables, plus a degraded rendering for targets without table syntax.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::rules::Rule;
use crate::selection::{Document, Selection};
use crate::service::Converter;

static NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\r?\n)+").expect("valid regex"));

/// Render tables with pipes and a divider row.
///
/// Captions are moved out of the table so they render as a paragraph after
/// it. Tables without any header get an empty one, since a pipe table needs
/// a header row to be recognised.
pub fn table() -> impl FnOnce(&Converter) -> Vec<Rule> {
    |converter: &Converter| {
        converter.before(move_captions_after_tables);

        vec![
            Rule::for_tag("table", |content, node, _| {
                let mut content = content.to_string();
                let has_header = node.find("thead").next().is_some() || node.find("th").next().is_some();
                if !has_header {
                    let columns = node
                        .find("tr")
                        .map(|row| row.element_children().count())
                        .max()
                        .unwrap_or(0);
                    let header = format!("|{}", "     |".repeat(columns));
                    let divider = format!("|{}", " --- |".repeat(columns));
                    content = format!("{header}\n{divider}{content}");
                }
                Some(format!("\n\n{content}\n\n"))
            }),
            Rule::for_tags(&["th", "td"], |content, node, _| Some(cell_content(content, node))),
            Rule::for_tag("tr", |content, node, _| {
                let mut text = format!("\n{content}");
                if is_heading_row(node) {
                    let borders: String = node
                        .element_children()
                        .map(|cell| cell_content(alignment_border(cell.attr("align")), cell))
                        .collect();
                    if !borders.is_empty() {
                        text.push('\n');
                        text.push_str(&borders);
                    }
                }
                Some(text)
            }),
        ]
    }
}

/// Render table cells as text separated by ` · `, one blank line per row.
pub fn table_compat() -> impl FnOnce(&Converter) -> Vec<Rule> {
    |_: &Converter| {
        vec![
            Rule::for_tags(&["td", "th"], |content, node, _| {
                let content = content.trim();
                if content.is_empty() {
                    return Some(String::new());
                }
                let next_has_text = node
                    .next_element_sibling()
                    .is_some_and(|next| (next.is("td") || next.is("th")) && !next.text().trim().is_empty());
                if next_has_text {
                    Some(format!("{content} · "))
                } else {
                    Some(content.to_string())
                }
            }),
            Rule::for_tag("tr", |content, _, _| Some(format!("{content}\n\n"))),
        ]
    }
}

fn move_captions_after_tables(doc: &mut Document) {
    for caption in doc.find_all("caption") {
        let table = doc
            .get(caption)
            .and_then(|c| c.parent())
            .filter(|p| p.is("table"))
            .map(|p| p.id());
        if let Some(table) = table {
            doc.insert_after(table, caption);
        }
    }
}

fn alignment_border(align: Option<&str>) -> &'static str {
    match align {
        Some("left") => ":--",
        Some("right") => "--:",
        Some("center") => ":-:",
        _ => "---",
    }
}

/// A row is a heading row when it sits in a `<thead>`, or when it is the
/// first row of the table (or of a leading `<tbody>`) and every cell is `<th>`.
fn is_heading_row(row: Selection<'_>) -> bool {
    let Some(parent) = row.parent() else {
        return false;
    };
    if parent.is("thead") {
        return true;
    }

    let table_or_first_body = parent.is("table") || (parent.is("tbody") && parent.is_first_element_child());
    table_or_first_body
        && row.element_children().all(|cell| cell.is("th"))
        && row.is_first_element_child()
}

/// Trimmed cell text framed with pipes. Newlines become `<br>` unless the
/// cell holds a nested table.
fn cell_content(content: &str, cell: Selection<'_>) -> String {
    let content = content.trim();
    let content = if cell.find("table").next().is_none() {
        NEWLINES.replace_all(content, "<br>")
    } else {
        content.into()
    };

    let prefix = if cell.is_first_element_child() { "| " } else { " " };
    format!("{prefix}{content} |")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(html: &str) -> String {
        let converter = Converter::default();
        converter.use_plugin(table());
        converter.convert(html).unwrap()
    }

    #[test]
    fn test_table_with_thead() {
        let html = "<table>
            <thead><tr><th>Name</th><th>Age</th></tr></thead>
            <tbody><tr><td>Ann</td><td>31</td></tr></tbody>
        </table>";
        assert_eq!(convert(html), "| Name | Age |\n| --- | --- |\n| Ann | 31 |");
    }

    #[test]
    fn test_first_row_of_th_is_heading() {
        let html = "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>";
        assert_eq!(convert(html), "| A | B |\n| --- | --- |\n| 1 | 2 |");
    }

    #[test]
    fn test_alignment_tokens() {
        let html = r#"<table><tr><th align="left">L</th><th align="center">C</th><th align="right">R</th><th>N</th></tr></table>"#;
        assert_eq!(convert(html), "| L | C | R | N |\n| :-- | :-: | --: | --- |");
    }

    #[test]
    fn test_headerless_table_gets_empty_header() {
        let html = "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td><td>e</td></tr></table>";
        assert_eq!(
            convert(html),
            "|     |     |     |\n| --- | --- | --- |\n| a | b |\n| c | d | e |"
        );
    }

    #[test]
    fn test_multiline_cell_uses_br() {
        let html = "<table><tr><th>H</th></tr><tr><td><p>one</p><p>two</p></td></tr></table>";
        assert_eq!(convert(html), "| H |\n| --- |\n| one<br>two |");
    }

    #[test]
    fn test_caption_follows_table() {
        let html = "<table><caption>Totals</caption><tr><th>A</th></tr><tr><td>1</td></tr></table>";
        assert_eq!(convert(html), "| A |\n| --- |\n| 1 |\n\nTotals");
    }

    #[test]
    fn test_heading_row_detection() {
        let doc = Document::parse(
            "<table><tbody><tr><th>a</th></tr><tr><th>b</th></tr></tbody><tbody><tr><th>c</th></tr></tbody></table>",
        );
        let rows: Vec<bool> = doc
            .find_all("tr")
            .into_iter()
            .map(|id| is_heading_row(doc.get(id).unwrap()))
            .collect();
        assert_eq!(rows, vec![true, false, false]);
    }

    #[test]
    fn test_table_compat() {
        let converter = Converter::default();
        converter.use_plugin(table_compat());
        let html = "<table><tr><th>Name</th><th>Age</th><th> </th></tr><tr><td>Ann</td><td>31</td></tr></table>";
        assert_eq!(converter.convert(html).unwrap(), "Name · Age\n\nAnn · 31");
    }
}
