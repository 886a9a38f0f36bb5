//! GitHub flavored Markdown extensions.

use crate::rules::Rule;
use crate::service::Converter;

use super::table::table;

/// Strike through `<del>`, `<s>` and `<strike>` with `delimiter`, `~~` when
/// empty.
pub fn strikethrough(delimiter: &str) -> impl FnOnce(&Converter) -> Vec<Rule> {
    let delimiter = if delimiter.is_empty() { "~~" } else { delimiter }.to_string();
    move |_: &Converter| {
        vec![Rule::for_tags(&["del", "s", "strike"], move |content, _, _| {
            let content = content.trim();
            if content.is_empty() {
                return Some(String::new());
            }
            Some(format!("{delimiter}{content}{delimiter}"))
        })]
    }
}

/// Checkboxes leading a list item become `[x]` or `[ ]`.
pub fn task_list_items() -> impl FnOnce(&Converter) -> Vec<Rule> {
    |_: &Converter| {
        vec![Rule::for_tag("input", |_, node, _| {
            let leads_item = node.parent().is_some_and(|p| p.is("li")) && node.index() == 0;
            let checkbox = node
                .attr("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("checkbox"));
            if !leads_item || !checkbox {
                return None;
            }
            let mark = if node.has_attr("checked") { "[x]" } else { "[ ]" };
            // Reuse the space that usually follows the checkbox in the source
            let spaced = node
                .next_sibling()
                .is_some_and(|next| next.is_text() && next.text().starts_with(char::is_whitespace));
            Some(if spaced { mark.to_string() } else { format!("{mark} ") })
        })]
    }
}

/// Task list items, strikethrough and tables.
pub fn github_flavored() -> impl FnOnce(&Converter) -> Vec<Rule> {
    |converter: &Converter| {
        let mut rules = task_list_items()(converter);
        rules.extend(strikethrough("")(converter));
        rules.extend(table()(converter));
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(html: &str) -> String {
        let converter = Converter::default();
        converter.use_plugin(github_flavored());
        converter.convert(html).unwrap()
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(convert("<p><del>old</del> <s> new </s></p>"), "~~old~~ ~~new~~");

        let converter = Converter::default();
        converter.use_plugin(strikethrough("~"));
        assert_eq!(converter.convert("<strike>x</strike>").unwrap(), "~x~");
    }

    #[test]
    fn test_task_list_items() {
        let html = r#"<ul>
            <li><input type="checkbox" checked> Done</li>
            <li><input type="checkbox"> Todo</li>
        </ul>"#;
        assert_eq!(convert(html), "- [x] Done\n- [ ] Todo");
        assert_eq!(convert(r#"<ul><li><input type="checkbox">Tight</li></ul>"#), "- [ ] Tight");
    }

    #[test]
    fn test_input_elsewhere_is_not_a_task() {
        assert_eq!(convert(r#"<li><span>Text</span> <input type="checkbox"></li>"#), "- Text");
        assert_eq!(convert(r#"<p><input type="checkbox"> Agree</p>"#), "Agree");
    }

    #[test]
    fn test_tables_are_included() {
        let html = "<table><tr><th>A</th></tr><tr><td>1</td></tr></table>";
        assert_eq!(convert(html), "| A |\n| --- |\n| 1 |");
    }
}
