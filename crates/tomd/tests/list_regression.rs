// Regression tests for list rendering.

use pretty_assertions::assert_eq;
use tomd::Converter;

fn convert(html: &str) -> String {
    Converter::new("", true, None).convert(html).unwrap()
}

/// Numbering follows the element index, so a stray non-`<li>` element in an
/// `<ol>` consumes a number.
#[test]
fn non_li_child_in_ordered_list_skips_index() {
    let md = convert("<ol><li>one</li><div></div><li>two</li></ol>");
    assert!(md.contains("1. one"), "{md}");
    assert!(md.contains("3. two"), "{md}");
    assert!(!md.contains("2. two"), "{md}");
}

#[test]
fn wrapper_list_item_does_not_emit_empty_bullet() {
    let md = convert("<ul><li><ul><li>Nested</li></ul></li></ul>");
    assert!(md.contains("Nested"), "{md}");
    assert!(md.lines().all(|line| line.trim() != "-"), "{md}");
}

#[test]
fn malformed_li_outside_list_does_not_panic() {
    let md = convert("<div><li>Item</li></div>");
    assert_eq!(md, "- Item");
}

#[test]
fn before_hook_mutation_is_numbered() {
    let converter = Converter::new("", true, None);
    converter.before(|doc| {
        if let Some(&ol) = doc.find_all("ol").first() {
            doc.append_html(ol, "<li>b</li>");
        }
    });

    let md = converter.convert("<ol><li>a</li></ol>").unwrap();
    assert_eq!(md, "1. a\n2. b");
}

#[test]
fn whitespace_between_items_is_ignored() {
    let md = convert("<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>");
    assert_eq!(md, "- a\n- b");
}

#[test]
fn item_with_paragraphs_is_indented() {
    let md = convert("<ol><li><p>First</p><p>Second</p></li><li>Next</li></ol>");
    assert_eq!(md, "1. First\n\n    Second\n2. Next");
}

#[test]
fn custom_bullet_marker() {
    let options = tomd::Options::default().with_bullet_list_marker('*');
    let md = Converter::with_options(options)
        .convert("<ul><li>a</li><li>b</li></ul>")
        .unwrap();
    assert_eq!(md, "* a\n* b");
}

/// An `<ol start>` at the top of the integer range must not overflow.
#[test]
fn huge_start_does_not_overflow() {
    let md = convert(r#"<ol start="9223372036854775807"><li>a</li><li>b</li></ol>"#);
    assert_eq!(md, "9223372036854775807. a\n9223372036854775807. b");
}

/// A wrapper item keeps its list nested instead of merging it into the
/// parent list.
#[test]
fn wrapper_list_item_keeps_nesting() {
    let md = convert("<ol><li><ol><li>x</li><li>y</li></ol></li><li>z</li></ol>");
    assert_eq!(md, "    1. x\n    2. y\n2. z");

    let md = convert("<ul><li>a</li><li><ul><li>b</li></ul></li><li>c</li></ul>");
    assert_eq!(md, "- a\n    - b\n- c");
}
