//! Read-only node handles and the mutable document used by hooks.
//!
//! Rules receive a [`Selection`], a cheap `Copy` view over one node of the
//! parsed tree. Pre-processing hooks receive the owning [`Document`] and may
//! restructure it through a small set of mutation methods keyed by
//! [`NodeId`]. Ids stay valid after a node is detached, so a stale id can
//! never point at freed memory; it simply refers to an orphaned subtree.

use std::io;

use ego_tree::{NodeId, NodeRef, Tree};
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use scraper::{ElementRef, Html, Node};

/// A read-only handle over a single node of the parsed tree.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    node: NodeRef<'a, Node>,
}

impl<'a> Selection<'a> {
    pub(crate) fn new(node: NodeRef<'a, Node>) -> Self {
        Self { node }
    }

    /// Identity of the node inside its document.
    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    /// The underlying tree node, for raw traversals that bypass the rules.
    pub fn node(&self) -> NodeRef<'a, Node> {
        self.node
    }

    /// Tag name of an element, or a `#`-prefixed name for other node kinds
    /// (`#text`, `#comment`, `#document`, ...).
    pub fn tag_name(&self) -> &'a str {
        node_name(self.node.value())
    }

    /// Check the tag name.
    pub fn is(&self, tag: &str) -> bool {
        self.tag_name() == tag
    }

    pub fn is_element(&self) -> bool {
        self.node.value().is_element()
    }

    pub fn is_text(&self) -> bool {
        self.node.value().is_text()
    }

    /// Get an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.value().as_element()?.attr(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Whitespace separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &'a str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn parent(&self) -> Option<Selection<'a>> {
        self.node.parent().map(Selection::new)
    }

    /// All child nodes, text included, in document order.
    pub fn children(&self) -> impl Iterator<Item = Selection<'a>> {
        self.node.children().map(Selection::new)
    }

    pub fn element_children(&self) -> impl Iterator<Item = Selection<'a>> {
        self.node
            .children()
            .filter(|n| n.value().is_element())
            .map(Selection::new)
    }

    pub fn first_element_child(&self) -> Option<Selection<'a>> {
        self.element_children().next()
    }

    pub fn prev_sibling(&self) -> Option<Selection<'a>> {
        self.node.prev_sibling().map(Selection::new)
    }

    pub fn next_sibling(&self) -> Option<Selection<'a>> {
        self.node.next_sibling().map(Selection::new)
    }

    pub fn next_element_sibling(&self) -> Option<Selection<'a>> {
        self.node
            .next_siblings()
            .find(|n| n.value().is_element())
            .map(Selection::new)
    }

    pub fn prev_element_sibling(&self) -> Option<Selection<'a>> {
        self.node
            .prev_siblings()
            .find(|n| n.value().is_element())
            .map(Selection::new)
    }

    /// Position among the element siblings, counting every element and not
    /// only those sharing this node's tag.
    pub fn index(&self) -> usize {
        self.node
            .prev_siblings()
            .filter(|n| n.value().is_element())
            .count()
    }

    /// Whether this node is the first element child of its parent, compared
    /// by node identity.
    pub fn is_first_element_child(&self) -> bool {
        self.parent()
            .and_then(|p| p.first_element_child())
            .is_some_and(|first| first.id() == self.id())
    }

    pub fn has_ancestor(&self, tag: &str) -> bool {
        self.node.ancestors().any(|n| node_name(n.value()) == tag)
    }

    /// Descendant elements with the given tag, in document order.
    pub fn find(&self, tag: &'a str) -> impl Iterator<Item = Selection<'a>> + 'a {
        self.node
            .descendants()
            .skip(1)
            .filter(move |n| node_name(n.value()) == tag)
            .map(Selection::new)
    }

    /// Concatenated text of this node and all of its descendants.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in self.node.descendants() {
            if let Some(t) = node.value().as_text() {
                text.push_str(t);
            }
        }
        text
    }

    /// Re-serialise the node, including its own tag, as HTML.
    pub fn outer_html(&self) -> io::Result<String> {
        let Some(element) = ElementRef::wrap(self.node) else {
            return Ok(self.text());
        };

        let mut buf = Vec::new();
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        };
        serialize(&mut buf, &element, opts)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

fn node_name(node: &Node) -> &str {
    match node {
        Node::Element(element) => element.name(),
        Node::Text(_) => "#text",
        Node::Comment(_) => "#comment",
        Node::Document => "#document",
        Node::Fragment => "#document-fragment",
        Node::Doctype(_) => "#doctype",
        _ => "#node",
    }
}

/// A parsed HTML tree, exclusively owned by one conversion.
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse a complete HTML document.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Parse an HTML fragment (no implied `<head>`/`<body>`).
    pub fn parse_fragment(html: &str) -> Self {
        Self {
            html: Html::parse_fragment(html),
        }
    }

    fn tree(&self) -> &Tree<Node> {
        &self.html.tree
    }

    /// The document node the walk starts from.
    pub fn root(&self) -> Selection<'_> {
        Selection::new(self.tree().root())
    }

    pub fn get(&self, id: NodeId) -> Option<Selection<'_>> {
        self.tree().get(id).map(Selection::new)
    }

    /// Ids of all elements with the given tag, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<NodeId> {
        self.tree()
            .root()
            .descendants()
            .filter(|n| n.value().as_element().is_some_and(|e| e.name() == tag))
            .map(|n| n.id())
            .collect()
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.can_move(parent, child) {
            return false;
        }
        let tree = &mut self.html.tree;
        if let Some(mut node) = tree.get_mut(child) {
            node.detach();
        }
        match tree.get_mut(parent) {
            Some(mut parent) => {
                parent.append_id(child);
                true
            }
            None => false,
        }
    }

    /// Move `node` so it directly follows `target` as a sibling.
    pub fn insert_after(&mut self, target: NodeId, node: NodeId) -> bool {
        if !self.can_move(target, node) {
            return false;
        }
        let tree = &mut self.html.tree;
        if let Some(mut moved) = tree.get_mut(node) {
            moved.detach();
        }
        match tree.get_mut(target) {
            Some(mut target) => {
                target.insert_id_after(node);
                true
            }
            None => false,
        }
    }

    /// Detach a node (and its subtree) from the document.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.tree().root().id() {
            return false;
        }
        match self.html.tree.get_mut(id) {
            Some(mut node) => {
                node.detach();
                true
            }
            None => false,
        }
    }

    /// Parse `html` as a fragment and append copies of its nodes to `parent`.
    pub fn append_html(&mut self, parent: NodeId, html: &str) -> bool {
        if self.tree().get(parent).is_none() {
            return false;
        }
        let fragment = Html::parse_fragment(html);
        for child in fragment.root_element().children() {
            copy_subtree(&mut self.html.tree, parent, child);
        }
        true
    }

    /// Both ids exist, differ, and `node` is not an ancestor of `anchor`.
    fn can_move(&self, anchor: NodeId, node: NodeId) -> bool {
        let tree = self.tree();
        let (Some(anchor), Some(_)) = (tree.get(anchor), tree.get(node)) else {
            return false;
        };
        node != tree.root().id() && !anchor.ancestors().any(|a| a.id() == node) && anchor.id() != node
    }
}

fn copy_subtree(tree: &mut Tree<Node>, parent: NodeId, source: NodeRef<'_, Node>) {
    let Some(mut parent) = tree.get_mut(parent) else {
        return;
    };
    let id = parent.append(source.value().clone()).id();
    for child in source.children() {
        copy_subtree(tree, id, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'a>(doc: &'a Document, tag: &str) -> Selection<'a> {
        let id = doc.find_all(tag)[0];
        doc.get(id).unwrap()
    }

    #[test]
    fn test_tag_names() {
        let doc = Document::parse("<p>Hello<!-- note --></p>");
        assert_eq!(doc.root().tag_name(), "#document");

        let p = first(&doc, "p");
        let kinds: Vec<&str> = p.children().map(|c| c.tag_name()).collect();
        assert_eq!(kinds, vec!["#text", "#comment"]);
    }

    #[test]
    fn test_attributes_and_classes() {
        let doc = Document::parse(r#"<code class="hljs  language-rust" data-x="1">x</code>"#);
        let code = first(&doc, "code");
        assert_eq!(code.attr("data-x"), Some("1"));
        assert!(!code.has_attr("id"));
        assert_eq!(code.classes().collect::<Vec<_>>(), vec!["hljs", "language-rust"]);
    }

    #[test]
    fn test_index_counts_all_element_siblings() {
        let doc = Document::parse("<ol> <li>a</li> <div></div> <li>b</li></ol>");
        let items: Vec<usize> = doc
            .find_all("li")
            .into_iter()
            .map(|id| doc.get(id).unwrap().index())
            .collect();
        assert_eq!(items, vec![0, 2]);
    }

    #[test]
    fn test_first_element_child_skips_text() {
        let doc = Document::parse("<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>");
        let ids = doc.find_all("li");
        assert!(doc.get(ids[0]).unwrap().is_first_element_child());
        assert!(!doc.get(ids[1]).unwrap().is_first_element_child());
    }

    #[test]
    fn test_text_and_ancestors() {
        let doc = Document::parse("<pre><code><span>a</span>b</code></pre>");
        let span = first(&doc, "span");
        assert!(span.has_ancestor("pre"));
        assert!(!span.has_ancestor("table"));
        assert_eq!(first(&doc, "code").text(), "ab");
    }

    #[test]
    fn test_outer_html() {
        let doc = Document::parse(r#"<p><a href="https://example.com">Link</a></p>"#);
        let a = first(&doc, "a");
        assert_eq!(a.outer_html().unwrap(), r#"<a href="https://example.com">Link</a>"#);
    }

    #[test]
    fn test_insert_after_moves_node() {
        let mut doc = Document::parse("<table><caption>Cap</caption><tr><td>1</td></tr></table>");
        let table = doc.find_all("table")[0];
        let caption = doc.find_all("caption")[0];

        assert!(doc.insert_after(table, caption));

        let caption = doc.get(caption).unwrap();
        assert!(caption.parent().unwrap().is("body"));
        assert_eq!(caption.prev_element_sibling().unwrap().id(), table);
    }

    #[test]
    fn test_append_html_and_remove() {
        let mut doc = Document::parse("<ol><li>a</li></ol>");
        let ol = doc.find_all("ol")[0];

        assert!(doc.append_html(ol, "<li>b</li>"));
        assert_eq!(doc.find_all("li").len(), 2);

        let first_li = doc.find_all("li")[0];
        assert!(doc.remove(first_li));
        assert_eq!(doc.get(ol).unwrap().text(), "b");
    }

    #[test]
    fn test_invalid_moves_are_rejected() {
        let mut doc = Document::parse("<div><p>x</p></div>");
        let div = doc.find_all("div")[0];
        let p = doc.find_all("p")[0];

        assert!(!doc.append_child(p, div));
        assert!(!doc.insert_after(div, div));
        assert!(!doc.remove(doc.root().id()));
    }
}
