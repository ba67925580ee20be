//! Navigation cursors
//!
//! A [`Cursor`] is a cheap `Copy` handle on one element of a parsed
//! document. Moving a cursor returns a new cursor; nothing is shared or
//! mutated, so any number of cursors can walk the same index independently.

use super::span::Span;
use super::structural::StructuralIndex;
use crate::core::entities::flatten_markup;

/// Position of an element within one parse
///
/// Only meaningful for the [`DocumentIndex`](super::DocumentIndex) it was
/// taken from; any edit produces a new buffer and invalidates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub(crate) u32);

impl NodeRef {
    /// Document-order number of the element
    #[inline]
    pub fn ordinal(&self) -> u32 {
        self.0
    }
}

/// A position in the navigation index identifying one element
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    index: &'a StructuralIndex,
    input: &'a [u8],
    id_attribute: &'a str,
    node: u32,
}

impl<'a> Cursor<'a> {
    #[inline]
    pub(crate) fn new(index: &'a StructuralIndex, input: &'a [u8], id_attribute: &'a str, node: u32) -> Self {
        Self {
            index,
            input,
            id_attribute,
            node,
        }
    }

    #[inline]
    fn at(&self, node: u32) -> Self {
        Self { node, ..*self }
    }

    #[inline]
    fn element(&self) -> &'a super::element::IndexElement {
        // Cursors are only ever created for nodes that exist in their index
        &self.index.elements[self.node as usize]
    }

    /// Position descriptor for this element
    #[inline]
    pub fn position(&self) -> NodeRef {
        NodeRef(self.node)
    }

    // === Movement ===

    pub fn root(&self) -> Option<Cursor<'a>> {
        self.index.root.map(|r| self.at(r))
    }

    pub fn parent(&self) -> Option<Cursor<'a>> {
        self.index.parent(self.node).map(|p| self.at(p))
    }

    pub fn first_child(&self) -> Option<Cursor<'a>> {
        self.index.first_child(self.node).map(|c| self.at(c))
    }

    pub fn last_child(&self) -> Option<Cursor<'a>> {
        self.index.last_child(self.node).map(|c| self.at(c))
    }

    pub fn next_sibling(&self) -> Option<Cursor<'a>> {
        self.index.next_sibling(self.node).map(|s| self.at(s))
    }

    /// Element children in document order
    pub fn children(&self) -> impl Iterator<Item = Cursor<'a>> + 'a {
        let this = *self;
        self.index.element_children(self.node).map(move |c| this.at(c))
    }

    /// All descendant elements in document order
    pub fn descendants(&self) -> impl Iterator<Item = Cursor<'a>> + 'a {
        let this = *self;
        self.index.descendants(self.node).map(move |c| this.at(c))
    }

    /// First element child named `tag`
    pub fn child_named(&self, tag: &str) -> Option<Cursor<'a>> {
        self.children().find(|c| c.is(tag))
    }

    // === Reads ===

    /// Element name
    #[inline]
    pub fn name(&self) -> &'a str {
        self.element().name.as_str(self.input).unwrap_or("")
    }

    #[inline]
    pub fn is(&self, tag: &str) -> bool {
        self.element().name.slice(self.input) == tag.as_bytes()
    }

    /// Span of the element name inside its start tag
    #[inline]
    pub fn name_span(&self) -> Span {
        self.element().name
    }

    /// Value of an attribute (raw, entities not decoded)
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.index.get_attribute(self.node, name, self.input)
    }

    /// Span of an attribute value, between the quotes
    pub fn attribute_span(&self, name: &str) -> Option<Span> {
        self.index.attribute_value_span(self.node, name, self.input)
    }

    /// All attribute name/value pairs
    pub fn attributes(&self) -> Vec<(&'a str, &'a str)> {
        self.index.get_attribute_pairs(self.node, self.input)
    }

    /// The element identifier, if present
    #[inline]
    pub fn id(&self) -> Option<&'a str> {
        self.attribute(self.id_attribute)
    }

    /// Whole element extent, tags included
    #[inline]
    pub fn fragment(&self) -> Span {
        self.element().extent
    }

    /// Content only, tags excluded
    #[inline]
    pub fn content_fragment(&self) -> Span {
        self.element().content
    }

    /// The start tag (`<name ...>` or `<name .../>`)
    #[inline]
    pub fn start_tag(&self) -> Span {
        self.element().start_tag
    }

    #[inline]
    pub fn is_empty_element(&self) -> bool {
        self.element().is_empty()
    }

    #[inline]
    pub fn depth(&self) -> u16 {
        self.element().depth
    }

    /// Raw bytes of the whole element
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.fragment().slice(self.input)
    }

    /// Raw bytes of the content
    #[inline]
    pub fn content_bytes(&self) -> &'a [u8] {
        self.content_fragment().slice(self.input)
    }

    /// Display text: tags stripped, entities decoded, whitespace collapsed
    pub fn text(&self) -> String {
        flatten_markup(self.content_bytes())
    }

    /// The start tag rewritten as an opening tag (`<name ...>`), so a
    /// self-closing element can be given content without losing attributes
    pub fn opening_tag(&self) -> Vec<u8> {
        let tag = self.start_tag().slice(self.input);
        if !self.is_empty_element() {
            return tag.to_vec();
        }
        // `<name attrs/>` or `<name attrs />` -> `<name attrs>`
        let body = &tag[..tag.len().saturating_sub(2)];
        let trimmed = body
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(body, |last| &body[..=last]);
        let mut open = Vec::with_capacity(trimmed.len() + 1);
        open.extend_from_slice(trimmed);
        open.push(b'>');
        open
    }

    /// The matching closing tag (`</name>`)
    pub fn closing_tag(&self) -> Vec<u8> {
        let name = self.element().name.slice(self.input);
        let mut close = Vec::with_capacity(name.len() + 3);
        close.extend_from_slice(b"</");
        close.extend_from_slice(name);
        close.push(b'>');
        close
    }
}

impl PartialEq for Cursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.index, other.index) && self.node == other.node
    }
}

impl Eq for Cursor<'_> {}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("node", &self.node)
            .field("name", &self.name())
            .field("id", &self.id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::index::DocumentIndex;

    const DOC: &[u8] = b"<bill><body><article id=\"a1\" class=\"x\"><num> Article\n 1 </num>\
        <heading>Scope</heading><paragraph/></article><article id=\"a2\"/></body></bill>";

    #[test]
    fn test_movement() {
        let doc = DocumentIndex::parse(DOC).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.name(), "bill");

        let body = root.first_child().unwrap();
        assert_eq!(body.name(), "body");
        assert_eq!(body.parent().unwrap(), root);

        let first = body.first_child().unwrap();
        let second = first.next_sibling().unwrap();
        assert_eq!(second.id(), Some("a2"));
        assert!(second.next_sibling().is_none());
        assert_eq!(body.last_child().unwrap(), second);
        assert_eq!(second.root().unwrap(), root);
    }

    #[test]
    fn test_independent_cursors() {
        let doc = DocumentIndex::parse(DOC).unwrap();
        let a = doc.cursor_at("article", None).unwrap();
        let b = a;
        let moved = b.first_child().unwrap();
        assert_eq!(a.name(), "article");
        assert_eq!(moved.name(), "num");
    }

    #[test]
    fn test_reads() {
        let doc = DocumentIndex::parse(DOC).unwrap();
        let article = doc.cursor_at("article", Some("a1")).unwrap();
        assert_eq!(article.attribute("class"), Some("x"));
        assert_eq!(article.attributes(), vec![("id", "a1"), ("class", "x")]);
        assert_eq!(article.child_named("num").unwrap().text(), "Article 1");
        assert_eq!(article.child_named("heading").unwrap().content_bytes(), b"Scope");
        assert_eq!(article.children().count(), 3);
        assert_eq!(article.descendants().count(), 3);
        assert_eq!(article.depth(), 2);
    }

    #[test]
    fn test_opening_and_closing_tags() {
        let doc = DocumentIndex::parse(DOC).unwrap();
        let empty = doc.cursor_at("article", Some("a2")).unwrap();
        assert!(empty.is_empty_element());
        assert_eq!(empty.opening_tag(), b"<article id=\"a2\">".to_vec());
        assert_eq!(empty.closing_tag(), b"</article>".to_vec());

        let full = doc.cursor_at("article", Some("a1")).unwrap();
        assert_eq!(full.opening_tag(), b"<article id=\"a1\" class=\"x\">".to_vec());
    }
}
