//! Indexed Document View
//!
//! Pairs a [`StructuralIndex`] with the input bytes it was built from and
//! answers the lookups the editing layer needs: first element by tag and
//! id, element by id, ancestor id chains. Lookups hand out [`Cursor`]
//! values; the view itself is never mutated after parsing.

use super::builder::build_index;
use super::cursor::{Cursor, NodeRef};
use super::structural::StructuralIndex;
use crate::error::{EditError, Result};

/// Attribute consulted by the lookups unless a caller names another one
pub const DEFAULT_ID_ATTRIBUTE: &str = "id";

/// A parsed document: the input buffer plus its structural index
pub struct DocumentIndex<'a> {
    input: &'a [u8],
    index: StructuralIndex,
    id_attribute: String,
}

impl<'a> DocumentIndex<'a> {
    /// Parse `input` into a navigable index; the buffer is borrowed, never copied
    pub fn parse(input: &'a [u8]) -> Result<Self> {
        Self::parse_with_id_attribute(input, DEFAULT_ID_ATTRIBUTE)
    }

    /// Parse with a custom identifier attribute (e.g. `xml:id`)
    pub fn parse_with_id_attribute(input: &'a [u8], id_attribute: &str) -> Result<Self> {
        let index = build_index(input)?;
        Ok(Self {
            input,
            index,
            id_attribute: id_attribute.to_string(),
        })
    }

    /// The buffer this index describes
    #[inline]
    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    /// The underlying structural index
    #[inline]
    pub fn structure(&self) -> &StructuralIndex {
        &self.index
    }

    /// Attribute treated as the element identifier
    #[inline]
    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    /// Cursor on the root element
    pub fn root(&self) -> Option<Cursor<'_>> {
        self.index.root.map(|idx| self.cursor_unchecked(idx))
    }

    /// Cursor for a position captured from this same parse
    pub fn cursor(&self, position: NodeRef) -> Option<Cursor<'_>> {
        self.index
            .get_element(position.0)
            .map(|_| self.cursor_unchecked(position.0))
    }

    /// First element in document order named `tag`, additionally matching
    /// `id` when one is given
    pub fn cursor_at(&self, tag: &str, id: Option<&str>) -> Option<Cursor<'_>> {
        self.elements_named(tag).find(|cursor| match id {
            Some(id) => cursor.id() == Some(id),
            None => true,
        })
    }

    /// Like [`cursor_at`](Self::cursor_at) but absence is an `ElementNotFound` error
    pub fn require(&self, tag: &str, id: Option<&str>) -> Result<Cursor<'_>> {
        self.cursor_at(tag, id)
            .ok_or_else(|| EditError::not_found(Some(tag), id))
    }

    /// First element in document order whose id equals `id`, whatever its tag
    pub fn cursor_by_id(&self, id: &str) -> Option<Cursor<'_>> {
        self.all_elements().find(|cursor| cursor.id() == Some(id))
    }

    /// All elements named `tag`, in document order
    pub fn elements_named<'s, 't>(&'s self, tag: &'t str) -> impl Iterator<Item = Cursor<'s>> + use<'a, 's, 't> {
        self.index
            .find_elements_by_name(tag, self.input)
            .map(move |idx| self.cursor_unchecked(idx))
    }

    /// Every element, in document order
    pub fn all_elements(&self) -> impl Iterator<Item = Cursor<'_>> + '_ {
        (0..self.index.element_count() as u32).map(move |idx| self.cursor_unchecked(idx))
    }

    /// Ids of the elements enclosing the element with id `id`, outermost first
    ///
    /// The element itself is not included; ancestors without an id are skipped.
    pub fn ancestors(&self, id: &str) -> Result<Vec<String>> {
        let target = self
            .cursor_by_id(id)
            .ok_or_else(|| EditError::not_found(None, Some(id)))?;

        let mut chain: Vec<String> = std::iter::successors(target.parent(), |c| c.parent())
            .filter_map(|c| c.id().map(str::to_owned))
            .collect();
        chain.reverse();
        Ok(chain)
    }

    #[inline]
    fn cursor_unchecked(&self, node: u32) -> Cursor<'_> {
        Cursor::new(&self.index, self.input, &self.id_attribute, node)
    }
}

impl std::fmt::Debug for DocumentIndex<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentIndex")
            .field("len", &self.input.len())
            .field("elements", &self.index.element_count())
            .field("id_attribute", &self.id_attribute)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &[u8] = b"<akomaNtoso><bill><body id=\"b\">\
        <article id=\"a1\"><num>1</num><paragraph id=\"p1\"/></article>\
        <article id=\"a2\"><num>2</num></article>\
        </body></bill></akomaNtoso>";

    #[test]
    fn test_cursor_at_tag_only() {
        let doc = DocumentIndex::parse(DOC).unwrap();
        let first = doc.cursor_at("article", None).unwrap();
        assert_eq!(first.id(), Some("a1"));
    }

    #[test]
    fn test_cursor_at_tag_and_id() {
        let doc = DocumentIndex::parse(DOC).unwrap();
        let second = doc.cursor_at("article", Some("a2")).unwrap();
        assert_eq!(second.fragment().slice(DOC), b"<article id=\"a2\"><num>2</num></article>");
        assert!(doc.cursor_at("article", Some("zz")).is_none());
        assert!(doc.cursor_at("recital", None).is_none());
    }

    #[test]
    fn test_cursor_outlives_tag_argument() {
        let doc = DocumentIndex::parse(DOC).unwrap();
        let (second, all) = {
            let tag = String::from("article");
            let all: Vec<Cursor<'_>> = doc.elements_named(&tag).collect();
            (doc.cursor_at(&tag, Some("a2")).unwrap(), all)
        };
        assert_eq!(second.id(), Some("a2"));
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_require_reports_not_found() {
        let doc = DocumentIndex::parse(DOC).unwrap();
        let err = doc.require("article", Some("nope")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_ancestors_outermost_first() {
        let doc = DocumentIndex::parse(DOC).unwrap();
        assert_eq!(doc.ancestors("p1").unwrap(), vec!["b", "a1"]);
        assert_eq!(doc.ancestors("b").unwrap(), Vec::<String>::new());
        assert!(doc.ancestors("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_cursor_by_position() {
        let doc = DocumentIndex::parse(DOC).unwrap();
        let para = doc.cursor_by_id("p1").unwrap();
        let again = doc.cursor(para.position()).unwrap();
        assert_eq!(again.name(), "paragraph");
    }

    #[test]
    fn test_custom_id_attribute() {
        let input = b"<doc><p xml:id=\"x\"/></doc>";
        let doc = DocumentIndex::parse_with_id_attribute(input, "xml:id").unwrap();
        assert_eq!(doc.cursor_by_id("x").unwrap().name(), "p");
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(
            DocumentIndex::parse(b"<a><b></a>"),
            Err(EditError::MalformedDocument { .. })
        ));
    }
}
