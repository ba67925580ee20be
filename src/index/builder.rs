//! Index Builder
//!
//! Builds a StructuralIndex from scan events.
//! Implements the ScanHandler trait for use with UnifiedScanner.
//!
//! The builder owns the element stack, so it is where nesting errors are
//! detected: mismatched or unexpected end tags, elements left open at end of
//! input, a missing or repeated root, and text outside the root element.

use super::element::{element_flags, IndexAttribute, IndexElement, NO_NODE};
use super::span::Span;
use super::structural::StructuralIndex;
use crate::core::scanner::is_blank;
use crate::core::unified_scanner::{ScanHandler, UnifiedScanner};
use crate::error::{EditError, Result};

/// Deepest element nesting accepted; the root element is at depth 0
pub const MAX_DEPTH: usize = 256;

/// Builder state for constructing a StructuralIndex
pub struct IndexBuilder<'a> {
    /// The index being built
    index: StructuralIndex,
    /// Original input bytes, needed to compare start and end tag names
    input: &'a [u8],
    /// Stack of open element indices
    stack: Vec<u32>,
    /// First nesting error; events after it are ignored
    error: Option<EditError>,
}

impl<'a> IndexBuilder<'a> {
    /// Create a new builder for the given input
    pub fn new(input: &'a [u8]) -> Self {
        // Legislative markup is tag-dense: roughly one element per 60 bytes,
        // with about one attribute per element
        let estimated_elements = (input.len() / 60).max(16);

        Self {
            index: StructuralIndex::with_capacity(estimated_elements, estimated_elements),
            input,
            stack: Vec::with_capacity(32),
            error: None,
        }
    }

    /// Finish building and return the index
    pub fn finish(mut self) -> Result<StructuralIndex> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }

        if let Some(&open) = self.stack.first() {
            let (offset, name) = self
                .index
                .get_element(open)
                .map(|e| (e.extent.start(), String::from_utf8_lossy(e.name.slice(self.input)).into_owned()))
                .unwrap_or_default();
            return Err(EditError::malformed(offset, format!("Unclosed tag: <{}>", name)));
        }

        if self.index.root.is_none() {
            return Err(EditError::malformed(self.input.len(), "Document has no root element"));
        }

        self.index.shrink_to_fit();

        #[cfg(feature = "index_debug")]
        log::debug!(
            "[INDEX] counts - elem:{}, attr:{} | capacity bytes elem:{} attr:{}",
            self.index.element_count(),
            self.index.attribute_count(),
            self.index.elements.capacity() * std::mem::size_of::<IndexElement>(),
            self.index.attributes.capacity() * std::mem::size_of::<IndexAttribute>(),
        );

        Ok(self.index)
    }

    /// Get the current depth (number of open elements, at most `MAX_DEPTH`)
    #[inline]
    fn current_depth(&self) -> u16 {
        self.stack.len() as u16
    }

    /// Get the current parent element index
    #[inline]
    fn current_parent(&self) -> u32 {
        self.stack.last().copied().unwrap_or(NO_NODE)
    }

    #[inline]
    fn fail(&mut self, err: EditError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Handle start of an element
    pub fn start_element(&mut self, tag: Span, name: Span, attrs: &[(Span, Span)], is_empty: bool) {
        if self.error.is_some() {
            return;
        }

        let parent = self.current_parent();
        if parent == NO_NODE && self.index.root.is_some() {
            self.fail(EditError::malformed(tag.start(), "Document has multiple root elements"));
            return;
        }

        if self.stack.len() >= MAX_DEPTH {
            self.fail(EditError::malformed(
                tag.start(),
                format!("Element nesting exceeds {} levels", MAX_DEPTH),
            ));
            return;
        }

        let mut elem = IndexElement::new(name, tag, parent, self.current_depth());

        if !attrs.is_empty() {
            elem.attr_start = self.index.attributes.len() as u32;
            elem.attr_count = attrs.len().min(u16::MAX as usize) as u16;

            for (attr_name, attr_value) in attrs {
                self.index
                    .add_attribute(IndexAttribute::new(*attr_name, *attr_value));
            }
        }

        if is_empty {
            elem.flags |= element_flags::IS_EMPTY;
        }

        let elem_idx = self.index.add_element(elem);

        if self.index.root.is_none() {
            self.index.root = Some(elem_idx);
        }
        if parent != NO_NODE {
            self.index.link_child(parent, elem_idx);
        }

        if !is_empty {
            self.stack.push(elem_idx);
        }
    }

    /// Handle end of an element
    pub fn end_element(&mut self, tag: Span, name: Span) {
        if self.error.is_some() {
            return;
        }

        let Some(elem_idx) = self.stack.pop() else {
            self.fail(EditError::malformed(
                tag.start(),
                format!(
                    "Unexpected end tag: </{}> without matching start tag",
                    String::from_utf8_lossy(name.slice(self.input))
                ),
            ));
            return;
        };

        let input = self.input;
        let Some(elem) = self.index.get_element_mut(elem_idx) else {
            return;
        };

        let start_name = elem.name.slice(input);
        let end_name = name.slice(input);
        if start_name != end_name {
            let err = EditError::malformed(
                tag.start(),
                format!(
                    "Tag mismatch: <{}> closed with </{}>",
                    String::from_utf8_lossy(start_name),
                    String::from_utf8_lossy(end_name)
                ),
            );
            self.fail(err);
            return;
        }

        elem.content = Span::between(elem.start_tag.end(), tag.start());
        elem.extent = Span::between(elem.start_tag.start(), tag.end());
    }

    /// Handle character data
    pub fn text(&mut self, span: Span) {
        if self.error.is_some() || !self.stack.is_empty() {
            return;
        }
        if !is_blank(span.slice(self.input)) {
            self.fail(EditError::malformed(
                span.start(),
                "Text content not allowed at document level",
            ));
        }
    }
}

// ============================================================================
// ScanHandler Implementation for Zero-Copy Index Building
// ============================================================================

impl ScanHandler for IndexBuilder<'_> {
    fn start_element(&mut self, tag: Span, name: Span, attrs: &[(Span, Span)], is_empty: bool) {
        IndexBuilder::start_element(self, tag, name, attrs, is_empty);
    }

    fn end_element(&mut self, tag: Span, name: Span) {
        IndexBuilder::end_element(self, tag, name);
    }

    fn text(&mut self, span: Span) {
        IndexBuilder::text(self, span);
    }
}

// ============================================================================
// Build Functions
// ============================================================================

/// Build a StructuralIndex using UnifiedScanner (zero-copy)
///
/// Fails with `MalformedDocument` if the input is not UTF-8 or not
/// well-formed XML.
pub fn build_index(input: &[u8]) -> Result<StructuralIndex> {
    // Spans store u32 offsets
    if u32::try_from(input.len()).is_err() {
        return Err(EditError::malformed(0, "Document exceeds 4 GiB"));
    }
    if let Err(err) = std::str::from_utf8(input) {
        return Err(EditError::malformed(err.valid_up_to(), "Invalid UTF-8"));
    }

    let mut builder = IndexBuilder::new(input);
    let mut scanner = UnifiedScanner::new(input);
    scanner.scan(&mut builder)?;
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_simple() {
        let xml = b"<root><child>text</child></root>";
        let index = build_index(xml).unwrap();

        assert_eq!(index.element_count(), 2);
        assert_eq!(index.root, Some(0));
    }

    #[test]
    fn test_build_with_attributes() {
        let xml = b"<root id=\"1\" name=\"test\"><child/></root>";
        let index = build_index(xml).unwrap();

        assert_eq!(index.element_count(), 2);
        assert_eq!(index.attribute_count(), 2);
        assert!(index.get_element(1).unwrap().is_empty());
    }

    #[test]
    fn test_build_nested() {
        let xml = b"<a><b><c/></b><d/></a>";
        let index = build_index(xml).unwrap();

        assert_eq!(index.element_count(), 4);
        let root_children: Vec<_> = index.element_children(0).collect();
        assert_eq!(root_children, vec![1, 3]);
        assert_eq!(index.get_element(2).unwrap().depth, 2);
    }

    #[test]
    fn test_extents() {
        let xml = b"<?xml version=\"1.0\"?>\n<a><b x=\"1\">hi</b><c/></a>";
        let index = build_index(xml).unwrap();

        let a = index.get_element(0).unwrap();
        assert_eq!(a.extent.slice(xml), b"<a><b x=\"1\">hi</b><c/></a>");
        assert_eq!(a.content.slice(xml), b"<b x=\"1\">hi</b><c/>");

        let b = index.get_element(1).unwrap();
        assert_eq!(b.start_tag.slice(xml), b"<b x=\"1\">");
        assert_eq!(b.content.slice(xml), b"hi");

        let c = index.get_element(2).unwrap();
        assert_eq!(c.extent.slice(xml), b"<c/>");
        assert!(c.content.is_empty());
        assert_eq!(c.content.start(), c.extent.end());
    }

    #[test]
    fn test_mismatched_tag() {
        let err = build_index(b"<a><b></a></b>").unwrap_err();
        assert!(err.to_string().contains("Tag mismatch: <b> closed with </a>"));
    }

    #[test]
    fn test_unclosed_tag() {
        let err = build_index(b"<a><b></b>").unwrap_err();
        assert!(matches!(err, EditError::MalformedDocument { offset: 0, .. }));
    }

    #[test]
    fn test_document_level_errors() {
        assert!(build_index(b"").is_err());
        assert!(build_index(b"<a/><b/>").is_err());
        assert!(build_index(b"junk<a/>").is_err());
        assert!(build_index(b"</a>").is_err());
        assert!(build_index(b"  <a/>\n").is_ok());
    }

    #[test]
    fn test_invalid_utf8() {
        let err = build_index(b"<a>\xff</a>").unwrap_err();
        assert_eq!(
            err,
            EditError::MalformedDocument {
                offset: 3,
                message: "Invalid UTF-8".to_string()
            }
        );
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| {
            let mut xml = "<level>".repeat(depth);
            xml.push_str(&"</level>".repeat(depth));
            xml.into_bytes()
        };

        let index = build_index(&nested(MAX_DEPTH)).unwrap();
        assert_eq!(index.get_element(MAX_DEPTH as u32 - 1).unwrap().depth as usize, MAX_DEPTH - 1);

        let err = build_index(&nested(MAX_DEPTH + 1)).unwrap_err();
        assert!(err.to_string().contains("nesting exceeds"));
        assert!(build_index(&nested(40_000)).is_err());
    }
}
