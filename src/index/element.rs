//! Structural Index Element Types
//!
//! Compact structures for storing XML structure as offsets into the
//! original input.

use super::span::Span;

/// Flags for IndexElement
pub mod element_flags {
    /// Element is empty (self-closing)
    pub const IS_EMPTY: u16 = 0x0001;
}

/// Sentinel value for "no node"
pub const NO_NODE: u32 = u32::MAX;

/// Index of an element in the structural index
///
/// Stores only offsets into the original input - zero string allocation.
/// Besides the tree links, every element records the three extents the
/// editing layer needs: the whole element, its start tag, and its content.
#[derive(Debug, Clone, Copy)]
pub struct IndexElement {
    /// Element name span (tag name in input)
    pub name: Span,
    /// Whole element, from `<` of the start tag through `>` of the end tag
    pub extent: Span,
    /// Start tag only (`<name ...>` or `<name .../>`)
    pub start_tag: Span,
    /// Content between start and end tag; an empty span at the element end
    /// for self-closing elements
    pub content: Span,
    /// Parent element index (NO_NODE for root)
    pub parent: u32,
    /// First child index (NO_NODE if no children)
    pub first_child: u32,
    /// Next sibling index (NO_NODE if last child)
    pub next_sibling: u32,
    /// Last child index (for efficient appendChild)
    pub last_child: u32,
    /// Start index in attributes array
    pub attr_start: u32,
    /// Number of attributes
    pub attr_count: u16,
    /// Depth in document tree (0 = root element)
    pub depth: u16,
    /// Flags (see element_flags)
    pub flags: u16,
}

impl IndexElement {
    /// Create a new element from its start tag; extents are completed at the end tag
    #[inline]
    pub fn new(name: Span, start_tag: Span, parent: u32, depth: u16) -> Self {
        Self {
            name,
            extent: start_tag,
            start_tag,
            content: Span::at(start_tag.end()),
            parent,
            first_child: NO_NODE,
            next_sibling: NO_NODE,
            last_child: NO_NODE,
            attr_start: 0,
            attr_count: 0,
            depth,
            flags: 0,
        }
    }

    /// Check if this is an empty/self-closing element
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flags & element_flags::IS_EMPTY != 0
    }
}

impl Default for IndexElement {
    fn default() -> Self {
        Self::new(Span::empty(), Span::empty(), NO_NODE, 0)
    }
}

/// An attribute in the structural index
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexAttribute {
    /// Attribute name span
    pub name: Span,
    /// Attribute value span (between the quotes)
    pub value: Span,
}

impl IndexAttribute {
    /// Create a new attribute
    #[inline]
    pub fn new(name: Span, value: Span) -> Self {
        Self { name, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_element_size() {
        // Four spans plus links; padding may vary by platform
        let size = std::mem::size_of::<IndexElement>();
        assert!(size <= 64, "IndexElement too large: {} bytes", size);
    }

    #[test]
    fn test_index_attribute_size() {
        let size = std::mem::size_of::<IndexAttribute>();
        assert!(size <= 16, "IndexAttribute too large: {} bytes", size);
    }

    #[test]
    fn test_new_element_extents() {
        let elem = IndexElement::new(Span::new(1, 1), Span::new(0, 3), NO_NODE, 0);
        assert_eq!(elem.parent, NO_NODE);
        assert_eq!(elem.content, Span::at(3));
        assert_eq!(elem.first_child, NO_NODE);
    }

    #[test]
    fn test_element_flags() {
        let mut elem = IndexElement::default();
        assert!(!elem.is_empty());

        elem.flags |= element_flags::IS_EMPTY;
        assert!(elem.is_empty());
    }
}
