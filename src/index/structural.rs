//! Structural Index - Main index structure
//!
//! Stores the entire XML element structure as offsets into the original input.
//! Elements are stored in start-tag order, so iterating the element vector
//! is a pre-order (document order) traversal.

use super::element::{IndexAttribute, IndexElement, NO_NODE};
use super::span::Span;

/// The structural index of an XML document
///
/// Memory layout optimized for cache efficiency:
/// - Elements stored contiguously in document order
/// - Attributes stored contiguously, referenced by (start, count)
/// - Tree shape kept as parent / first child / next sibling links
#[derive(Debug, Default)]
pub struct StructuralIndex {
    /// Element nodes (index 0 is always the root element)
    pub elements: Vec<IndexElement>,
    /// Attributes (referenced by elements via attr_start/attr_count)
    pub attributes: Vec<IndexAttribute>,
    /// Root element index (None if document is empty)
    pub root: Option<u32>,
}

impl StructuralIndex {
    /// Create a new empty structural index
    pub fn new() -> Self {
        Self::with_capacity(256, 256)
    }

    /// Create with estimated capacity
    pub fn with_capacity(elements: usize, attributes: usize) -> Self {
        Self {
            elements: Vec::with_capacity(elements),
            attributes: Vec::with_capacity(attributes),
            root: None,
        }
    }

    /// Get an element by index
    #[inline]
    pub fn get_element(&self, idx: u32) -> Option<&IndexElement> {
        self.elements.get(idx as usize)
    }

    /// Get element name from input
    #[inline]
    pub fn element_name<'a>(&self, idx: u32, input: &'a [u8]) -> Option<&'a str> {
        self.get_element(idx)?.name.as_str(input)
    }

    /// Get attributes for an element
    #[inline]
    pub fn element_attributes(&self, idx: u32) -> &[IndexAttribute] {
        if let Some(elem) = self.get_element(idx) {
            let start = elem.attr_start as usize;
            let end = start + elem.attr_count as usize;
            if end <= self.attributes.len() {
                return &self.attributes[start..end];
            }
        }
        &[]
    }

    /// Find an attribute by name
    pub fn find_attribute(&self, elem_idx: u32, name: &str, input: &[u8]) -> Option<IndexAttribute> {
        let name_bytes = name.as_bytes();
        self.element_attributes(elem_idx)
            .iter()
            .find(|attr| attr.name.slice(input) == name_bytes)
            .copied()
    }

    /// Get attribute value by name
    pub fn get_attribute<'a>(&self, elem_idx: u32, name: &str, input: &'a [u8]) -> Option<&'a str> {
        self.find_attribute(elem_idx, name, input)?.value.as_str(input)
    }

    /// Get the span of an attribute value by name
    pub fn attribute_value_span(&self, elem_idx: u32, name: &str, input: &[u8]) -> Option<Span> {
        Some(self.find_attribute(elem_idx, name, input)?.value)
    }

    /// Get all attribute name-value pairs for an element
    pub fn get_attribute_pairs<'a>(&self, elem_idx: u32, input: &'a [u8]) -> Vec<(&'a str, &'a str)> {
        self.element_attributes(elem_idx)
            .iter()
            .filter_map(|attr| {
                let name = attr.name.as_str(input)?;
                let value = attr.value.as_str(input)?;
                Some((name, value))
            })
            .collect()
    }

    /// Iterate over element children of an element
    pub fn element_children(&self, elem_idx: u32) -> ChildIter<'_> {
        let next = self
            .get_element(elem_idx)
            .map(|e| e.first_child)
            .unwrap_or(NO_NODE);
        ChildIter { index: self, next }
    }

    /// Iterate over all descendants of an element (document order)
    pub fn descendants(&self, elem_idx: u32) -> DescendantIter<'_> {
        let depth = self.get_element(elem_idx).map(|e| e.depth);
        DescendantIter {
            index: self,
            next: elem_idx.saturating_add(1),
            depth,
        }
    }

    /// Get parent element of an element
    #[inline]
    pub fn parent(&self, elem_idx: u32) -> Option<u32> {
        let elem = self.get_element(elem_idx)?;
        (elem.parent != NO_NODE).then_some(elem.parent)
    }

    /// Get first element child of an element
    #[inline]
    pub fn first_child(&self, elem_idx: u32) -> Option<u32> {
        let elem = self.get_element(elem_idx)?;
        (elem.first_child != NO_NODE).then_some(elem.first_child)
    }

    /// Get last element child of an element
    #[inline]
    pub fn last_child(&self, elem_idx: u32) -> Option<u32> {
        let elem = self.get_element(elem_idx)?;
        (elem.last_child != NO_NODE).then_some(elem.last_child)
    }

    /// Get next sibling of an element
    #[inline]
    pub fn next_sibling(&self, elem_idx: u32) -> Option<u32> {
        let elem = self.get_element(elem_idx)?;
        (elem.next_sibling != NO_NODE).then_some(elem.next_sibling)
    }

    /// Get total number of elements
    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Get total number of attributes
    #[inline]
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    // === Builder methods (used by IndexBuilder) ===

    /// Add an element and return its index
    pub(crate) fn add_element(&mut self, elem: IndexElement) -> u32 {
        let idx = self.elements.len() as u32;
        self.elements.push(elem);
        idx
    }

    /// Add an attribute and return its index
    pub(crate) fn add_attribute(&mut self, attr: IndexAttribute) -> u32 {
        let idx = self.attributes.len() as u32;
        self.attributes.push(attr);
        idx
    }

    /// Get a mutable element by index
    #[inline]
    pub(crate) fn get_element_mut(&mut self, idx: u32) -> Option<&mut IndexElement> {
        self.elements.get_mut(idx as usize)
    }

    /// Link sibling elements
    pub(crate) fn link_sibling(&mut self, prev_idx: u32, next_idx: u32) {
        if let Some(prev) = self.elements.get_mut(prev_idx as usize) {
            prev.next_sibling = next_idx;
        }
    }

    /// Append a child to a parent, maintaining first/last child links
    pub(crate) fn link_child(&mut self, parent_idx: u32, child_idx: u32) {
        let previous_last = match self.elements.get_mut(parent_idx as usize) {
            Some(parent) => {
                let previous = parent.last_child;
                if parent.first_child == NO_NODE {
                    parent.first_child = child_idx;
                }
                parent.last_child = child_idx;
                previous
            }
            None => return,
        };
        if previous_last != NO_NODE {
            self.link_sibling(previous_last, child_idx);
        }
    }

    /// Shrink all internal vectors to fit their contents
    /// Called after building to release unused capacity
    pub(crate) fn shrink_to_fit(&mut self) {
        self.elements.shrink_to_fit();
        self.attributes.shrink_to_fit();
    }
}

/// Iterator over element children of an element
pub struct ChildIter<'a> {
    index: &'a StructuralIndex,
    next: u32,
}

impl Iterator for ChildIter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == NO_NODE {
            return None;
        }
        let current = self.next;
        self.next = self
            .index
            .get_element(current)
            .map(|e| e.next_sibling)
            .unwrap_or(NO_NODE);
        Some(current)
    }
}

/// Iterator over descendants
///
/// Elements are stored in start-tag order, so a subtree is the contiguous
/// run after its root of elements deeper than the root.
pub struct DescendantIter<'a> {
    index: &'a StructuralIndex,
    next: u32,
    depth: Option<u16>,
}

impl Iterator for DescendantIter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        let depth = self.depth?;
        let elem = self.index.get_element(self.next)?;
        if elem.depth <= depth {
            self.depth = None;
            return None;
        }
        let current = self.next;
        self.next += 1;
        Some(current)
    }
}

impl StructuralIndex {
    /// Find all elements with the given name, in document order
    pub fn find_elements_by_name<'a, 'n>(
        &'a self,
        name: &'n str,
        input: &'a [u8],
    ) -> impl Iterator<Item = u32> + use<'a, 'n> {
        let name_bytes = name.as_bytes();
        self.elements
            .iter()
            .enumerate()
            .filter_map(move |(idx, elem)| (elem.name.slice(input) == name_bytes).then_some(idx as u32))
    }
}
