//! Edit Accumulator
//!
//! Collects structural edits expressed as spans of one parse and
//! materializes them into a new buffer in a single left-to-right pass.
//! Bytes outside the edited spans are copied verbatim.

use crate::error::{EditError, Result};
use crate::index::{Cursor, Span};

/// One structural edit against the parsed buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Drop the span
    Remove(Span),
    /// Insert bytes immediately before the span
    InsertBefore(Span, Vec<u8>),
    /// Insert bytes immediately after the span
    InsertAfter(Span, Vec<u8>),
    /// Insert bytes right after the element name of a start tag; the span is
    /// the element name. The bytes should begin with a space.
    InsertAttribute(Span, Vec<u8>),
    /// Replace the span (typically an attribute value or a text token)
    UpdateToken(Span, Vec<u8>),
}

impl Edit {
    /// The byte range this edit replaces; insertions are empty ranges
    fn target(&self) -> Span {
        match self {
            Edit::Remove(span) | Edit::UpdateToken(span, _) => *span,
            Edit::InsertBefore(span, _) => Span::at(span.start()),
            Edit::InsertAfter(span, _) | Edit::InsertAttribute(span, _) => Span::at(span.end()),
        }
    }

    fn replacement(&self) -> &[u8] {
        match self {
            Edit::Remove(_) => &[],
            Edit::InsertBefore(_, bytes)
            | Edit::InsertAfter(_, bytes)
            | Edit::InsertAttribute(_, bytes)
            | Edit::UpdateToken(_, bytes) => bytes,
        }
    }
}

/// Accumulates edits against one immutable buffer
#[derive(Debug)]
pub struct EditAccumulator<'a> {
    input: &'a [u8],
    edits: Vec<Edit>,
}

impl<'a> EditAccumulator<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            edits: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Record an edit
    pub fn push(&mut self, edit: Edit) {
        log::trace!("edit: {:?}", edit);
        self.edits.push(edit);
    }

    pub fn remove(&mut self, span: Span) {
        self.push(Edit::Remove(span));
    }

    pub fn insert_before(&mut self, span: Span, bytes: impl Into<Vec<u8>>) {
        self.push(Edit::InsertBefore(span, bytes.into()));
    }

    pub fn insert_after(&mut self, span: Span, bytes: impl Into<Vec<u8>>) {
        self.push(Edit::InsertAfter(span, bytes.into()));
    }

    pub fn update_token(&mut self, span: Span, bytes: impl Into<Vec<u8>>) {
        self.push(Edit::UpdateToken(span, bytes.into()));
    }

    /// Add `name="value"` as the first attribute of the cursor's element
    ///
    /// `value` must already be attribute-escaped.
    pub fn insert_attribute(&mut self, element: &Cursor<'_>, name: &str, value: &str) {
        let mut bytes = Vec::with_capacity(name.len() + value.len() + 4);
        bytes.push(b' ');
        bytes.extend_from_slice(name.as_bytes());
        bytes.extend_from_slice(b"=\"");
        bytes.extend_from_slice(value.as_bytes());
        bytes.push(b'"');
        self.push(Edit::InsertAttribute(element.name_span(), bytes));
    }

    /// Materialize the edits into a new buffer
    ///
    /// Edits are ordered by position; insertions at the same byte keep the
    /// order in which they were recorded and come before a replacement that
    /// starts there. Two replacements that overlap, or an insertion strictly
    /// inside a replaced range, fail with `OverlappingEdit`.
    pub fn apply(self) -> Result<Vec<u8>> {
        let input = self.input;
        let mut ordered: Vec<(usize, &Edit)> = self.edits.iter().enumerate().collect();
        ordered.sort_by_key(|(seq, edit)| {
            let target = edit.target();
            // Pure insertions sort before a replacement at the same start
            (target.start(), !target.is_empty(), *seq)
        });

        let growth: usize = self.edits.iter().map(|e| e.replacement().len()).sum();
        let mut out = Vec::with_capacity(input.len() + growth);
        let mut cursor = 0usize;

        for (_, edit) in ordered {
            let target = edit.target();
            if target.end() > input.len() {
                return Err(EditError::OverlappingEdit {
                    offset: target.start(),
                });
            }
            if target.start() < cursor {
                return Err(EditError::OverlappingEdit {
                    offset: target.start(),
                });
            }
            out.extend_from_slice(&input[cursor..target.start()]);
            out.extend_from_slice(edit.replacement());
            cursor = target.end();
        }

        out.extend_from_slice(&input[cursor..]);
        Ok(out)
    }
}
