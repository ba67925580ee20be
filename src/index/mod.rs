//! Structural Index Module
//!
//! This module provides a memory-efficient representation of XML documents
//! using only byte offsets into the original input. This enables:
//!
//! - **Zero-copy strings**: Element names, attribute values, and content
//!   are represented as (offset, length) spans into the original input.
//! - **Byte-exact editing**: every element records its whole extent, its
//!   start tag and its content, so edits can splice the original buffer
//!   without re-serializing anything they did not touch.
//! - **Value cursors**: navigation hands out `Copy` cursors over a shared,
//!   immutable index.
//!
//! ## Architecture
//!
//! ```text
//! DocumentIndex<'a>
//! ├── input: &'a [u8]               # never copied
//! └── StructuralIndex
//!     ├── elements: Vec<IndexElement>     # document order
//!     └── attributes: Vec<IndexAttribute> # (name, value) spans
//! ```

pub mod builder;
pub mod cursor;
pub mod element;
pub mod span;
pub mod structural;
pub mod view;

pub use cursor::{Cursor, NodeRef};
pub use span::Span;
pub use structural::StructuralIndex;
pub use view::DocumentIndex;
