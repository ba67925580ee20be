//! aknedit - Structural editing and table of contents engine for Akoma Ntoso documents
//!
//! Layers:
//! core:     memchr scanner feeding a strict, handler-based tokenizer
//! index:    offset-only structural index and `Copy` navigation cursors
//! edit:     span-based edit accumulator and localized edits
//! process:  id injection, note and sequence renumbering
//! toc:      outline building and body reconstruction
//! annotate: reference substitution and inline comments
//! batch:    the same operations over many documents on Rayon's pool
//!
//! Every operation takes an immutable buffer and returns a new one; bytes
//! outside the edited regions are copied verbatim. Chaining edits on one
//! document means re-parsing the previous result.
//!
//! ```
//! use aknedit::Engine;
//!
//! let engine = Engine::default();
//! let doc = b"<bill><body><article id=\"a1\"><num>1.</num></article></body></bill>";
//! let doc = engine
//!     .insert(doc, "article", Some("a1"), b"<article><num>#</num></article>", false)
//!     .unwrap();
//! let doc = engine.renumber_articles(&doc).unwrap();
//!
//! let toc = engine.build_toc(&doc).unwrap();
//! assert_eq!(toc.len(), 2);
//! assert_eq!(toc[1].number.as_deref(), Some("Article 2"));
//! ```

pub mod annotate;
pub mod batch;
pub mod config;
pub mod core;
pub mod edit;
pub mod engine;
pub mod error;
pub mod index;
pub mod process;
pub mod toc;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub use annotate::{Comment, CommentParser, PopupCommentParser};
pub use config::EngineConfig;
pub use edit::{Edit, EditAccumulator};
pub use engine::Engine;
pub use error::{EditError, Result};
pub use index::{Cursor, DocumentIndex, NodeRef, Span};
pub use process::{DefaultNumbering, NumberFormat, PostProcessor};
pub use toc::{DefaultTemplates, TocItem, TocItemType, TocTemplates};
