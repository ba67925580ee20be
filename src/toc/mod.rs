//! Table of Contents Module
//!
//! Builds a typed outline of the document body and rebuilds the body from
//! an edited outline (reordered, renamed, added or removed items).

pub mod builder;
pub mod item;
pub mod reconstruct;
pub mod templates;

pub use builder::{build, build_from};
pub use item::{TocItem, TocItemType};
pub use reconstruct::reconstruct;
pub use templates::{DefaultTemplates, TocTemplates};
