//! Post-Processing Module
//!
//! Whole-document passes that run after structural edits:
//!
//! - `ids`: random identifier generation with optional prefixes
//! - `post`: id injection with prefix inheritance and authorial note renumbering
//! - `numbering`: sequence renumbering (articles, recitals, any tag)

pub mod ids;
pub mod numbering;
pub mod post;

pub use numbering::{renumber, renumber_articles, renumber_recitals, DefaultNumbering, NumberFormat};
pub use post::{PassReport, PostProcessor};
