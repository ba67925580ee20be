//! Structural Editing Module
//!
//! Edits are recorded as spans of one parse in an [`EditAccumulator`] and
//! materialized in a single pass; the operations in [`ops`] wrap the
//! parse/locate/edit/serialize cycle for the common localized edits.

pub mod accumulator;
pub mod ops;

pub use accumulator::{Edit, EditAccumulator};
pub use ops::{append_child, delete, insert, replace};
