//! Error types
//!
//! Every fallible operation in the crate returns [`EditError`]. Failures are
//! synchronous and final: nothing here retries, and an operation that fails
//! never hands back a partially edited buffer.

use thiserror::Error;

/// Errors raised by parsing, lookup and edit application
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The buffer is not well-formed XML
    #[error("malformed document at byte {offset}: {message}")]
    MalformedDocument { offset: usize, message: String },

    /// A tag/id lookup for a primary edit target found nothing
    #[error("element not found: {}", describe_target(.tag.as_deref(), .id.as_deref()))]
    ElementNotFound {
        tag: Option<String>,
        id: Option<String>,
    },

    /// Two accumulated edits touch overlapping byte ranges
    #[error("overlapping edits at byte {offset}")]
    OverlappingEdit { offset: usize },
}

impl EditError {
    pub fn malformed(offset: usize, message: impl Into<String>) -> Self {
        EditError::MalformedDocument {
            offset,
            message: message.into(),
        }
    }

    pub fn not_found(tag: Option<&str>, id: Option<&str>) -> Self {
        EditError::ElementNotFound {
            tag: tag.map(str::to_owned),
            id: id.map(str::to_owned),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EditError::ElementNotFound { .. })
    }
}

fn describe_target(tag: Option<&str>, id: Option<&str>) -> String {
    match (tag, id) {
        (Some(tag), Some(id)) => format!("<{}> with id \"{}\"", tag, id),
        (Some(tag), None) => format!("<{}>", tag),
        (None, Some(id)) => format!("element with id \"{}\"", id),
        (None, None) => "element".to_string(),
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, EditError>;
