//! Reference and comment utilities

pub mod comments;
pub mod references;

pub use comments::{extract_comments, insert_comment, Comment, CommentParser, PopupCommentParser};
pub use references::update_references;
