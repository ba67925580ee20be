//! Localized Edit Operations
//!
//! Each operation locates its target in one parse and serializes a new
//! buffer; the parsed buffer is never touched. Only `replace` finishes with
//! the post-processing pass; callers chaining `delete`/`insert`/`append_child`
//! run it themselves when done. Chained edits need a fresh parse of the
//! previous output since spans are only valid for the parse they came from.

use super::accumulator::EditAccumulator;
use crate::error::Result;
use crate::index::DocumentIndex;
use crate::process::PostProcessor;

/// Replace the first `tag` element with id `id` by `content`, or drop it
/// when `content` is `None`, then post-process
pub fn replace(
    doc: &DocumentIndex<'_>,
    tag: &str,
    id: Option<&str>,
    content: Option<&[u8]>,
    post: &PostProcessor<'_>,
) -> Result<Vec<u8>> {
    let target = doc.require(tag, id)?;

    let mut acc = EditAccumulator::new(doc.input());
    acc.remove(target.fragment());
    if let Some(content) = content {
        acc.insert_before(target.fragment(), content);
    }
    log::debug!("replace <{}> {:?} ({} bytes)", tag, id, target.fragment().len);

    post.run(&acc.apply()?)
}

/// Remove the first `tag` element with id `id`
pub fn delete(doc: &DocumentIndex<'_>, tag: &str, id: Option<&str>) -> Result<Vec<u8>> {
    let target = doc.require(tag, id)?;

    let mut acc = EditAccumulator::new(doc.input());
    acc.remove(target.fragment());
    log::debug!("delete <{}> {:?}", tag, id);
    acc.apply()
}

/// Insert `template` right before (or after) the first `tag` element with id `id`
pub fn insert(doc: &DocumentIndex<'_>, tag: &str, id: Option<&str>, template: &[u8], before: bool) -> Result<Vec<u8>> {
    let target = doc.require(tag, id)?;

    let mut acc = EditAccumulator::new(doc.input());
    if before {
        acc.insert_before(target.fragment(), template);
    } else {
        acc.insert_after(target.fragment(), template);
    }
    log::debug!("insert {} <{}> {:?}", if before { "before" } else { "after" }, tag, id);
    acc.apply()
}

/// Append `content` as the last child of the first `parent_tag` element
pub fn append_child(doc: &DocumentIndex<'_>, parent_tag: &str, content: &[u8]) -> Result<Vec<u8>> {
    let parent = doc.require(parent_tag, None)?;

    let mut acc = EditAccumulator::new(doc.input());
    if parent.is_empty_element() {
        let mut expanded = parent.opening_tag();
        expanded.extend_from_slice(content);
        expanded.extend_from_slice(&parent.closing_tag());
        acc.update_token(parent.fragment(), expanded);
    } else {
        acc.insert_after(parent.content_fragment(), content);
    }
    log::debug!("append child to <{}>", parent_tag);
    acc.apply()
}
