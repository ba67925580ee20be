//! ToC construction from a parsed document

use super::item::{TocItem, TocItemType};
use crate::error::Result;
use crate::index::{Cursor, DocumentIndex};

pub const NUM_TAG: &str = "num";
pub const HEADING_TAG: &str = "heading";

/// Build the outline under the first `root_tag` element (normally `body`),
/// reading item ids from `id_attribute`
pub fn build(input: &[u8], root_tag: &str, id_attribute: &str) -> Result<Vec<TocItem>> {
    let doc = DocumentIndex::parse_with_id_attribute(input, id_attribute)?;
    build_from(&doc, root_tag)
}

/// Build the outline from an existing parse
pub fn build_from(doc: &DocumentIndex<'_>, root_tag: &str) -> Result<Vec<TocItem>> {
    let root = doc.require(root_tag, None)?;
    let items = items_under(&root);
    log::debug!(
        "built ToC under <{}>: {} items",
        root_tag,
        items.iter().map(TocItem::count).sum::<usize>()
    );
    Ok(items)
}

/// Items for the ToC-typed children of `element`, in document order
///
/// Children of other tags are not represented and not descended into.
pub fn items_under(element: &Cursor<'_>) -> Vec<TocItem> {
    element
        .children()
        .filter_map(|child| TocItemType::from_tag(child.name()).map(|kind| item_for(&child, kind)))
        .collect()
}

/// The item an element of a known ToC type builds to
pub fn item_for(element: &Cursor<'_>, item_type: TocItemType) -> TocItem {
    TocItem {
        item_type,
        id: element.id().map(str::to_owned),
        number: element.child_named(NUM_TAG).map(|num| num.text()),
        heading: element.child_named(HEADING_TAG).map(|heading| heading.text()),
        children: items_under(element),
        source: Some(element.position()),
    }
}
