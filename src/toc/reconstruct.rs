//! Body reconstruction from an edited outline
//!
//! The root element's content is regenerated from the item tree:
//!
//! - an item whose subtree is unchanged from its source is copied verbatim
//! - an item with a source but different labels or children keeps the
//!   source opening tag, reuses `num`/`heading` whose text still matches,
//!   and copies its non-outline children (paragraphs, tables, ...) in
//!   original order around the rebuilt child items, together with the text,
//!   comments and processing instructions between them
//! - an item without a source is rendered by a [`TocTemplates`]
//!
//! Everything outside the root element's content is left untouched and the
//! result goes through the post-processing pass.

use super::builder::{item_for, items_under, HEADING_TAG, NUM_TAG};
use super::item::{TocItem, TocItemType};
use super::templates::TocTemplates;
use crate::core::entities::{encode_attribute, encode_text};
use crate::core::scanner::is_blank;
use crate::edit::EditAccumulator;
use crate::error::Result;
use crate::index::{Cursor, DocumentIndex};
use crate::process::PostProcessor;

/// Rebuild the content of the first `root_tag` element from `items`
pub fn reconstruct<T: TocTemplates + ?Sized>(
    doc: &DocumentIndex<'_>,
    items: &[TocItem],
    root_tag: &str,
    templates: &T,
    post: &PostProcessor<'_>,
) -> Result<Vec<u8>> {
    let input = doc.input();
    let root = doc.require(root_tag, None)?;

    let mut rebuilder = Rebuilder {
        doc,
        templates,
        stats: Stats::default(),
    };
    let mut content = Vec::with_capacity(root.content_fragment().len as usize);
    rebuilder.level(&mut content, &root, items, false);

    log::debug!(
        "reconstructed <{}>: {} items reused, {} regenerated, {} created",
        root_tag,
        rebuilder.stats.reused,
        rebuilder.stats.regenerated,
        rebuilder.stats.created
    );

    let mut acc = EditAccumulator::new(input);
    if root.is_empty_element() {
        if !content.is_empty() {
            let mut expanded = root.opening_tag();
            expanded.extend_from_slice(&content);
            expanded.extend_from_slice(&root.closing_tag());
            acc.update_token(root.fragment(), expanded);
        }
    } else if content.as_slice() != root.content_bytes() {
        acc.update_token(root.content_fragment(), content);
    }

    if acc.is_empty() {
        return post.run(input);
    }
    post.run(&acc.apply()?)
}

#[derive(Debug, Default)]
struct Stats {
    reused: usize,
    regenerated: usize,
    created: usize,
}

struct Rebuilder<'d, 'a, T: ?Sized> {
    doc: &'d DocumentIndex<'a>,
    templates: &'d T,
    stats: Stats,
}

impl<'d, 'a, T: TocTemplates + ?Sized> Rebuilder<'d, 'a, T> {
    /// Content of `parent` rebuilt around `items`
    ///
    /// `in_item` marks a parent rendered as an outline item, whose `num` and
    /// `heading` are written separately.
    fn level(&mut self, out: &mut Vec<u8>, parent: &Cursor<'d>, items: &[TocItem], in_item: bool) {
        if !in_item && items == items_under(parent).as_slice() {
            out.extend_from_slice(parent.content_bytes());
            self.stats.reused += items.iter().map(TocItem::count).sum::<usize>();
            return;
        }

        let input = self.doc.input();
        let children: Vec<Cursor<'d>> = parent.children().collect();
        let is_outline = |c: &Cursor<'_>| TocItemType::from_tag(c.name()).is_some();
        let is_label = |c: &Cursor<'_>| in_item && (c.is(NUM_TAG) || c.is(HEADING_TAG));
        // Non-outline content before the first outline child stays in front
        let split = children.iter().position(is_outline).unwrap_or(children.len());

        // Each child carries the text, comments and instructions preceding it.
        // Gaps before outline children stay in their slot whatever item fills it.
        let mut slots: Vec<&[u8]> = Vec::new();
        let mut after = Vec::new();
        let mut gap_start = parent.content_fragment().start();
        for (position, child) in children.iter().enumerate() {
            let gap = &input[gap_start..child.fragment().start()];
            gap_start = child.fragment().end();

            let target = if position < split { &mut *out } else { &mut after };
            if is_outline(child) {
                slots.push(gap);
            } else if is_label(child) {
                if !is_blank(gap) {
                    target.extend_from_slice(gap);
                }
            } else {
                target.extend_from_slice(gap);
                target.extend_from_slice(child.bytes());
            }
        }
        let trailing = &input[gap_start..parent.content_fragment().end()];

        for (position, item) in items.iter().enumerate() {
            if let Some(gap) = slots.get(position) {
                out.extend_from_slice(gap);
            }
            self.item(out, item);
        }
        for gap in slots.iter().skip(items.len()).filter(|gap| !is_blank(gap)) {
            out.extend_from_slice(gap);
        }
        out.extend_from_slice(&after);
        out.extend_from_slice(trailing);
    }

    fn item(&mut self, out: &mut Vec<u8>, item: &TocItem) {
        let tag = item.item_type.tag();
        let source = item
            .source
            .and_then(|position| self.doc.cursor(position))
            .filter(|cursor| cursor.is(tag));

        let Some(source) = source else {
            if item.source.is_some() {
                log::warn!("ToC item source is not a <{}> element; rendering it as new", tag);
            }
            let mut children = Vec::new();
            for child in &item.children {
                self.item(&mut children, child);
            }
            out.extend_from_slice(&self.templates.render(item, self.doc.id_attribute(), &children));
            self.stats.created += 1;
            return;
        };

        if item_for(&source, item.item_type) == *item {
            out.extend_from_slice(source.bytes());
            self.stats.reused += item.count();
            return;
        }

        self.stats.regenerated += 1;
        out.extend_from_slice(&self.opening_tag(&source, item));
        if let Some(number) = &item.number {
            label(out, source.child_named(NUM_TAG), NUM_TAG, number);
        }
        if let Some(heading) = &item.heading {
            label(out, source.child_named(HEADING_TAG), HEADING_TAG, heading);
        }
        self.level(out, &source, &item.children, true);
        out.extend_from_slice(&source.closing_tag());
    }

    /// Source opening tag, with the id swapped when the item names another one
    fn opening_tag(&self, source: &Cursor<'_>, item: &TocItem) -> Vec<u8> {
        let new_id = match item.id.as_deref() {
            Some(id) if source.id() != Some(id) => id,
            _ => return source.opening_tag(),
        };

        let id_attribute = self.doc.id_attribute();
        let mut tag = Vec::with_capacity(source.start_tag().len as usize + new_id.len());
        tag.push(b'<');
        tag.extend_from_slice(source.name().as_bytes());

        let mut replaced = false;
        for (name, value) in source.attributes() {
            let value = if name == id_attribute {
                replaced = true;
                encode_attribute(new_id)
            } else {
                value.into()
            };
            push_attribute(&mut tag, name, &value);
        }
        if !replaced {
            push_attribute(&mut tag, id_attribute, &encode_attribute(new_id));
        }
        tag.push(b'>');
        tag
    }
}

fn push_attribute(tag: &mut Vec<u8>, name: &str, value: &str) {
    // Raw values from single-quoted source attributes may contain '"'
    let quote = if value.contains('"') { b'\'' } else { b'"' };
    tag.push(b' ');
    tag.extend_from_slice(name.as_bytes());
    tag.push(b'=');
    tag.push(quote);
    tag.extend_from_slice(value.as_bytes());
    tag.push(quote);
}

/// Write a `num`/`heading` child, reusing the source element when its text matches
fn label(out: &mut Vec<u8>, existing: Option<Cursor<'_>>, tag: &str, text: &str) {
    match existing {
        Some(element) if element.text() == text => out.extend_from_slice(element.bytes()),
        Some(element) => {
            out.extend_from_slice(&element.opening_tag());
            out.extend_from_slice(encode_text(text).as_bytes());
            out.extend_from_slice(&element.closing_tag());
        }
        None => {
            out.push(b'<');
            out.extend_from_slice(tag.as_bytes());
            out.push(b'>');
            out.extend_from_slice(encode_text(text).as_bytes());
            out.extend_from_slice(b"</");
            out.extend_from_slice(tag.as_bytes());
            out.push(b'>');
        }
    }
}
