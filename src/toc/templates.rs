//! Markup for ToC items that have no source element

use super::item::{TocItem, TocItemType};
use crate::core::entities::{encode_attribute, encode_text};

/// Renders new ToC items
pub trait TocTemplates {
    /// Markup for `item`; `children` is the already rendered markup of its
    /// child items and must end up inside the returned element. An item id,
    /// if any, belongs in `id_attribute`.
    fn render(&self, item: &TocItem, id_attribute: &str, children: &[u8]) -> Vec<u8>;
}

/// Skeleton Akoma Ntoso markup
///
/// Articles get one empty paragraph, citations and recitals one empty
/// `<p>`, containers just their number, heading and children. Ids are left
/// to the post-processing pass unless the item already carries one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTemplates;

impl TocTemplates for DefaultTemplates {
    fn render(&self, item: &TocItem, id_attribute: &str, children: &[u8]) -> Vec<u8> {
        let tag = item.item_type.tag();
        let mut out = Vec::with_capacity(64 + children.len());

        out.push(b'<');
        out.extend_from_slice(tag.as_bytes());
        if let Some(id) = &item.id {
            out.push(b' ');
            out.extend_from_slice(id_attribute.as_bytes());
            out.extend_from_slice(b"=\"");
            out.extend_from_slice(encode_attribute(id).as_bytes());
            out.push(b'"');
        }
        out.push(b'>');

        if let Some(number) = &item.number {
            push_text_element(&mut out, "num", number);
        }
        if let Some(heading) = &item.heading {
            push_text_element(&mut out, "heading", heading);
        }

        match item.item_type {
            TocItemType::Article => out.extend_from_slice(b"<paragraph><content><p></p></content></paragraph>"),
            TocItemType::Citation | TocItemType::Recital => out.extend_from_slice(b"<p></p>"),
            TocItemType::Level if children.is_empty() => out.extend_from_slice(b"<content><p></p></content>"),
            _ => {}
        }
        out.extend_from_slice(children);

        out.extend_from_slice(b"</");
        out.extend_from_slice(tag.as_bytes());
        out.push(b'>');
        out
    }
}

fn push_text_element(out: &mut Vec<u8>, tag: &str, text: &str) {
    out.push(b'<');
    out.extend_from_slice(tag.as_bytes());
    out.push(b'>');
    out.extend_from_slice(encode_text(text).as_bytes());
    out.extend_from_slice(b"</");
    out.extend_from_slice(tag.as_bytes());
    out.push(b'>');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_skeleton() {
        let item = TocItem::new(TocItemType::Article).with_number("Article 3").with_heading("A & B");
        let out = DefaultTemplates.render(&item, "id", b"");
        assert_eq!(
            out,
            b"<article><num>Article 3</num><heading>A &amp; B</heading>\
              <paragraph><content><p></p></content></paragraph></article>"
                .to_vec()
        );
    }

    #[test]
    fn test_container_wraps_children() {
        let item = TocItem::new(TocItemType::Chapter).with_id("c9");
        let out = DefaultTemplates.render(&item, "id", b"<article/>");
        assert_eq!(out, b"<chapter id=\"c9\"><article/></chapter>".to_vec());
    }

    #[test]
    fn test_recital_has_paragraph() {
        let item = TocItem::new(TocItemType::Recital).with_number("(4)");
        let out = DefaultTemplates.render(&item, "id", b"");
        assert_eq!(out, b"<recital><num>(4)</num><p></p></recital>".to_vec());
    }

    #[test]
    fn test_id_written_to_configured_attribute() {
        let item = TocItem::new(TocItemType::Section).with_id("s1");
        let out = DefaultTemplates.render(&item, "xml:id", b"");
        assert_eq!(out, b"<section xml:id=\"s1\"></section>".to_vec());
    }
}
