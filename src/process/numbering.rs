//! Sequence Renumbering
//!
//! Rewrites the `num` child of every element of one tag so the Nth element
//! in document order carries the label for ordinal N. Labels come from a
//! [`NumberFormat`]; any `Fn(&str, usize) -> String` closure is one.

use super::post::PostProcessor;
use crate::core::entities::encode_text;
use crate::edit::EditAccumulator;
use crate::error::Result;
use crate::index::{Cursor, DocumentIndex};

/// Child element holding the display number
pub const NUM_TAG: &str = "num";

/// Produces display labels for numbered elements
pub trait NumberFormat {
    /// Label for the element of `tag` at 1-based `ordinal`
    fn label(&self, tag: &str, ordinal: usize) -> String;
}

impl<F> NumberFormat for F
where
    F: Fn(&str, usize) -> String,
{
    fn label(&self, tag: &str, ordinal: usize) -> String {
        self(tag, ordinal)
    }
}

/// `Article {n}`, `({n})` for recitals, `{n}.` for anything else
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNumbering;

impl NumberFormat for DefaultNumbering {
    fn label(&self, tag: &str, ordinal: usize) -> String {
        match tag {
            "article" => format!("Article {}", ordinal),
            "recital" => format!("({})", ordinal),
            _ => format!("{}.", ordinal),
        }
    }
}

/// Renumber every `tag` element, then run the post-processing pass
pub fn renumber<N: NumberFormat + ?Sized>(
    input: &[u8],
    tag: &str,
    format: &N,
    post: &PostProcessor<'_>,
) -> Result<Vec<u8>> {
    let (numbered, changed) = renumber_only(input, tag, format)?;
    log::debug!("renumbered <{}>: {} labels rewritten", tag, changed);
    post.run(&numbered)
}

/// Renumber every `tag` element without post-processing
///
/// Returns the new buffer and how many labels changed.
pub fn renumber_only<N: NumberFormat + ?Sized>(input: &[u8], tag: &str, format: &N) -> Result<(Vec<u8>, usize)> {
    let doc = DocumentIndex::parse(input)?;
    let mut acc = EditAccumulator::new(input);

    for (position, element) in doc.elements_named(tag).enumerate() {
        let label = encode_text(&format.label(tag, position + 1)).into_owned();
        write_label(&element, label.as_bytes(), &mut acc);
    }

    let changed = acc.len();
    if changed == 0 {
        return Ok((input.to_vec(), 0));
    }
    Ok((acc.apply()?, changed))
}

pub fn renumber_articles<N: NumberFormat + ?Sized>(input: &[u8], format: &N, post: &PostProcessor<'_>) -> Result<Vec<u8>> {
    renumber(input, "article", format, post)
}

pub fn renumber_recitals<N: NumberFormat + ?Sized>(input: &[u8], format: &N, post: &PostProcessor<'_>) -> Result<Vec<u8>> {
    renumber(input, "recital", format, post)
}

/// Record the edit that makes `element`'s number read `label`
fn write_label(element: &Cursor<'_>, label: &[u8], acc: &mut EditAccumulator<'_>) {
    match element.child_named(NUM_TAG) {
        Some(num) if num.is_empty_element() => {
            acc.update_token(num.fragment(), wrap(&num.opening_tag(), label, &num.closing_tag()));
        }
        Some(num) => {
            if num.content_bytes() != label {
                acc.update_token(num.content_fragment(), label.to_vec());
            }
        }
        None => {
            let num = wrap(b"<num>", label, b"</num>");
            if element.is_empty_element() {
                let mut expanded = element.opening_tag();
                expanded.extend_from_slice(&num);
                expanded.extend_from_slice(&element.closing_tag());
                acc.update_token(element.fragment(), expanded);
            } else {
                acc.insert_after(element.start_tag(), num);
            }
        }
    }
}

fn wrap(open: &[u8], content: &[u8], close: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(open.len() + content.len() + close.len());
    out.extend_from_slice(open);
    out.extend_from_slice(content);
    out.extend_from_slice(close);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn nums(buffer: &[u8], tag: &str) -> Vec<String> {
        let doc = DocumentIndex::parse(buffer).unwrap();
        doc.elements_named(tag)
            .map(|e| e.child_named(NUM_TAG).map(|n| n.text()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_rewrites_existing_num_keeping_attributes() {
        let input = b"<body><article id=\"x\"><num class=\"n\">7</num><p/></article></body>";
        let (out, changed) = renumber_only(input, "article", &DefaultNumbering).unwrap();
        assert_eq!(changed, 1);
        assert_eq!(out, b"<body><article id=\"x\"><num class=\"n\">Article 1</num><p/></article></body>".to_vec());
    }

    #[test]
    fn test_synthesizes_missing_num() {
        let input = b"<body><article><p/></article><article/></body>";
        let (out, _) = renumber_only(input, "article", &DefaultNumbering).unwrap();
        assert_eq!(
            out,
            b"<body><article><num>Article 1</num><p/></article><article><num>Article 2</num></article></body>".to_vec()
        );
    }

    #[test]
    fn test_expands_self_closing_num() {
        let input = b"<body><recital><num id=\"n\"/></recital></body>";
        let (out, _) = renumber_only(input, "recital", &DefaultNumbering).unwrap();
        assert_eq!(out, b"<body><recital><num id=\"n\">(1)</num></recital></body>".to_vec());
    }

    #[test]
    fn test_monotonic_ordinals() {
        let input = b"<body><article><num>9</num></article><article><num>3</num></article>\
            <chapter><article><num>1</num></article></chapter></body>";
        let format = |_: &str, n: usize| n.to_string();
        let (out, _) = renumber_only(input, "article", &format).unwrap();
        let ordinals: Vec<usize> = nums(&out, "article").iter().map(|n| n.parse().unwrap()).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
    }

    #[test]
    fn test_unchanged_labels_record_no_edits() {
        let input = b"<body><article><num>Article 1</num></article></body>";
        let (out, changed) = renumber_only(input, "article", &DefaultNumbering).unwrap();
        assert_eq!(changed, 0);
        assert_eq!(out, input.to_vec());
    }

    #[test]
    fn test_labels_are_escaped() {
        let input = b"<body><level><num/></level></body>";
        let format = |_: &str, n: usize| format!("<{}>", n);
        let (out, _) = renumber_only(input, "level", &format).unwrap();
        assert_eq!(out, b"<body><level><num>&lt;1&gt;</num></level></body>".to_vec());
    }

    #[test]
    fn test_renumber_articles_post_processes() {
        let config = EngineConfig::default();
        let post = PostProcessor::new(&config);
        assert!(renumber_articles(b"<bill><body><article/></bill>", &DefaultNumbering, &post).is_err());

        let out = renumber_articles(b"<bill><body><article/></body></bill>", &DefaultNumbering, &post).unwrap();
        let doc = DocumentIndex::parse(&out).unwrap();
        assert!(doc.cursor_at("article", None).unwrap().id().is_some());
        assert!(doc.cursor_at("num", None).unwrap().id().is_some());
        assert_eq!(nums(&out, "article"), vec!["Article 1"]);
    }
}
