//! Post-Processing Pass
//!
//! Runs after every structural edit. One parse, one accumulator:
//!
//! 1. Depth-first id injection from the root. Skip-subtree tags are left
//!    alone entirely; skip-self tags get no id but their children are
//!    visited. Missing or blank ids are generated with the inherited prefix.
//!    Prefix-defining tags hand their own id down as the new prefix.
//! 2. Authorial note markers are renumbered 1..n in document order over the
//!    whole document, skip rules notwithstanding.
//!
//! Ids that are present and non-blank are never touched, so running the
//! pass on its own output changes nothing.

use super::ids;
use crate::config::EngineConfig;
use crate::core::entities::encode_attribute;
use crate::edit::EditAccumulator;
use crate::error::{EditError, Result};
use crate::index::{Cursor, DocumentIndex};

/// Counts of what a pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub ids_injected: usize,
    pub markers_updated: usize,
}

/// The post-processing pass, parameterized by the engine configuration
#[derive(Debug, Clone, Copy)]
pub struct PostProcessor<'c> {
    config: &'c EngineConfig,
}

impl<'c> PostProcessor<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        Self { config }
    }

    /// Run the pass over `input`, returning the processed buffer
    pub fn run(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.run_with_report(input).map(|(out, _)| out)
    }

    /// Run the pass and report what it changed
    pub fn run_with_report(&self, input: &[u8]) -> Result<(Vec<u8>, PassReport)> {
        let doc = DocumentIndex::parse_with_id_attribute(input, &self.config.id_attribute)?;
        let root = doc
            .root()
            .ok_or_else(|| EditError::malformed(0, "Document has no root element"))?;

        let mut acc = EditAccumulator::new(input);
        let report = PassReport {
            ids_injected: self.inject_ids(root, &mut acc),
            markers_updated: self.renumber_notes(&doc, &mut acc),
        };

        log::debug!(
            "post-processing: {} ids injected, {} note markers updated",
            report.ids_injected,
            report.markers_updated
        );

        if acc.is_empty() {
            return Ok((input.to_vec(), report));
        }
        Ok((acc.apply()?, report))
    }

    /// Ensure ids below (and including) `root`; returns how many were generated
    fn inject_ids(&self, root: Cursor<'_>, acc: &mut EditAccumulator<'_>) -> usize {
        let mut count = 0;
        // Children are pushed in reverse so elements pop in document order
        let mut pending: Vec<(Cursor<'_>, Option<String>)> = vec![(root, None)];

        while let Some((element, inherited)) = pending.pop() {
            let name = element.name();
            if self.config.skips_subtree(name) {
                continue;
            }

            let existing = element.id().filter(|id| !id.trim().is_empty());
            let mut generated = None;

            if existing.is_none() && !self.config.skips_self(name) {
                let id = ids::generate(inherited.as_deref(), self.config.id_length);
                match element.attribute_span(&self.config.id_attribute) {
                    // Present but blank
                    Some(value) => acc.update_token(value, encode_attribute(&id).as_bytes()),
                    None => acc.insert_attribute(&element, &self.config.id_attribute, &encode_attribute(&id)),
                }
                generated = Some(id);
                count += 1;
            }

            let propagated = if self.config.defines_prefix(name) {
                generated.or_else(|| existing.map(str::to_owned)).or(inherited)
            } else {
                inherited
            };

            let children: Vec<Cursor<'_>> = element.children().collect();
            pending.extend(children.into_iter().rev().map(|child| (child, propagated.clone())));
        }
        count
    }

    /// Overwrite every authorial note marker with its 1-based position
    fn renumber_notes(&self, doc: &DocumentIndex<'_>, acc: &mut EditAccumulator<'_>) -> usize {
        let attr = self.config.note_marker_attribute.as_str();
        let mut updated = 0;

        for (position, note) in doc.elements_named(&self.config.note_tag).enumerate() {
            let marker = (position + 1).to_string();
            if note.attribute(attr) == Some(marker.as_str()) {
                continue;
            }
            match note.attribute_span(attr) {
                Some(value) => {
                    acc.update_token(value, marker.into_bytes());
                    updated += 1;
                }
                None => {
                    acc.insert_attribute(&note, attr, &marker);
                    updated += 1;
                }
            }
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &[u8]) -> Vec<u8> {
        let config = EngineConfig::default();
        PostProcessor::new(&config).run(input).unwrap()
    }

    fn id_of(buffer: &[u8], tag: &str) -> String {
        let doc = DocumentIndex::parse(buffer).unwrap();
        doc.cursor_at(tag, None).unwrap().id().unwrap().to_string()
    }

    #[test]
    fn test_injects_missing_ids() {
        let out = run(b"<akomaNtoso><bill><body><article><paragraph/></article></body></bill></akomaNtoso>");
        let doc = DocumentIndex::parse(&out).unwrap();

        assert!(doc.cursor_at("akomaNtoso", None).unwrap().id().is_none());
        assert!(doc.cursor_at("bill", None).unwrap().id().is_none());
        assert!(doc.cursor_at("body", None).unwrap().id().is_some());
        assert!(doc.cursor_at("article", None).unwrap().id().is_some());
        assert!(doc.cursor_at("paragraph", None).unwrap().id().is_some());
    }

    #[test]
    fn test_prefix_inheritance_from_article() {
        let out = run(b"<article id=\"akn_art1\"><paragraph/></article>");
        assert!(id_of(&out, "paragraph").starts_with("akn_art1"));
        assert_eq!(id_of(&out, "article"), "akn_art1");
    }

    #[test]
    fn test_non_prefix_defining_passes_inherited_prefix() {
        let out = run(b"<article id=\"art\"><paragraph id=\"par\"><content/></paragraph></article>");
        let content = id_of(&out, "content");
        assert!(content.starts_with("art_"));
        assert!(!content.starts_with("par"));
    }

    #[test]
    fn test_generated_article_id_becomes_prefix() {
        let out = run(b"<body id=\"b\"><article><paragraph/></article></body>");
        let article = id_of(&out, "article");
        assert!(id_of(&out, "paragraph").starts_with(&format!("{}_", article)));
    }

    #[test]
    fn test_skip_subtree_untouched() {
        let input = b"<bill><meta><identification><x/></identification></meta><body/></bill>";
        let out = run(input);
        let doc = DocumentIndex::parse(&out).unwrap();
        assert!(doc.cursor_at("meta", None).unwrap().id().is_none());
        assert!(doc.cursor_at("x", None).unwrap().id().is_none());
        assert!(doc.cursor_at("body", None).unwrap().id().is_some());
        assert!(out.starts_with(b"<bill><meta><identification><x/></identification></meta><body id=\""));
    }

    #[test]
    fn test_blank_id_replaced() {
        let out = run(b"<body id=\"  \"><p id=\"\"/></body>");
        let doc = DocumentIndex::parse(&out).unwrap();
        assert!(!doc.cursor_at("body", None).unwrap().id().unwrap().trim().is_empty());
        assert!(!doc.cursor_at("p", None).unwrap().id().unwrap().is_empty());
    }

    #[test]
    fn test_idempotent() {
        let once = run(b"<bill><body><article><num>1</num><authorialNote>n</authorialNote></article></body></bill>");
        let twice = run(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_existing_ids_preserved_byte_for_byte() {
        let input = b"<body id=\"b\">\n  <article id=\"a1\" class=\"k\"><p id=\"p\">x &amp; y</p></article>\n</body>";
        assert_eq!(run(input), input.to_vec());
    }

    #[test]
    fn test_note_markers_renumbered() {
        let input = b"<bill><meta><authorialNote id=\"m\" marker=\"9\"/></meta><body id=\"b\">\
            <p id=\"p\"><authorialNote id=\"n1\" marker=\"5\">a</authorialNote>\
            <authorialNote id=\"n2\">b</authorialNote></p></body></bill>";
        let config = EngineConfig::default();
        let (out, report) = PostProcessor::new(&config).run_with_report(input).unwrap();
        assert_eq!(report.ids_injected, 0);
        assert_eq!(report.markers_updated, 3);

        let doc = DocumentIndex::parse(&out).unwrap();
        let markers: Vec<_> = doc
            .elements_named("authorialNote")
            .map(|n| n.attribute("marker").unwrap().to_string())
            .collect();
        assert_eq!(markers, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_malformed_input_fails() {
        let config = EngineConfig::default();
        assert!(PostProcessor::new(&config).run(b"<a>").is_err());
    }

    #[test]
    fn test_deep_nesting() {
        let nested = |depth: usize| {
            let mut xml = String::from("<bill><body>");
            xml.push_str(&"<level>".repeat(depth));
            xml.push_str(&"</level>".repeat(depth));
            xml.push_str("</body></bill>");
            xml.into_bytes()
        };

        let out = run(&nested(200));
        let doc = DocumentIndex::parse(&out).unwrap();
        assert!(doc.elements_named("level").all(|level| level.id().is_some()));

        let config = EngineConfig::default();
        let err = PostProcessor::new(&config).run(&nested(40_000)).unwrap_err();
        assert!(matches!(err, EditError::MalformedDocument { .. }));
    }
}
