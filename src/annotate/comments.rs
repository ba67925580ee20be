//! Inline comments
//!
//! A comment lives next to the element it annotates as a marker element:
//!
//! ```text
//! <popup id="c1" refersTo="~leosComment" dateTime="2024-03-01T10:00:00Z">
//!   <p>first line</p><p>second line</p>
//! </popup>
//! ```
//!
//! The enclosing element's id identifies what the comment is about.

use crate::core::entities::{encode_attribute, encode_text};
use crate::core::scanner::is_blank;
use crate::edit::EditAccumulator;
use crate::error::{EditError, Result};
use crate::index::{Cursor, DocumentIndex};
use crate::process::PostProcessor;

/// `refersTo` value that marks a comment
pub const COMMENT_REFERS_TO: &str = "~leosComment";

/// Default marker element
pub const DEFAULT_COMMENT_TAG: &str = "popup";

/// One extracted or to-be-inserted comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Id of the element the marker sits in; `None` when that element has none
    pub enclosing_element_id: Option<String>,
    pub comment_id: String,
    /// One entry per line
    pub content: Vec<String>,
    pub timestamp: Option<String>,
}

impl Comment {
    /// Serialize as a marker element named `tag`
    pub fn to_markup(&self, tag: &str) -> String {
        let mut out = format!(
            "<{} id=\"{}\" refersTo=\"{}\"",
            tag,
            encode_attribute(&self.comment_id),
            COMMENT_REFERS_TO
        );
        if let Some(timestamp) = &self.timestamp {
            out.push_str(&format!(" dateTime=\"{}\"", encode_attribute(timestamp)));
        }
        out.push('>');
        for line in &self.content {
            out.push_str("<p>");
            out.push_str(&encode_text(line));
            out.push_str("</p>");
        }
        out.push_str(&format!("</{}>", tag));
        out
    }
}

/// Turns a run of adjacent comment markers into comments
pub trait CommentParser {
    /// `markup` is the source bytes from the first marker of the run to the
    /// end of the last one; all markers share `enclosing_element_id`
    fn parse(&self, enclosing_element_id: Option<&str>, markup: &[u8]) -> Result<Vec<Comment>>;
}

/// Parses the marker format written by [`Comment::to_markup`]
#[derive(Debug, Clone)]
pub struct PopupCommentParser {
    tag: String,
}

impl PopupCommentParser {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl Default for PopupCommentParser {
    fn default() -> Self {
        Self::new(DEFAULT_COMMENT_TAG)
    }
}

impl CommentParser for PopupCommentParser {
    fn parse(&self, enclosing_element_id: Option<&str>, markup: &[u8]) -> Result<Vec<Comment>> {
        // A run may hold several markers, so give it a single root
        let mut wrapped = Vec::with_capacity(markup.len() + 16);
        wrapped.extend_from_slice(b"<comments>");
        wrapped.extend_from_slice(markup);
        wrapped.extend_from_slice(b"</comments>");

        let doc = DocumentIndex::parse(&wrapped)?;
        let root = doc
            .root()
            .ok_or_else(|| EditError::malformed(0, "Empty comment markup"))?;

        Ok(root
            .children()
            .filter(|marker| is_marker(marker, &self.tag))
            .map(|marker| Comment {
                enclosing_element_id: enclosing_element_id.map(str::to_owned),
                comment_id: marker.id().unwrap_or_default().to_string(),
                content: marker.children().filter(|c| c.is("p")).map(|p| p.text()).collect(),
                timestamp: marker.attribute("dateTime").map(str::to_owned),
            })
            .collect())
    }
}

#[inline]
fn is_marker(element: &Cursor<'_>, tag: &str) -> bool {
    element.is(tag) && element.attribute("refersTo") == Some(COMMENT_REFERS_TO)
}

/// Splice comment markup into the element with id `element_id`
///
/// At the start, the markup goes after the opening tag and after any
/// comment markers already leading the content; otherwise right before
/// the closing tag. The result is post-processed.
pub fn insert_comment(
    doc: &DocumentIndex<'_>,
    element_id: &str,
    markup: &[u8],
    at_start: bool,
    comment_tag: &str,
    post: &PostProcessor<'_>,
) -> Result<Vec<u8>> {
    let input = doc.input();
    let target = doc
        .cursor_by_id(element_id)
        .ok_or_else(|| EditError::not_found(None, Some(element_id)))?;

    let mut acc = EditAccumulator::new(input);
    if target.is_empty_element() {
        let mut expanded = target.opening_tag();
        expanded.extend_from_slice(markup);
        expanded.extend_from_slice(&target.closing_tag());
        acc.update_token(target.fragment(), expanded);
    } else if at_start {
        let mut anchor = target.start_tag();
        let mut next = target.first_child();
        while let Some(marker) = next.filter(|c| is_marker(c, comment_tag)) {
            if !is_blank(&input[anchor.end()..marker.fragment().start()]) {
                break;
            }
            anchor = marker.fragment();
            next = marker.next_sibling();
        }
        acc.insert_after(anchor, markup);
    } else {
        acc.insert_after(target.content_fragment(), markup);
    }

    log::debug!("insert comment into {:?} (at start: {})", element_id, at_start);
    post.run(&acc.apply()?)
}

/// Sibling markers separated by nothing but whitespace
fn adjacent(input: &[u8], first: &Cursor<'_>, second: &Cursor<'_>) -> bool {
    first.next_sibling() == Some(*second)
        && is_blank(&input[first.fragment().end()..second.fragment().start()])
}

/// Extract every comment in document order
///
/// Markers that are adjacent siblings, with only whitespace between them,
/// go to the parser together.
pub fn extract_comments<P: CommentParser + ?Sized>(
    doc: &DocumentIndex<'_>,
    comment_tag: &str,
    parser: &P,
) -> Result<Vec<Comment>> {
    let input = doc.input();
    let markers: Vec<Cursor<'_>> = doc
        .elements_named(comment_tag)
        .filter(|c| is_marker(c, comment_tag))
        .collect();

    let mut comments = Vec::with_capacity(markers.len());
    let mut runs = 0;
    let mut start = 0;
    while start < markers.len() {
        let mut end = start;
        while end + 1 < markers.len() && adjacent(input, &markers[end], &markers[end + 1]) {
            end += 1;
        }

        let first = markers[start];
        let enclosing = first.parent().and_then(|p| p.id());
        if enclosing.is_none() {
            log::warn!("comment marker at byte {} has no enclosing element id", first.fragment().start());
        }

        let run = &input[first.fragment().start()..markers[end].fragment().end()];
        comments.extend(parser.parse(enclosing, run)?);
        runs += 1;
        start = end + 1;
    }

    log::debug!("extracted {} comments from {} marker runs", comments.len(), runs);
    Ok(comments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn parse(input: &[u8]) -> DocumentIndex<'_> {
        DocumentIndex::parse(input).unwrap()
    }

    fn comment(id: &str, lines: &[&str]) -> Comment {
        Comment {
            enclosing_element_id: None,
            comment_id: id.to_string(),
            content: lines.iter().map(|l| l.to_string()).collect(),
            timestamp: Some("2024-03-01T10:00:00Z".to_string()),
        }
    }

    #[test]
    fn test_markup_round_trip() {
        let c = comment("c1", &["one", "two & three"]);
        let markup = c.to_markup("popup");
        assert_eq!(
            markup,
            "<popup id=\"c1\" refersTo=\"~leosComment\" dateTime=\"2024-03-01T10:00:00Z\">\
             <p>one</p><p>two &amp; three</p></popup>"
        );

        let parsed = PopupCommentParser::default().parse(Some("p1"), markup.as_bytes()).unwrap();
        assert_eq!(
            parsed,
            vec![Comment {
                enclosing_element_id: Some("p1".to_string()),
                ..c
            }]
        );
    }

    #[test]
    fn test_extract_adjacent_comments_share_enclosing_id() {
        let input = format!(
            "<bill><body id=\"b\"><paragraph id=\"p1\">{}\n{}<content>x</content></paragraph></body></bill>",
            comment("c1", &["a"]).to_markup("popup"),
            comment("c2", &["b"]).to_markup("popup")
        );
        let comments = extract_comments(&parse(input.as_bytes()), "popup", &PopupCommentParser::default()).unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].comment_id, "c1");
        assert_eq!(comments[1].comment_id, "c2");
        assert!(comments
            .iter()
            .all(|c| c.enclosing_element_id.as_deref() == Some("p1")));
    }

    #[test]
    fn test_extract_groups_runs_per_parent() {
        struct Counting(std::cell::Cell<usize>);
        impl CommentParser for Counting {
            fn parse(&self, enclosing: Option<&str>, markup: &[u8]) -> Result<Vec<Comment>> {
                self.0.set(self.0.get() + 1);
                PopupCommentParser::default().parse(enclosing, markup)
            }
        }

        let c = |id: &str| comment(id, &["x"]).to_markup("popup");
        let input = format!(
            "<body><p id=\"a\">{} {}</p><p id=\"b\">{}<i/>{}text{}</p></body>",
            c("1"),
            c("2"),
            c("3"),
            c("4"),
            c("5")
        );
        let parser = Counting(std::cell::Cell::new(0));
        let comments = extract_comments(&parse(input.as_bytes()), "popup", &parser).unwrap();
        assert_eq!(parser.0.get(), 4);
        let enclosing: Vec<_> = comments
            .iter()
            .map(|c| c.enclosing_element_id.clone().unwrap())
            .collect();
        assert_eq!(enclosing, vec!["a", "a", "b", "b", "b"]);
    }

    #[test]
    fn test_other_popups_are_not_comments() {
        let input = b"<body><p id=\"a\"><popup id=\"x\" refersTo=\"~other\"/></p></body>";
        assert!(extract_comments(&parse(input), "popup", &PopupCommentParser::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_insert_at_start_after_existing_markers() {
        let config = EngineConfig::default();
        let post = PostProcessor::new(&config);
        let existing = comment("c1", &["a"]).to_markup("popup");
        let input = format!("<body id=\"b\"><p id=\"p\">{}<span id=\"s\">t</span></p></body>", existing);
        let new = comment("c2", &["b"]).to_markup("popup");

        let out = insert_comment(&parse(input.as_bytes()), "p", new.as_bytes(), true, "popup", &post).unwrap();
        let doc = DocumentIndex::parse(&out).unwrap();
        let order: Vec<_> = doc.cursor_by_id("p").unwrap().children().map(|c| c.id().unwrap()).collect();
        assert_eq!(order, vec!["c1", "c2", "s"]);
    }

    #[test]
    fn test_insert_at_end_and_into_empty_element() {
        let config = EngineConfig::default();
        let post = PostProcessor::new(&config);
        let marker = b"<popup id=\"c\" refersTo=\"~leosComment\"/>";

        let out = insert_comment(&parse(b"<body id=\"b\"><p id=\"p\">t</p></body>"), "p", marker, false, "popup", &post).unwrap();
        assert_eq!(out, b"<body id=\"b\"><p id=\"p\">t<popup id=\"c\" refersTo=\"~leosComment\"/></p></body>".to_vec());

        let out = insert_comment(&parse(b"<body id=\"b\"><p id=\"p\"/></body>"), "p", marker, true, "popup", &post).unwrap();
        assert_eq!(out, b"<body id=\"b\"><p id=\"p\"><popup id=\"c\" refersTo=\"~leosComment\"/></p></body>".to_vec());
    }

    #[test]
    fn test_insert_unknown_element() {
        let config = EngineConfig::default();
        let post = PostProcessor::new(&config);
        let err = insert_comment(&parse(b"<body/>"), "nope", b"<popup/>", true, "popup", &post).unwrap_err();
        assert!(err.is_not_found());
    }
}
