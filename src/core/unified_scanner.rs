//! Unified Scanner with ScanHandler Trait
//!
//! Strict tokenizer that drives index building. The scanner reports every
//! token as spans (byte offsets) instead of string copies, and fails with
//! `MalformedDocument` on lexical errors. Nesting errors (mismatched end
//! tags, unclosed elements) are the handler's business since only the
//! handler keeps an element stack.
//!
//! The scanner uses the memchr-based Scanner for byte searching.

use super::entities::find_bad_reference;
use super::scanner::{is_name_start_char, Scanner};
use crate::error::{EditError, Result};
use crate::index::Span;

/// Trait for handling scan events
///
/// Implement this trait to receive XML tokens. All positions are spans into
/// the scanned input.
pub trait ScanHandler {
    /// Called when an element starts
    ///
    /// # Arguments
    /// * `tag` - Span of the whole start tag, from `<` through `>` (or `/>`)
    /// * `name` - Span of the element name
    /// * `attrs` - Slice of (name_span, value_span) pairs, value excludes quotes
    /// * `is_empty` - True if this is a self-closing element (e.g., `<br/>`)
    fn start_element(&mut self, tag: Span, name: Span, attrs: &[(Span, Span)], is_empty: bool);

    /// Called when an element ends
    ///
    /// # Arguments
    /// * `tag` - Span of the whole end tag, from `</` through `>`
    /// * `name` - Span of the element name in the end tag
    fn end_element(&mut self, tag: Span, name: Span);

    /// Called for character data outside markup
    fn text(&mut self, span: Span);

    /// Called for CDATA sections (span excludes `<![CDATA[` and `]]>`)
    fn cdata(&mut self, span: Span) {
        self.text(span);
    }

    /// Called for comments (span excludes `<!--` and `-->`)
    fn comment(&mut self, _span: Span) {}

    /// Called for processing instructions and the XML declaration
    fn processing_instruction(&mut self, _target: Span, _data: Option<Span>) {}

    /// Called for DOCTYPE
    fn doctype(&mut self, _content: Span) {}
}

/// Unified scanner that uses ScanHandler for event dispatch
pub struct UnifiedScanner<'a> {
    input: &'a [u8],
    scanner: Scanner<'a>,
    /// Reusable attribute buffer to avoid per-element allocations
    attrs_buf: Vec<(Span, Span)>,
    /// A DOCTYPE was seen, so entities beyond the predefined five may exist
    declared_entities: bool,
}

impl<'a> UnifiedScanner<'a> {
    /// Create a new unified scanner for the input
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            scanner: Scanner::new(input),
            attrs_buf: Vec::with_capacity(8), // Most elements have < 8 attrs
            declared_entities: false,
        }
    }

    /// Scan the entire document, calling handler methods for each token
    pub fn scan<H: ScanHandler>(&mut self, handler: &mut H) -> Result<()> {
        while !self.scanner.is_eof() {
            match self.scanner.peek() {
                Some(b'<') => self.scan_markup(handler)?,
                Some(_) => self.scan_text(handler)?,
                None => break,
            }
        }
        Ok(())
    }

    /// Scan markup starting with '<'
    fn scan_markup<H: ScanHandler>(&mut self, handler: &mut H) -> Result<()> {
        let start = self.scanner.position();

        match self.scanner.peek_at(1) {
            Some(b'/') => {
                self.scanner.advance(2);
                self.scan_end_tag(start, handler)
            }
            Some(b'!') => {
                self.scanner.advance(2);
                if self.scanner.starts_with(b"--") {
                    self.scanner.advance(2);
                    self.scan_comment(start, handler)
                } else if self.scanner.starts_with(b"[CDATA[") {
                    self.scanner.advance(7);
                    self.scan_cdata(start, handler)
                } else if self.scanner.starts_with(b"DOCTYPE") {
                    self.scan_doctype(start, handler)
                } else {
                    Err(EditError::malformed(start, "Unknown markup declaration"))
                }
            }
            Some(b'?') => {
                self.scanner.advance(2);
                self.scan_pi(start, handler)
            }
            Some(c) if is_name_start_char(c) => self.scan_start_tag(start, handler),
            _ => Err(EditError::malformed(start, "Invalid markup after '<'")),
        }
    }

    /// Scan a start tag
    fn scan_start_tag<H: ScanHandler>(&mut self, start: usize, handler: &mut H) -> Result<()> {
        self.scanner.advance(1); // Skip '<'

        let name_start = self.scanner.position();
        if self.scanner.read_name().is_none() {
            return Err(EditError::malformed(start, "Invalid element name"));
        }
        let name_span = Span::between(name_start, self.scanner.position());

        self.attrs_buf.clear();

        loop {
            let had_space = matches!(self.scanner.peek(), Some(b' ' | b'\t' | b'\n' | b'\r'));
            self.scanner.skip_whitespace();
            match self.scanner.peek() {
                Some(b'>') => {
                    self.scanner.advance(1);
                    self.check_duplicate_attributes(start)?;
                    let tag = Span::between(start, self.scanner.position());
                    handler.start_element(tag, name_span, &self.attrs_buf, false);
                    return Ok(());
                }
                Some(b'/') => {
                    if self.scanner.peek_at(1) != Some(b'>') {
                        return Err(EditError::malformed(
                            self.scanner.position(),
                            "Expected '>' after '/' in start tag",
                        ));
                    }
                    self.scanner.advance(2);
                    self.check_duplicate_attributes(start)?;
                    let tag = Span::between(start, self.scanner.position());
                    handler.start_element(tag, name_span, &self.attrs_buf, true);
                    return Ok(());
                }
                Some(c) if is_name_start_char(c) && had_space => {
                    let attr = self.scan_attribute()?;
                    self.attrs_buf.push(attr);
                }
                Some(_) => {
                    return Err(EditError::malformed(
                        self.scanner.position(),
                        "Unexpected character in start tag",
                    ));
                }
                None => {
                    return Err(EditError::malformed(start, "Unterminated start tag"));
                }
            }
        }
    }

    /// Scan an attribute, returning (name_span, value_span)
    fn scan_attribute(&mut self) -> Result<(Span, Span)> {
        let name_start = self.scanner.position();
        self.scanner.read_name();
        let name_span = Span::between(name_start, self.scanner.position());

        self.scanner.skip_whitespace();
        if self.scanner.peek() != Some(b'=') {
            return Err(EditError::malformed(
                self.scanner.position(),
                "Attribute without value",
            ));
        }
        self.scanner.advance(1);
        self.scanner.skip_whitespace();

        let quote = match self.scanner.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => {
                return Err(EditError::malformed(
                    self.scanner.position(),
                    "Attribute value must be quoted",
                ))
            }
        };
        self.scanner.advance(1);

        let value_start = self.scanner.position();
        let value_end = self.scanner.find_byte(quote).ok_or_else(|| {
            EditError::malformed(value_start, "Unterminated attribute value")
        })?;
        self.scanner.set_position(value_start);
        if let Some(lt) = self.scanner.find_tag_start() {
            if lt < value_end {
                return Err(EditError::malformed(lt, "'<' not allowed in attribute value"));
            }
        }
        let value = Span::between(value_start, value_end);
        self.check_references(value)?;
        self.scanner.set_position(value_end + 1);

        Ok((name_span, value))
    }

    /// Scan an end tag (positioned after `</`)
    fn scan_end_tag<H: ScanHandler>(&mut self, start: usize, handler: &mut H) -> Result<()> {
        let name_start = self.scanner.position();
        if self.scanner.read_name().is_none() {
            return Err(EditError::malformed(start, "Invalid end tag name"));
        }
        let name_span = Span::between(name_start, self.scanner.position());

        self.scanner.skip_whitespace();
        if self.scanner.peek() != Some(b'>') {
            return Err(EditError::malformed(start, "Unterminated end tag"));
        }
        self.scanner.advance(1);

        handler.end_element(Span::between(start, self.scanner.position()), name_span);
        Ok(())
    }

    /// Scan text content up to the next '<'
    fn scan_text<H: ScanHandler>(&mut self, handler: &mut H) -> Result<()> {
        let start = self.scanner.position();
        let end = self
            .scanner
            .find_tag_start()
            .unwrap_or(self.input.len());
        self.check_references(Span::between(start, end))?;
        self.scanner.set_position(end);
        if end > start {
            handler.text(Span::between(start, end));
        }
        Ok(())
    }

    /// Reject a bare '&' or an unknown reference inside `span`
    fn check_references(&self, span: Span) -> Result<()> {
        match find_bad_reference(span.slice(self.input), self.declared_entities) {
            Some(at) => Err(EditError::malformed(span.start() + at, "Invalid entity reference")),
            None => Ok(()),
        }
    }

    /// Scan a comment (positioned after `<!--`)
    fn scan_comment<H: ScanHandler>(&mut self, start: usize, handler: &mut H) -> Result<()> {
        let content_start = self.scanner.position();
        let end = self
            .scanner
            .find_sequence(b"-->")
            .ok_or_else(|| EditError::malformed(start, "Unterminated comment"))?;
        self.scanner.set_position(end + 3);
        handler.comment(Span::between(content_start, end));
        Ok(())
    }

    /// Scan a CDATA section (positioned after `<![CDATA[`)
    fn scan_cdata<H: ScanHandler>(&mut self, start: usize, handler: &mut H) -> Result<()> {
        let content_start = self.scanner.position();
        let end = self
            .scanner
            .find_sequence(b"]]>")
            .ok_or_else(|| EditError::malformed(start, "Unterminated CDATA section"))?;
        self.scanner.set_position(end + 3);
        handler.cdata(Span::between(content_start, end));
        Ok(())
    }

    /// Scan a processing instruction (positioned after `<?`)
    fn scan_pi<H: ScanHandler>(&mut self, start: usize, handler: &mut H) -> Result<()> {
        let target_start = self.scanner.position();
        if self.scanner.read_name().is_none() {
            return Err(EditError::malformed(start, "Invalid processing instruction target"));
        }
        let target = Span::between(target_start, self.scanner.position());
        self.scanner.skip_whitespace();

        let data_start = self.scanner.position();
        let end = self
            .scanner
            .find_sequence(b"?>")
            .ok_or_else(|| EditError::malformed(start, "Unterminated processing instruction"))?;
        self.scanner.set_position(end + 2);

        let data = (end > data_start).then(|| Span::between(data_start, end));
        handler.processing_instruction(target, data);
        Ok(())
    }

    /// Scan DOCTYPE (positioned at `DOCTYPE`), honouring an internal subset
    fn scan_doctype<H: ScanHandler>(&mut self, start: usize, handler: &mut H) -> Result<()> {
        let content_start = self.scanner.position();
        let mut depth = 0usize;

        while let Some(c) = self.scanner.peek() {
            match c {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => {
                    let end = self.scanner.position();
                    self.declared_entities = true;
                    self.scanner.advance(1);
                    handler.doctype(Span::between(content_start, end));
                    return Ok(());
                }
                _ => {}
            }
            self.scanner.advance(1);
        }
        Err(EditError::malformed(start, "Unterminated DOCTYPE"))
    }

    /// Reject a start tag that repeats an attribute name
    fn check_duplicate_attributes(&self, start: usize) -> Result<()> {
        for (i, (name, _)) in self.attrs_buf.iter().enumerate() {
            let bytes = name.slice(self.input);
            if self.attrs_buf[..i]
                .iter()
                .any(|(earlier, _)| earlier.slice(self.input) == bytes)
            {
                return Err(EditError::malformed(
                    start,
                    format!("Duplicate attribute: {}", String::from_utf8_lossy(bytes)),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test handler that records token kinds with their spans
    #[derive(Default)]
    struct TestHandler {
        starts: Vec<(Span, Span, usize, bool)>, // (tag, name, attr count, is_empty)
        ends: Vec<(Span, Span)>,
        texts: Vec<Span>,
        comments: Vec<Span>,
    }

    impl ScanHandler for TestHandler {
        fn start_element(&mut self, tag: Span, name: Span, attrs: &[(Span, Span)], is_empty: bool) {
            self.starts.push((tag, name, attrs.len(), is_empty));
        }

        fn end_element(&mut self, tag: Span, name: Span) {
            self.ends.push((tag, name));
        }

        fn text(&mut self, span: Span) {
            self.texts.push(span);
        }

        fn comment(&mut self, span: Span) {
            self.comments.push(span);
        }
    }

    fn scan(input: &[u8]) -> Result<TestHandler> {
        let mut handler = TestHandler::default();
        UnifiedScanner::new(input).scan(&mut handler)?;
        Ok(handler)
    }

    #[test]
    fn test_tag_spans() {
        let input = b"<a x=\"1\"><b/></a>";
        let handler = scan(input).unwrap();

        assert_eq!(handler.starts.len(), 2);
        let (tag, name, attrs, empty) = handler.starts[0];
        assert_eq!(tag.slice(input), b"<a x=\"1\">");
        assert_eq!(name.slice(input), b"a");
        assert_eq!(attrs, 1);
        assert!(!empty);

        let (tag, _, _, empty) = handler.starts[1];
        assert_eq!(tag.slice(input), b"<b/>");
        assert!(empty);

        let (tag, name) = handler.ends[0];
        assert_eq!(tag.slice(input), b"</a>");
        assert_eq!(name.slice(input), b"a");
    }

    #[test]
    fn test_attribute_value_span_excludes_quotes() {
        struct AttrCollector(Vec<(Span, Span)>);
        impl ScanHandler for AttrCollector {
            fn start_element(&mut self, _tag: Span, _name: Span, attrs: &[(Span, Span)], _empty: bool) {
                self.0.extend_from_slice(attrs);
            }
            fn end_element(&mut self, _tag: Span, _name: Span) {}
            fn text(&mut self, _span: Span) {}
        }

        let input = b"<a id='x1' >t</a>";
        let mut handler = AttrCollector(Vec::new());
        UnifiedScanner::new(input).scan(&mut handler).unwrap();
        assert_eq!(handler.0.len(), 1);
        assert_eq!(handler.0[0].0.slice(input), b"id");
        assert_eq!(handler.0[0].1.slice(input), b"x1");
    }

    #[test]
    fn test_comment_and_text() {
        let input = b"<!-- note --><a>hello</a>";
        let handler = scan(input).unwrap();
        assert_eq!(handler.comments.len(), 1);
        assert_eq!(handler.comments[0].slice(input), b" note ");
        assert_eq!(handler.texts.len(), 1);
        assert_eq!(handler.texts[0].slice(input), b"hello");
    }

    #[test]
    fn test_cdata_reported_as_text() {
        let input = b"<a><![CDATA[x < y]]></a>";
        let handler = scan(input).unwrap();
        assert_eq!(handler.texts[0].slice(input), b"x < y");
    }

    #[test]
    fn test_invalid_markup_is_malformed() {
        let err = scan(b"<1invalid/>").err().unwrap();
        assert!(matches!(err, EditError::MalformedDocument { offset: 0, .. }));
    }

    #[test]
    fn test_unterminated_constructs() {
        assert!(scan(b"<a><!-- open").is_err());
        assert!(scan(b"<a><![CDATA[open").is_err());
        assert!(scan(b"<a x=\"1").is_err());
        assert!(scan(b"<a").is_err());
    }

    #[test]
    fn test_unquoted_attribute_rejected() {
        assert!(scan(b"<a x=1></a>").is_err());
        assert!(scan(b"<a x></a>").is_err());
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let err = scan(b"<a x=\"1\" x=\"2\"></a>").err().unwrap();
        assert!(err.to_string().contains("Duplicate attribute: x"));
    }

    #[test]
    fn test_bad_references_rejected() {
        let err = scan(b"<a>x & y</a>").err().unwrap();
        assert!(matches!(err, EditError::MalformedDocument { offset: 5, .. }));
        assert!(scan(b"<a>&undefined;</a>").is_err());
        assert!(scan(b"<a t=\"x&y\"/>").is_err());
        assert!(scan(b"<a t=\"&lt;&#38;\">&amp;&#x263A;</a>").is_ok());
    }

    #[test]
    fn test_doctype_allows_declared_entities() {
        assert!(scan(b"<!DOCTYPE a [<!ENTITY e \"v\">]><a>&e;</a>").is_ok());
    }
}
