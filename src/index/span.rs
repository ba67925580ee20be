//! Span - offset and length into original input
//!
//! Zero-copy reference to a portion of the input document. Spans are the
//! "fragments" the editing layer works with: a whole element, its content,
//! a start tag, an attribute value.

/// A span referencing a portion of the input document.
///
/// Size: 8 bytes (offset: 4 bytes, len: 4 bytes)
/// Legislative documents routinely carry elements larger than 64KB, so the
/// length is a full u32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[repr(C)]
pub struct Span {
    /// Byte offset into the original input
    pub offset: u32,
    /// Length in bytes
    pub len: u32,
}

impl Span {
    /// Create a new span
    #[inline]
    pub const fn new(offset: u32, len: u32) -> Self {
        Self { offset, len }
    }

    /// Create a span covering `start..end` (byte positions)
    #[inline]
    pub fn between(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self::new(start as u32, end.saturating_sub(start) as u32)
    }

    /// Create an empty span positioned at `offset` (an insertion point)
    #[inline]
    pub fn at(offset: usize) -> Self {
        Self::new(offset as u32, 0)
    }

    /// Create an empty span (used for "no value")
    #[inline]
    pub const fn empty() -> Self {
        Self { offset: 0, len: 0 }
    }

    /// Check if this span is empty
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Start offset as a buffer index
    #[inline]
    pub const fn start(&self) -> usize {
        self.offset as usize
    }

    /// End offset (exclusive) as a buffer index
    #[inline]
    pub const fn end(&self) -> usize {
        self.offset as usize + self.len as usize
    }

    /// Check whether `other` lies entirely inside this span
    #[inline]
    pub const fn contains(&self, other: &Span) -> bool {
        other.start() >= self.start() && other.end() <= self.end()
    }

    /// Extract the byte slice from input
    #[inline]
    pub fn slice<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        let start = self.start();
        let end = self.end();
        if end <= input.len() {
            &input[start..end]
        } else {
            &[]
        }
    }

    /// Extract as UTF-8 string from input
    #[inline]
    pub fn as_str<'a>(&self, input: &'a [u8]) -> Option<&'a str> {
        std::str::from_utf8(self.slice(input)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_basic() {
        let span = Span::new(5, 10);
        assert_eq!(span.offset, 5);
        assert_eq!(span.len, 10);
        assert_eq!(span.end(), 15);
        assert!(!span.is_empty());
    }

    #[test]
    fn test_span_between_and_at() {
        assert_eq!(Span::between(3, 8), Span::new(3, 5));
        let point = Span::at(4);
        assert!(point.is_empty());
        assert_eq!(point.start(), 4);
        assert_eq!(point.end(), 4);
    }

    #[test]
    fn test_span_slice() {
        let input = b"hello world";
        let span = Span::new(6, 5);
        assert_eq!(span.slice(input), b"world");
        assert_eq!(Span::new(8, 10).slice(input), b"");
    }

    #[test]
    fn test_span_as_str() {
        let input = b"hello world";
        let span = Span::new(0, 5);
        assert_eq!(span.as_str(input), Some("hello"));
    }

    #[test]
    fn test_span_contains() {
        let outer = Span::new(10, 20);
        assert!(outer.contains(&Span::new(10, 5)));
        assert!(outer.contains(&Span::at(30)));
        assert!(!outer.contains(&Span::new(25, 10)));
    }
}
