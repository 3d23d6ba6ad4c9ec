//! Byte ranges into schema source text.

/// A half-open byte range `start..end` in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the first byte
    pub start: u32,
    /// Byte offset one past the last byte
    pub end: u32,
}

impl Span {
    #[inline]
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// A zero-width span at `pos`, used for "expected X here" errors.
    #[inline]
    pub fn empty(pos: u32) -> Self {
        Self::new(pos, pos)
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` falls inside the span. The end offset counts as inside,
    /// so a cursor sitting right after a word still belongs to it.
    #[inline]
    pub fn touches(&self, offset: u32) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Slice the source text covered by this span.
    #[inline]
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start as usize..self.end as usize]
    }
}

impl From<std::ops::Range<u32>> for Span {
    fn from(range: std::ops::Range<u32>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start as usize..span.end as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touches_includes_both_ends() {
        let span = Span::new(4, 8);
        assert!(span.touches(4));
        assert!(span.touches(8));
        assert!(!span.touches(3));
        assert!(!span.touches(9));
    }

    #[test]
    fn slice_and_len() {
        let source = "type Foo {}";
        let span = Span::new(5, 8);
        assert_eq!(span.slice(source), "Foo");
        assert_eq!(span.len(), 3);
        assert!(Span::empty(2).is_empty());
    }
}
