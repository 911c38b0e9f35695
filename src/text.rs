//! Text positions: half-open byte spans and line/column lookup.

use serde::Serialize;
use std::fmt;

/// A half-open byte range `[start, end)` over source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct TextSpan {
    start: usize,
    end: usize,
}

impl TextSpan {
    /// Create a span from bounds. `start` must not exceed `end`.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted span {start}..{end}");
        Self { start, end }
    }

    /// Create a span from a start offset and a length.
    pub fn from_len(start: usize, len: usize) -> Self {
        Self::new(start, start + len)
    }

    /// An empty span (a caret) at `offset`.
    pub fn empty(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when `other` lies entirely inside this span.
    ///
    /// An empty span positioned at `end` counts as contained, so a caret
    /// placed right after the last character of a token still selects it.
    pub fn contains(&self, other: TextSpan) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// True when the spans share at least one position, or touch when one is empty.
    pub fn intersects(&self, other: TextSpan) -> bool {
        other.start <= self.end && other.end >= self.start
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(&self, other: TextSpan) -> TextSpan {
        TextSpan::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Slice `text` by this span, if the bounds are valid char boundaries.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// 1-based line and column of a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

/// Maps byte offsets to line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self { line_starts }
    }

    pub fn line_column(&self, offset: usize) -> LineColumn {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        LineColumn {
            line: line + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_accepts_caret_at_end() {
        let span = TextSpan::new(4, 9);
        assert!(span.contains(TextSpan::empty(9)));
        assert!(span.contains(TextSpan::empty(4)));
        assert!(!span.contains(TextSpan::empty(10)));
        assert!(!span.contains(TextSpan::new(3, 5)));
    }

    #[test]
    fn cover_spans_both() {
        let a = TextSpan::new(2, 4);
        let b = TextSpan::new(8, 10);
        assert_eq!(a.cover(b), TextSpan::new(2, 10));
    }

    #[test]
    fn line_index_positions() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_column(0), LineColumn { line: 1, column: 1 });
        assert_eq!(index.line_column(4), LineColumn { line: 2, column: 2 });
        assert_eq!(index.line_column(6), LineColumn { line: 3, column: 1 });
        assert_eq!(index.line_column(8), LineColumn { line: 4, column: 2 });
    }
}
