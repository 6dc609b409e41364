//! Source location tracking for declaration strings and call sites.

use std::fmt;

/// A span inside a declaration string, identified by its starting position.
///
/// Declarations are short single strings, so a line:column pair plus a byte
/// length is enough to point at the offending token in every diagnostic.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Whether this span is empty (zero length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Extend this span to also cover `other`.
    ///
    /// Spans from one declaration share a line; the merged span starts at
    /// the leftmost column and ends at the rightmost end. Spans on different
    /// lines keep the first position and approximate the length.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        if self.line == other.line {
            let col = self.col.min(other.col);
            let end = (self.col + self.len).max(other.col + other.len);
            Span {
                line: self.line,
                col,
                len: end - col,
            }
        } else {
            Span {
                line: self.line,
                col: self.col,
                len: self.len + other.len,
            }
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
