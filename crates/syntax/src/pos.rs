//! Source positions and ranges.
//!
//! The AST stores plain byte spans. Line and column information is only
//! computed when a range leaves the crate, through [`LineIndex`].

use std::fmt;

use chumsky::span::SimpleSpan;
use serde::{Deserialize, Serialize};

/// A byte span inside a single file.
pub type Span = SimpleSpan<usize>;

/// A position inside a file.
///
/// `line` and `column` are 1-based, `byte` is a 0-based offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
    pub byte: usize,
}

impl Pos {
    pub const INITIAL: Self = Self {
        line: 1,
        column: 1,
        byte: 0,
    };

    pub const fn new(line: usize, column: usize, byte: usize) -> Self {
        Self { line, column, byte }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A range inside a named file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub filename: String,
    pub start: Pos,
    pub end: Pos,
}

impl Range {
    pub fn new(filename: impl Into<String>, start: Pos, end: Pos) -> Self {
        Self {
            filename: filename.into(),
            start,
            end,
        }
    }

    /// Whether `pos` falls inside the range, end excluded.
    pub const fn contains_pos(&self, pos: Pos) -> bool {
        self.contains_offset(pos.byte)
    }

    pub const fn contains_offset(&self, offset: usize) -> bool {
        offset >= self.start.byte && offset < self.end.byte
    }

    /// Whether `other` lies completely inside this range (same file).
    pub fn contains(&self, other: &Self) -> bool {
        self.filename == other.filename
            && other.start.byte >= self.start.byte
            && other.end.byte <= self.end.byte
    }

    pub fn span(&self) -> Span {
        SimpleSpan::from(self.start.byte..self.end.byte)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.filename, self.start, self.end)
    }
}

/// Byte offset to line/column lookup for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Total length in bytes of the indexed text.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Position of `byte` inside `text`. Offsets past the end are clamped.
    pub fn pos_at(&self, text: &str, byte: usize) -> Pos {
        let byte = byte.min(self.len);
        let line = match self.line_starts.binary_search(&byte) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = text
            .get(line_start..byte)
            .map_or(byte - line_start, |s| s.chars().count())
            + 1;
        Pos::new(line + 1, column, byte)
    }
}
