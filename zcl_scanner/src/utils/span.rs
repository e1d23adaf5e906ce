//! Source location tracking for the zcl scanner
//!
//! Positions carry three coordinates at once: the 0-based byte offset into the
//! scanned buffer and the 1-based line and column a human would read. Ranges
//! are half-open byte intervals with positions at both ends.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with byte offset, line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub byte: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    /// Create a new position
    pub fn new(byte: usize, line: u32, column: u32) -> Self {
        Self { byte, line, column }
    }

    /// Create the starting position (byte 0, line 1, column 1)
    pub fn start() -> Self {
        Self {
            byte: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open range of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Range {
    /// Create a new range
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start.byte <= end.byte, "Range start must not be after end");
        Self { start, end }
    }

    /// Create a zero-length range at a position
    pub fn empty(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Merge two ranges into one covering both
    pub fn merge(self, other: Self) -> Self {
        let start = if self.start.byte <= other.start.byte {
            self.start
        } else {
            other.start
        };

        let end = if self.end.byte >= other.end.byte {
            self.end
        } else {
            other.end
        };

        Self { start, end }
    }

    /// Get the byte length of this range
    pub fn len(&self) -> usize {
        self.end.byte - self.start.byte
    }

    /// Check if this range is empty
    pub fn is_empty(&self) -> bool {
        self.start.byte == self.end.byte
    }

    /// Check if this range contains a byte offset
    pub fn contains_byte(&self, byte: usize) -> bool {
        byte >= self.start.byte && byte < self.end.byte
    }

    /// Check if this range contains another range
    pub fn contains_range(&self, other: &Range) -> bool {
        other.start.byte >= self.start.byte && other.end.byte <= self.end.byte
    }

    /// Slice the bytes under this range out of a buffer whose first byte sits
    /// at `base` (the byte offset of the scan's start position).
    ///
    /// Returns `None` when the range does not lie inside the buffer.
    pub fn slice<'a>(&self, input: &'a [u8], base: usize) -> Option<&'a [u8]> {
        let from = self.start.byte.checked_sub(base)?;
        let to = self.end.byte.checked_sub(base)?;
        input.get(from..to)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}
