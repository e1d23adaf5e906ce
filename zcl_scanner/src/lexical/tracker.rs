//! Position tracking over a decoded byte buffer
//!
//! The cursor owns the only mutable scan state below the classifier: the
//! current offset, the line/column pair and the previous code point on the
//! current line (needed to decide whether a rune takes a column).

use super::decoder::{decode_at, Decoded};
use super::unicode::extends_cluster;
use crate::utils::Position;

#[derive(Debug, Clone)]
pub struct SourceCursor<'a> {
    src: &'a [u8],
    /// Local offset into `src`
    offset: usize,
    /// Absolute position, offset by the caller-supplied start
    pos: Position,
    /// Previous code point on this line; `None` at line start or after a bad byte
    prev: Option<char>,
}

impl<'a> SourceCursor<'a> {
    pub fn new(src: &'a [u8], start: Position) -> Self {
        Self {
            src,
            offset: 0,
            pos: start,
            prev: None,
        }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.src.len()
    }

    pub fn peek(&self) -> Option<Decoded> {
        decode_at(self.src, self.offset)
    }

    /// Raw byte `n` bytes ahead of the cursor
    pub fn peek_byte(&self, n: usize) -> Option<u8> {
        self.src.get(self.offset + n).copied()
    }

    /// Remaining unscanned bytes
    pub fn rest(&self) -> &'a [u8] {
        &self.src[self.offset.min(self.src.len())..]
    }

    /// Whether `c` would render in the same column as the previous rune
    pub fn extends_previous(&self, c: char) -> bool {
        self.prev.is_some_and(|prev| extends_cluster(prev, c))
    }

    /// Consume one unit and advance the position
    pub fn bump(&mut self) -> Option<Decoded> {
        let decoded = self.peek()?;
        self.offset += decoded.len();
        self.pos.byte += decoded.len();

        match decoded {
            Decoded::Char('\n', _) => {
                self.pos.line += 1;
                self.pos.column = 1;
                self.prev = None;
            }
            Decoded::Char(c, _) => {
                if !self.extends_previous(c) {
                    self.pos.column += 1;
                }
                self.prev = Some(c);
            }
            Decoded::Malformed(_) => {
                self.pos.column += 1;
                self.prev = None;
            }
        }

        Some(decoded)
    }

    /// Consume `n` units
    pub fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            if self.bump().is_none() {
                break;
            }
        }
    }

    /// Consume units while `pred` accepts the next code point
    pub fn bump_while(&mut self, mut pred: impl FnMut(&Self, char) -> bool) {
        while let Some(Decoded::Char(c, _)) = self.peek() {
            if !pred(self, c) {
                break;
            }
            self.bump();
        }
    }
}
