//! Token accumulation and the coverage post-condition
//!
//! The emitter copies source bytes into each token and appends the single
//! end-of-input sentinel. `validate_coverage` checks that a finished token
//! list accounts for every byte of its source.

use crate::config::compile_time::lexical::TOKEN_CAPACITY_DIVISOR;
use crate::logging::codes::{self, Code};
use crate::tokens::{Token, TokenKind};
use crate::utils::{Position, Range};

/// Accumulates tokens for one scan
#[derive(Debug)]
pub struct TokenEmitter<'a> {
    src: &'a [u8],
    base: usize,
    tokens: Vec<Token>,
}

impl<'a> TokenEmitter<'a> {
    pub fn new(src: &'a [u8], start: Position) -> Self {
        Self {
            src,
            base: start.byte,
            tokens: Vec::with_capacity(src.len() / TOKEN_CAPACITY_DIVISOR + 1),
        }
    }

    /// Append a token covering `[start, end)`
    pub fn emit(&mut self, kind: TokenKind, start: Position, end: Position) {
        debug_assert!(start.byte < end.byte, "non-EOF tokens must not be empty");
        let range = Range::new(start, end);
        let bytes = range.slice(self.src, self.base).unwrap_or_default();
        self.tokens.push(Token::new(kind, bytes, range));
    }

    /// Append the EOF sentinel and hand back the token list
    pub fn finish(mut self, end: Position) -> Vec<Token> {
        self.tokens.push(Token::eof(Range::empty(end)));
        self.tokens
    }
}

/// A token list that does not exactly cover its source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoverageError {
    #[error("token list is empty, expected at least the EOF token")]
    Empty,

    #[error("token {index} starts at byte {start} before the previous token ends at {prev_end}")]
    Overlap {
        index: usize,
        prev_end: usize,
        start: usize,
    },

    #[error("byte {offset} (0x{byte:02x}) is not covered by any token")]
    Uncovered { offset: usize, byte: u8 },

    #[error("token {index} is empty but is not EOF")]
    EmptyToken { index: usize },

    #[error("token {index} bytes do not match the source under {range}")]
    BytesMismatch { index: usize, range: Range },

    #[error("EOF token found at index {index} before the end of the list")]
    EarlyEof { index: usize },

    #[error("last token is {found:?}, expected EOF")]
    MissingEof { found: TokenKind },

    #[error("EOF token at byte {found} with length {len}, expected zero-length at {expected}")]
    MisplacedEof {
        expected: usize,
        found: usize,
        len: usize,
    },
}

impl CoverageError {
    pub fn error_code(&self) -> Code {
        codes::lexical::COVERAGE_VIOLATION
    }
}

/// Check that `tokens` cover `src` exactly when scanned from `start`.
///
/// Tokens must be ordered and non-overlapping, gaps may only hold spaces,
/// each token's bytes must equal the source under its range and the list
/// must end with a single zero-length EOF at the end of input.
pub fn validate_coverage(tokens: &[Token], src: &[u8], start: Position) -> Result<(), CoverageError> {
    let base = start.byte;
    let (last, body) = tokens.split_last().ok_or(CoverageError::Empty)?;

    let mut cursor = base;
    for (index, token) in body.iter().enumerate() {
        if token.kind == TokenKind::Eof {
            return Err(CoverageError::EarlyEof { index });
        }
        check_gap(src, base, cursor, token.range.start.byte)?;
        if token.range.start.byte < cursor {
            return Err(CoverageError::Overlap {
                index,
                prev_end: cursor,
                start: token.range.start.byte,
            });
        }
        if token.range.is_empty() {
            return Err(CoverageError::EmptyToken { index });
        }
        match token.range.slice(src, base) {
            Some(slice) if slice == token.bytes.as_slice() => {}
            _ => {
                return Err(CoverageError::BytesMismatch {
                    index,
                    range: token.range,
                })
            }
        }
        cursor = token.range.end.byte;
    }

    if last.kind != TokenKind::Eof {
        return Err(CoverageError::MissingEof { found: last.kind });
    }

    let end = base + src.len();
    check_gap(src, base, cursor, end)?;
    if last.range.start.byte != end || !last.range.is_empty() || !last.bytes.is_empty() {
        return Err(CoverageError::MisplacedEof {
            expected: end,
            found: last.range.start.byte,
            len: last.range.len().max(last.bytes.len()),
        });
    }

    Ok(())
}

/// Bytes in `[from, to)` (absolute) must all be spaces
fn check_gap(src: &[u8], base: usize, from: usize, to: usize) -> Result<(), CoverageError> {
    for offset in from..to {
        match src.get(offset - base) {
            Some(b' ') => {}
            Some(&byte) => return Err(CoverageError::Uncovered { offset, byte }),
            None => break,
        }
    }
    Ok(())
}
