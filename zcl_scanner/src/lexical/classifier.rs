//! Token classification driven by the first rune of each span
//!
//! The classifier looks at the next rune, picks a `Category`, and hands off
//! to the matching handler, which consumes a maximal span and emits one or
//! more tokens. Quoted templates switch between literal scanning and normal
//! scanning through a small mode stack so interpolations can nest.

use super::decoder::Decoded;
use super::emitter::TokenEmitter;
use super::tracker::SourceCursor;
use super::unicode::{is_ident_continue, is_ident_start};
use crate::tokens::token::{is_operator_start, match_operator};
use crate::tokens::{Token, TokenKind};
use crate::utils::Position;

/// Scanning mode, innermost last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Expression scanning; `braces` counts unmatched `{` opened in this mode
    Normal { braces: usize },
    /// Literal text between the quotes of a template
    Template,
}

/// First-rune category in normal mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Space,
    Tabs,
    Newline,
    Digit,
    IdentStart,
    Quote,
    CloseBrace,
    LineComment,
    BlockComment,
    Operator,
    Other,
    Malformed,
}

fn categorize(cursor: &SourceCursor<'_>) -> Option<Category> {
    let next = cursor.peek_byte(1);
    let category = match cursor.peek()? {
        Decoded::Malformed(_) => Category::Malformed,
        Decoded::Char(c, _) => match c {
            ' ' => Category::Space,
            '\t' => Category::Tabs,
            '\n' => Category::Newline,
            '\r' if next == Some(b'\n') => Category::Newline,
            '0'..='9' => Category::Digit,
            '"' => Category::Quote,
            '}' => Category::CloseBrace,
            '#' => Category::LineComment,
            '/' if next == Some(b'/') => Category::LineComment,
            '/' if next == Some(b'*') => Category::BlockComment,
            c if is_ident_start(c) => Category::IdentStart,
            c if c.is_ascii()
                && is_operator_start(c as u8)
                && match_operator(cursor.rest()).is_some() =>
            {
                Category::Operator
            }
            _ => Category::Other,
        },
    };
    Some(category)
}

fn is_digit(_: &SourceCursor<'_>, c: char) -> bool {
    c.is_ascii_digit()
}

pub(crate) struct Classifier<'a> {
    cursor: SourceCursor<'a>,
    emitter: TokenEmitter<'a>,
    modes: Vec<Mode>,
}

impl<'a> Classifier<'a> {
    pub fn new(src: &'a [u8], start: Position) -> Self {
        Self {
            cursor: SourceCursor::new(src, start),
            emitter: TokenEmitter::new(src, start),
            modes: vec![Mode::Normal { braces: 0 }],
        }
    }

    /// Scan the whole buffer and return the finished token list
    pub fn run(mut self) -> Vec<Token> {
        while !self.cursor.is_at_end() {
            match self.modes.last().copied() {
                Some(Mode::Template) => self.scan_template(),
                _ => self.scan_normal(),
            }
        }
        let end = self.cursor.position();
        self.emitter.finish(end)
    }

    fn emit(&mut self, kind: TokenKind, start: Position) {
        let end = self.cursor.position();
        self.emitter.emit(kind, start, end);
    }

    /// Emit `kind` for `[start, cursor)` if that span is non-empty
    fn flush(&mut self, kind: TokenKind, start: Position) {
        if self.cursor.position().byte > start.byte {
            self.emit(kind, start);
        }
    }

    /// Close the current chunk, emit the malformed byte on its own and start
    /// a new chunk right after it
    fn isolate_bad_byte(&mut self, kind: TokenKind, chunk_start: &mut Position) {
        self.flush(kind, *chunk_start);
        let start = self.cursor.position();
        self.cursor.bump();
        self.emit(TokenKind::BadUtf8, start);
        *chunk_start = self.cursor.position();
    }

    fn at_line_end(&self) -> bool {
        match self.cursor.peek_byte(0) {
            Some(b'\n') => true,
            Some(b'\r') => self.cursor.peek_byte(1) == Some(b'\n'),
            _ => false,
        }
    }

    fn set_top(&mut self, mode: Mode) {
        if let Some(top) = self.modes.last_mut() {
            *top = mode;
        }
    }

    // ========================================================================
    // NORMAL MODE
    // ========================================================================

    fn scan_normal(&mut self) {
        let start = self.cursor.position();
        let Some(category) = categorize(&self.cursor) else {
            return;
        };

        match category {
            Category::Space => {
                self.cursor.bump();
            }
            Category::Tabs => {
                self.cursor.bump_while(|_, c| c == '\t');
                self.emit(TokenKind::Tabs, start);
            }
            Category::Newline => self.scan_newline(start),
            Category::Digit => self.scan_number(start),
            Category::IdentStart => self.scan_ident(start),
            Category::Quote => {
                self.cursor.bump();
                self.emit(TokenKind::OQuote, start);
                self.modes.push(Mode::Template);
            }
            Category::CloseBrace => self.scan_close_brace(start),
            Category::LineComment => self.scan_line_comment(start),
            Category::BlockComment => self.scan_block_comment(start),
            Category::Operator => self.scan_operator(start),
            Category::Other => {
                self.cursor.bump();
                self.emit(TokenKind::Invalid, start);
            }
            Category::Malformed => {
                self.cursor.bump();
                self.emit(TokenKind::BadUtf8, start);
            }
        }
    }

    fn scan_newline(&mut self, start: Position) {
        if self.cursor.peek_byte(0) == Some(b'\r') {
            self.cursor.bump();
        }
        self.cursor.bump();
        self.emit(TokenKind::Newline, start);
    }

    /// `digits ('.' digits)? ([eE] [+-]? digits)?`
    fn scan_number(&mut self, start: Position) {
        self.cursor.bump_while(is_digit);

        let digit_at = |cursor: &SourceCursor<'_>, n: usize| {
            cursor.peek_byte(n).is_some_and(|b| b.is_ascii_digit())
        };

        if self.cursor.peek_byte(0) == Some(b'.') && digit_at(&self.cursor, 1) {
            self.cursor.bump();
            self.cursor.bump_while(is_digit);
        }

        if matches!(self.cursor.peek_byte(0), Some(b'e' | b'E')) {
            let sign = matches!(self.cursor.peek_byte(1), Some(b'+' | b'-'));
            let digits_from = if sign { 2 } else { 1 };
            if digit_at(&self.cursor, digits_from) {
                self.cursor.bump_n(digits_from);
                self.cursor.bump_while(is_digit);
            }
        }

        self.emit(TokenKind::NumberLit, start);
    }

    fn scan_ident(&mut self, start: Position) {
        self.cursor.bump();
        self.cursor
            .bump_while(|cursor, c| is_ident_continue(c) || cursor.extends_previous(c));
        self.emit(TokenKind::Ident, start);
    }

    fn scan_operator(&mut self, start: Position) {
        let Some((kind, len)) = match_operator(self.cursor.rest()) else {
            self.cursor.bump();
            self.emit(TokenKind::Invalid, start);
            return;
        };

        self.cursor.bump_n(len);
        self.emit(kind, start);

        match kind {
            TokenKind::OBrace => {
                if let Some(Mode::Normal { braces }) = self.modes.last().copied() {
                    self.set_top(Mode::Normal { braces: braces + 1 });
                }
            }
            TokenKind::TemplateInterp | TokenKind::TemplateControl => {
                self.modes.push(Mode::Normal { braces: 0 });
            }
            _ => {}
        }
    }

    /// `}` closes a block brace, or an interpolation when none are open
    fn scan_close_brace(&mut self, start: Position) {
        self.cursor.bump();

        let kind = match self.modes.last().copied() {
            Some(Mode::Normal { braces }) if braces > 0 => {
                self.set_top(Mode::Normal { braces: braces - 1 });
                TokenKind::CBrace
            }
            Some(Mode::Normal { .. }) if self.modes.len() > 1 => {
                self.modes.pop();
                TokenKind::TemplateSeqEnd
            }
            _ => TokenKind::CBrace,
        };

        self.emit(kind, start);
    }

    /// `#` or `//` up to, not including, the line terminator
    fn scan_line_comment(&mut self, start: Position) {
        let mut chunk_start = start;
        while !self.cursor.is_at_end() && !self.at_line_end() {
            match self.cursor.peek() {
                Some(Decoded::Malformed(_)) => {
                    self.isolate_bad_byte(TokenKind::Comment, &mut chunk_start)
                }
                _ => {
                    self.cursor.bump();
                }
            }
        }
        self.flush(TokenKind::Comment, chunk_start);
    }

    /// `/*` through the matching `*/`, or to end of input
    fn scan_block_comment(&mut self, start: Position) {
        let mut chunk_start = start;
        self.cursor.bump_n(2);

        loop {
            match self.cursor.peek() {
                None => break,
                Some(Decoded::Char('*', _)) if self.cursor.peek_byte(1) == Some(b'/') => {
                    self.cursor.bump_n(2);
                    break;
                }
                Some(Decoded::Malformed(_)) => {
                    self.isolate_bad_byte(TokenKind::Comment, &mut chunk_start)
                }
                Some(Decoded::Char(..)) => {
                    self.cursor.bump();
                }
            }
        }

        self.flush(TokenKind::Comment, chunk_start);
    }

    // ========================================================================
    // TEMPLATE MODE
    // ========================================================================

    fn scan_template(&mut self) {
        let start = self.cursor.position();

        if self.at_line_end() {
            // Unterminated: the newline is scanned in the enclosing mode
            self.modes.pop();
            return;
        }

        match self.cursor.peek() {
            None => {}
            Some(Decoded::Char('"', _)) => {
                self.cursor.bump();
                self.emit(TokenKind::CQuote, start);
                self.modes.pop();
            }
            Some(Decoded::Char(c @ ('$' | '%'), _)) if self.cursor.peek_byte(1) == Some(b'{') => {
                self.cursor.bump_n(2);
                let kind = if c == '$' {
                    TokenKind::TemplateInterp
                } else {
                    TokenKind::TemplateControl
                };
                self.emit(kind, start);
                self.modes.push(Mode::Normal { braces: 0 });
            }
            Some(Decoded::Malformed(_)) => {
                self.cursor.bump();
                self.emit(TokenKind::BadUtf8, start);
            }
            Some(Decoded::Char(..)) => self.scan_quoted_literal(start),
        }
    }

    /// Literal template text up to a quote, sequence start, line end or bad byte
    fn scan_quoted_literal(&mut self, start: Position) {
        loop {
            if self.at_line_end() {
                break;
            }
            match self.cursor.peek() {
                None | Some(Decoded::Malformed(_)) | Some(Decoded::Char('"', _)) => break,
                Some(Decoded::Char(c @ ('$' | '%'), _)) => {
                    let marker = c as u8;
                    if self.cursor.peek_byte(1) == Some(marker)
                        && self.cursor.peek_byte(2) == Some(b'{')
                    {
                        // `$${` and `%%{` stand for literal `${` and `%{`
                        self.cursor.bump_n(3);
                    } else if self.cursor.peek_byte(1) == Some(b'{') {
                        break;
                    } else {
                        self.cursor.bump();
                    }
                }
                Some(Decoded::Char('\\', _)) => {
                    self.cursor.bump();
                    if !self.at_line_end() {
                        if let Some(Decoded::Char(..)) = self.cursor.peek() {
                            self.cursor.bump();
                        }
                    }
                }
                Some(Decoded::Char(..)) => {
                    self.cursor.bump();
                }
            }
        }

        self.flush(TokenKind::QuotedLit, start);
    }
}
