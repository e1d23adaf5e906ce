//! Token kinds and the located token type produced by the scanner
//!
//! Every token carries its kind, the exact source bytes it covers and the
//! range those bytes occupy. Error conditions are tokens too: `Invalid` for a
//! well-formed rune the language does not use and `BadUtf8` for a single byte
//! that does not decode.
use crate::utils::Range;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of token categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenKind {
    // === BRACKETS ===
    OBrace, // {
    CBrace, // }
    OBrack, // [
    CBrack, // ]
    OParen, // (
    CParen, // )

    // === TEMPLATE DELIMITERS ===
    OQuote,          // " opening a quoted template
    CQuote,          // " closing a quoted template
    TemplateInterp,  // ${
    TemplateControl, // %{
    TemplateSeqEnd,  // } closing an interpolation or control sequence

    // === ARITHMETIC ===
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // === COMPARISON AND ASSIGNMENT ===
    Equal,         // =
    EqualOp,       // ==
    NotEqual,      // !=
    LessThan,      // <
    LessThanEq,    // <=
    GreaterThan,   // >
    GreaterThanEq, // >=

    // === LOGICAL ===
    And,  // &&
    Or,   // ||
    Bang, // !

    // === PUNCTUATION ===
    Dot,      // .
    Comma,    // ,
    Ellipsis, // ...
    FatArrow, // =>
    Question, // ?
    Colon,    // :

    // === BITWISE (reserved, no semantics in the language) ===
    BitwiseAnd, // &
    BitwiseOr,  // |
    BitwiseNot, // ~
    BitwiseXor, // ^

    // === VALUES ===
    /// Decimal number with optional fraction and exponent
    NumberLit,
    /// Identifier, keywords are recognised by the parser
    Ident,
    /// Literal text chunk inside a quoted template
    QuotedLit,

    // === LAYOUT ===
    /// Line terminator (`\n` or `\r\n`)
    Newline,
    /// Maximal run of tab characters
    Tabs,
    /// Line or block comment including its delimiters
    Comment,

    // === ERRORS AND SENTINEL ===
    /// A decodable rune that starts no token
    Invalid,
    /// A single byte that is not valid UTF-8
    BadUtf8,
    /// Zero-length end-of-input marker
    Eof,
}

impl TokenKind {
    /// Fixed source text for punctuation kinds, `None` for variable-text kinds
    pub fn fixed_text(&self) -> Option<&'static str> {
        let text = match self {
            Self::OBrace => "{",
            Self::CBrace | Self::TemplateSeqEnd => "}",
            Self::OBrack => "[",
            Self::CBrack => "]",
            Self::OParen => "(",
            Self::CParen => ")",
            Self::OQuote | Self::CQuote => "\"",
            Self::TemplateInterp => "${",
            Self::TemplateControl => "%{",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Equal => "=",
            Self::EqualOp => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanEq => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEq => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Bang => "!",
            Self::Dot => ".",
            Self::Comma => ",",
            Self::Ellipsis => "...",
            Self::FatArrow => "=>",
            Self::Question => "?",
            Self::Colon => ":",
            Self::BitwiseAnd => "&",
            Self::BitwiseOr => "|",
            Self::BitwiseNot => "~",
            Self::BitwiseXor => "^",
            Self::NumberLit
            | Self::Ident
            | Self::QuotedLit
            | Self::Newline
            | Self::Tabs
            | Self::Comment
            | Self::Invalid
            | Self::BadUtf8
            | Self::Eof => return None,
        };
        Some(text)
    }

    /// Check if this kind reports a scanning problem
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Invalid | Self::BadUtf8)
    }

    /// Check if this kind is an arithmetic operator
    pub fn is_arithmetic_operator(&self) -> bool {
        matches!(
            self,
            Self::Plus | Self::Minus | Self::Star | Self::Slash | Self::Percent
        )
    }

    /// Check if this kind is a comparison operator
    pub fn is_comparison_operator(&self) -> bool {
        matches!(
            self,
            Self::EqualOp
                | Self::NotEqual
                | Self::LessThan
                | Self::LessThanEq
                | Self::GreaterThan
                | Self::GreaterThanEq
        )
    }

    /// Check if this kind is a logical operator
    pub fn is_logical_operator(&self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Bang)
    }

    /// Check if this kind is a bitwise operator
    pub fn is_bitwise_operator(&self) -> bool {
        matches!(
            self,
            Self::BitwiseAnd | Self::BitwiseOr | Self::BitwiseNot | Self::BitwiseXor
        )
    }

    /// Check if this kind is any operator
    pub fn is_operator(&self) -> bool {
        self.is_arithmetic_operator()
            || self.is_comparison_operator()
            || self.is_logical_operator()
            || self.is_bitwise_operator()
    }

    /// Check if the parser should skip this kind when looking for syntax
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::Tabs | Self::Comment)
    }

    pub fn is_significant(&self) -> bool {
        !self.is_ignorable()
    }

    /// Get the classification of this kind
    pub fn token_class(&self) -> TokenClass {
        match self {
            Self::OBrace
            | Self::CBrace
            | Self::OBrack
            | Self::CBrack
            | Self::OParen
            | Self::CParen => TokenClass::Bracket,

            Self::OQuote
            | Self::CQuote
            | Self::TemplateInterp
            | Self::TemplateControl
            | Self::TemplateSeqEnd => TokenClass::Template,

            Self::Plus
            | Self::Minus
            | Self::Star
            | Self::Slash
            | Self::Percent
            | Self::Equal
            | Self::EqualOp
            | Self::NotEqual
            | Self::LessThan
            | Self::LessThanEq
            | Self::GreaterThan
            | Self::GreaterThanEq
            | Self::And
            | Self::Or
            | Self::Bang
            | Self::BitwiseAnd
            | Self::BitwiseOr
            | Self::BitwiseNot
            | Self::BitwiseXor => TokenClass::Operation,

            Self::Dot
            | Self::Comma
            | Self::Ellipsis
            | Self::FatArrow
            | Self::Question
            | Self::Colon => TokenClass::Punctuation,

            Self::NumberLit | Self::QuotedLit => TokenClass::Literal,
            Self::Ident => TokenClass::Identifier,
            Self::Newline | Self::Tabs => TokenClass::Whitespace,
            Self::Comment | Self::Eof => TokenClass::Special,
            Self::Invalid | Self::BadUtf8 => TokenClass::Error,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fixed_text() {
            Some(text) => write!(f, "'{}'", text),
            None => write!(f, "{:?}", self),
        }
    }
}

/// Token classification used for metrics and parser dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenClass {
    /// Paired brackets
    Bracket,
    /// Quoted template delimiters and sequences
    Template,
    /// Operator symbols
    Operation,
    /// Separators and other punctuation
    Punctuation,
    /// Number literals and template text
    Literal,
    /// Identifiers
    Identifier,
    /// Newlines and tab runs
    Whitespace,
    /// Comments and end-of-file marker
    Special,
    /// Invalid runes and malformed bytes
    Error,
}

/// A classified token with its source bytes and location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source bytes under `range`, empty for `Eof`
    pub bytes: Vec<u8>,
    pub range: Range,
}

impl Token {
    pub fn new(kind: TokenKind, bytes: impl Into<Vec<u8>>, range: Range) -> Self {
        Self {
            kind,
            bytes: bytes.into(),
            range,
        }
    }

    /// Create the end-of-input sentinel at a position
    pub fn eof(range: Range) -> Self {
        Self {
            kind: TokenKind::Eof,
            bytes: Vec::new(),
            range,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn is_error(&self) -> bool {
        self.kind.is_error()
    }

    pub fn is_significant(&self) -> bool {
        self.kind.is_significant()
    }

    /// Source text of this token, lossily decoded for display
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Source text when the token bytes are valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "<EOF>"),
            TokenKind::BadUtf8 => {
                let hex: Vec<String> = self.bytes.iter().map(|b| format!("\\x{:02x}", b)).collect();
                write!(f, "BadUtf8({})", hex.join(""))
            }
            _ => write!(f, "{:?}({:?})", self.kind, self.text()),
        }
    }
}

// === OPERATOR TABLE ===

/// Longest operator text in bytes (`...`)
pub const MAX_OPERATOR_LEN: usize = 3;

/// Map an operator or punctuation spelling to its kind.
///
/// `"` and `}` are absent because their kind depends on template state.
pub fn classify_operator_symbol(symbol: &[u8]) -> Option<TokenKind> {
    let kind = match symbol {
        b"..." => TokenKind::Ellipsis,
        b"==" => TokenKind::EqualOp,
        b"!=" => TokenKind::NotEqual,
        b"<=" => TokenKind::LessThanEq,
        b">=" => TokenKind::GreaterThanEq,
        b"&&" => TokenKind::And,
        b"||" => TokenKind::Or,
        b"=>" => TokenKind::FatArrow,
        b"${" => TokenKind::TemplateInterp,
        b"%{" => TokenKind::TemplateControl,
        b"{" => TokenKind::OBrace,
        b"[" => TokenKind::OBrack,
        b"]" => TokenKind::CBrack,
        b"(" => TokenKind::OParen,
        b")" => TokenKind::CParen,
        b"+" => TokenKind::Plus,
        b"-" => TokenKind::Minus,
        b"*" => TokenKind::Star,
        b"/" => TokenKind::Slash,
        b"%" => TokenKind::Percent,
        b"=" => TokenKind::Equal,
        b"<" => TokenKind::LessThan,
        b">" => TokenKind::GreaterThan,
        b"!" => TokenKind::Bang,
        b"." => TokenKind::Dot,
        b"," => TokenKind::Comma,
        b"?" => TokenKind::Question,
        b":" => TokenKind::Colon,
        b"&" => TokenKind::BitwiseAnd,
        b"|" => TokenKind::BitwiseOr,
        b"~" => TokenKind::BitwiseNot,
        b"^" => TokenKind::BitwiseXor,
        _ => return None,
    };
    Some(kind)
}

/// Match the longest operator at the front of `input`.
///
/// Returns the kind and its length in bytes.
pub fn match_operator(input: &[u8]) -> Option<(TokenKind, usize)> {
    let longest = input.len().min(MAX_OPERATOR_LEN);
    (1..=longest)
        .rev()
        .find_map(|len| classify_operator_symbol(&input[..len]).map(|kind| (kind, len)))
}

/// Check if a byte can begin an operator or punctuation token
pub fn is_operator_start(byte: u8) -> bool {
    matches!(
        byte,
        b'.' | b'=' | b'!' | b'<' | b'>' | b'&' | b'|' | b'$' | b'%' | b'{' | b'}' | b'['
            | b']' | b'(' | b')' | b'+' | b'-' | b'*' | b'/' | b',' | b'?' | b':' | b'~'
            | b'^'
    )
}
