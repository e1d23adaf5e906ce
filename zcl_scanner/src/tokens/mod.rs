//! Token model for zcl lexical analysis
//!
//! A [`Token`] pairs a [`TokenKind`] with the exact source bytes it covers and
//! a [`Range`](crate::utils::Range) into the original buffer. Kinds fall into
//! a handful of [`TokenClass`]es used for metrics and parser dispatch:
//!
//! - `Bracket` - `{ } [ ] ( )`
//! - `Template` - quote delimiters, `${`, `%{` and the closing `}`
//! - `Operation` - assignment plus arithmetic, comparison, logical and bitwise operators
//! - `Punctuation` - `.`, `,`, `...`, `=>`, `?` and `:`
//! - `Literal` - numbers and literal template text
//! - `Identifier` - names
//! - `Whitespace` - newlines and tab runs (single spaces produce no token)
//! - `Special` - comments and the end-of-input marker
//! - `Error` - invalid runes and malformed UTF-8 bytes
//!
//! [`TokenStream`] gives the parser a cursor that skips comments and tabs.

pub mod token;
pub mod token_stream;

pub use token::{
    classify_operator_symbol, match_operator, Token, TokenClass, TokenKind, MAX_OPERATOR_LEN,
};
pub use token_stream::{TokenStream, TokenStreamError};
