//! Lexical scanner for the zcl configuration language
//!
//! ```
//! use zcl_scanner::{scan_str, TokenKind};
//!
//! let tokens = scan_str("count = 2", "main.zcl");
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(kinds, [TokenKind::Ident, TokenKind::Equal, TokenKind::NumberLit, TokenKind::Eof]);
//! ```

// Internal modules
pub mod config;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use config::runtime::{ConfigError, RuntimeConfig, ScannerPreferences};
pub use lexical::{scan_str, scan_tokens, validate_coverage, CoverageError, LexicalAnalyzer};
pub use tokens::{Token, TokenClass, TokenKind, TokenStream, TokenStreamError};
pub use utils::{Position, Range};
