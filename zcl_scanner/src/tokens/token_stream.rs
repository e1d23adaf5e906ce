//! Parser-facing cursor over a scanned token list
//!
//! Comments and tab runs are kept in the underlying list but skipped by
//! navigation, so ranges always refer to the original source.

use crate::logging::codes::{self, Code};
use crate::tokens::token::{Token, TokenKind};
use crate::utils::Range;

/// Token cursor that navigates significant tokens only
#[derive(Debug, Clone)]
pub struct TokenStream {
    /// All tokens, including comments and tabs
    all_tokens: Vec<Token>,
    /// Indices into all_tokens for significant tokens
    significant_indices: Vec<usize>,
    /// Current position in significant_indices
    position: usize,
}

impl TokenStream {
    /// Create a stream that skips comments and tab runs
    pub fn new(tokens: Vec<Token>) -> Self {
        let significant_indices = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.is_significant())
            .map(|(i, _)| i)
            .collect();

        Self {
            all_tokens: tokens,
            significant_indices,
            position: 0,
        }
    }

    /// Create a stream over every token (no filtering)
    pub fn with_all_tokens(tokens: Vec<Token>) -> Self {
        let significant_indices = (0..tokens.len()).collect();
        Self {
            all_tokens: tokens,
            significant_indices,
            position: 0,
        }
    }

    /// Scan a string and wrap the result
    pub fn from_source(src: &str, source_label: &str) -> Self {
        Self::new(crate::lexical::scan_str(src, source_label))
    }

    // === CORE NAVIGATION ===

    pub fn current(&self) -> Option<&Token> {
        self.peek_ahead(0)
    }

    pub fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|token| token.kind)
    }

    pub fn current_range(&self) -> Option<Range> {
        self.current().map(|token| token.range)
    }

    /// Next significant token without advancing
    pub fn peek(&self) -> Option<&Token> {
        self.peek_ahead(1)
    }

    /// Significant token `n` positions ahead of the current one
    pub fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.significant_indices
            .get(self.position + n)
            .and_then(|&index| self.all_tokens.get(index))
    }

    pub fn advance(&mut self) -> Option<&Token> {
        if self.position < self.significant_indices.len() {
            self.position += 1;
        }
        self.current()
    }

    /// True once the cursor has moved past the last significant token
    pub fn is_at_end(&self) -> bool {
        self.position >= self.significant_indices.len()
    }

    /// Number of significant tokens
    pub fn len(&self) -> usize {
        self.significant_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.significant_indices.is_empty()
    }

    // === RANGES ===

    pub fn range_at_position(&self, position: usize) -> Option<Range> {
        self.significant_indices
            .get(position)
            .and_then(|&index| self.all_tokens.get(index))
            .map(|token| token.range)
    }

    /// Range from the token at `start_position` through the current token
    pub fn range_from(&self, start_position: usize) -> Option<Range> {
        match (self.range_at_position(start_position), self.current_range()) {
            (Some(start), Some(current)) => Some(start.merge(current)),
            (start, current) => current.or(start),
        }
    }

    /// All tokens, including ignored ones, between two significant positions
    pub fn tokens_between(&self, start_pos: usize, end_pos: usize) -> &[Token] {
        match (
            self.significant_indices.get(start_pos),
            self.significant_indices.get(end_pos),
        ) {
            (Some(&start), Some(&end)) if start <= end => &self.all_tokens[start..=end],
            _ => &[],
        }
    }

    // === PARSER INTEGRATION ===

    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    /// Consume the current token if it satisfies `predicate`
    pub fn consume_if<F>(&mut self, predicate: F) -> Option<Token>
    where
        F: FnOnce(&Token) -> bool,
    {
        let token = self.current().filter(|token| predicate(token)).cloned()?;
        self.advance();
        Some(token)
    }

    pub fn advance_if(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of `expected` kind or report what was found instead
    pub fn expect(&mut self, expected: TokenKind) -> Result<Token, TokenStreamError> {
        let Some(current) = self.current() else {
            return Err(TokenStreamError::UnexpectedEndOfStream { expected });
        };

        if current.kind != expected {
            return Err(TokenStreamError::UnexpectedToken {
                expected,
                found: current.kind,
                range: current.range,
            });
        }

        let token = current.clone();
        self.advance();
        Ok(token)
    }

    // === BACKTRACKING ===

    pub fn save_position(&self) -> usize {
        self.position
    }

    pub fn restore_position(&mut self, saved_position: usize) {
        self.position = saved_position.min(self.significant_indices.len());
    }

    // === ITERATION ===

    pub fn iter_significant(&self) -> impl Iterator<Item = &Token> {
        self.significant_indices.iter().map(|&i| &self.all_tokens[i])
    }

    pub fn all_tokens(&self) -> &[Token] {
        &self.all_tokens
    }

    pub fn remaining_tokens(&self) -> impl Iterator<Item = &Token> {
        self.significant_indices[self.position.min(self.significant_indices.len())..]
            .iter()
            .map(|&i| &self.all_tokens[i])
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.all_tokens
    }

    // === DIAGNOSTICS ===

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining_count(&self) -> usize {
        self.significant_indices.len().saturating_sub(self.position)
    }

    pub fn diagnostic(&self) -> String {
        let current_info = match self.current() {
            Some(current) => format!("{} at {}", current, current.range),
            None => "<end>".to_string(),
        };

        format!(
            "TokenStream(pos: {}/{}, current: {})",
            self.position,
            self.significant_indices.len(),
            current_info
        )
    }

    /// Significant tokens within `radius` positions of the cursor
    pub fn context_snippet(&self, radius: usize) -> Vec<&Token> {
        let start = self.position.saturating_sub(radius);
        let end = (self.position + radius + 1).min(self.significant_indices.len());
        (start..end)
            .filter_map(|pos| {
                self.significant_indices
                    .get(pos)
                    .and_then(|&index| self.all_tokens.get(index))
            })
            .collect()
    }

    pub fn has_eof(&self) -> bool {
        self.significant_indices
            .last()
            .and_then(|&index| self.all_tokens.get(index))
            .is_some_and(Token::is_eof)
    }
}

/// Failures from `TokenStream::expect`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenStreamError {
    #[error("expected {expected}, found {found} at {range}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        range: Range,
    },

    #[error("expected {expected}, but reached end of input")]
    UnexpectedEndOfStream { expected: TokenKind },
}

impl TokenStreamError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::stream::UNEXPECTED_TOKEN,
            Self::UnexpectedEndOfStream { .. } => codes::stream::UNEXPECTED_END_OF_STREAM,
        }
    }

    pub fn range(&self) -> Option<Range> {
        match self {
            Self::UnexpectedToken { range, .. } => Some(*range),
            Self::UnexpectedEndOfStream { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn stream(src: &str) -> TokenStream {
        TokenStream::from_source(src, "stream.zcl")
    }

    #[test]
    fn test_comments_and_tabs_are_skipped() {
        let s = stream("a\t= # note\n1");
        let kinds: Vec<_> = s.iter_significant().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Equal,
                TokenKind::Newline,
                TokenKind::NumberLit,
                TokenKind::Eof
            ]
        );
        assert_eq!(s.all_tokens().len(), 7);
        assert!(s.has_eof());
    }

    #[test]
    fn test_with_all_tokens_keeps_everything() {
        let s = TokenStream::with_all_tokens(crate::lexical::scan_str("a\tb", "all.zcl"));
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn test_navigation() {
        let mut s = stream("a + b");
        assert!(s.check(TokenKind::Ident));
        assert_eq!(s.peek().map(|t| t.kind), Some(TokenKind::Plus));
        assert_eq!(s.peek_ahead(2).map(|t| t.text().into_owned()), Some("b".into()));

        s.advance();
        assert_eq!(s.current_kind(), Some(TokenKind::Plus));
        s.advance();
        s.advance();
        assert_eq!(s.current_kind(), Some(TokenKind::Eof));
        s.advance();
        assert!(s.is_at_end());
        assert_eq!(s.current(), None);
        assert_eq!(s.remaining_count(), 0);
    }

    #[test]
    fn test_expect_success_and_mismatch() {
        let mut s = stream("a = 1");
        assert_matches!(s.expect(TokenKind::Ident), Ok(t) if t.bytes == b"a");

        let err = s.expect(TokenKind::Colon).unwrap_err();
        assert_matches!(
            err,
            TokenStreamError::UnexpectedToken {
                expected: TokenKind::Colon,
                found: TokenKind::Equal,
                ..
            }
        );
        assert_eq!(err.error_code(), codes::stream::UNEXPECTED_TOKEN);
        assert_eq!(err.range().map(|r| r.start.byte), Some(2));
        assert_eq!(err.to_string(), "expected ':', found '=' at 1:3-4");
    }

    #[test]
    fn test_expect_past_end() {
        let mut s = stream("");
        assert!(s.expect(TokenKind::Eof).is_ok());
        let err = s.expect(TokenKind::Ident).unwrap_err();
        assert_eq!(
            err,
            TokenStreamError::UnexpectedEndOfStream {
                expected: TokenKind::Ident
            }
        );
        assert_eq!(err.error_code(), codes::stream::UNEXPECTED_END_OF_STREAM);
    }

    #[test]
    fn test_consume_if_and_advance_if() {
        let mut s = stream("x y");
        assert!(s.consume_if(|t| t.kind == TokenKind::NumberLit).is_none());
        assert_matches!(s.consume_if(|t| t.kind == TokenKind::Ident), Some(t) if t.bytes == b"x");
        assert!(!s.advance_if(TokenKind::Comma));
        assert!(s.advance_if(TokenKind::Ident));
        assert!(s.check(TokenKind::Eof));
    }

    #[test]
    fn test_save_and_restore() {
        let mut s = stream("a b c");
        let saved = s.save_position();
        s.advance();
        s.advance();
        assert_eq!(s.current().map(|t| t.text().into_owned()), Some("c".into()));
        s.restore_position(saved);
        assert_eq!(s.current().map(|t| t.text().into_owned()), Some("a".into()));
        s.restore_position(99);
        assert!(s.is_at_end());
    }

    #[test]
    fn test_range_from_and_tokens_between() {
        let mut s = stream("f(a, # c\n b)");
        let start = s.save_position();
        while !s.check(TokenKind::CParen) {
            s.advance();
        }
        let range = s.range_from(start).unwrap();
        assert_eq!(range.start.byte, 0);
        assert_eq!(range.end.byte, 12);

        let between = s.tokens_between(start, s.position());
        assert!(between.iter().any(|t| t.kind == TokenKind::Comment));
    }

    #[test]
    fn test_diagnostic_and_context() {
        let mut s = stream("a b c d");
        s.advance();
        s.advance();
        assert_eq!(s.context_snippet(1).len(), 3);
        assert!(s.diagnostic().starts_with("TokenStream(pos: 2/5"));
        assert_eq!(s.remaining_tokens().count(), 3);
        assert_eq!(s.clone().into_tokens().len(), 5);
    }
}
