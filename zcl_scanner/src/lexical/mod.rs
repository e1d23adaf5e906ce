//! Lexical scanning for zcl source buffers
//!
//! `scan_tokens` turns a byte buffer into an ordered token list that covers
//! every byte of the input except skipped spaces, ending with one `Eof`.
//! The scan is pure: no logging, no global state, no failure path. Invalid
//! input shows up as `Invalid` and `BadUtf8` tokens.
//!
//! `LexicalAnalyzer` wraps the scan for pipeline use with metrics and
//! logging.

pub mod analyzer;
pub mod classifier;
pub mod decoder;
pub mod emitter;
pub mod tracker;
pub mod unicode;

use crate::tokens::Token;
use crate::utils::Position;

pub use analyzer::{LexicalAnalyzer, LexicalMetrics};
pub use decoder::{decode_at, Decoded, Decoder};
pub use emitter::{validate_coverage, CoverageError};

/// Scan `src` into tokens.
///
/// Positions are absolute: the first byte of `src` is at `start`, so a
/// fragment cut from a larger file can be scanned with its real location.
/// `source_label` names the buffer in diagnostics.
pub fn scan_tokens(src: &[u8], source_label: &str, start: Position) -> Vec<Token> {
    let tokens = classifier::Classifier::new(src, start).run();

    debug_assert!(
        validate_coverage(&tokens, src, start).is_ok(),
        "token list for {source_label} does not cover its source"
    );

    tokens
}

/// Scan a string from the start of a file
pub fn scan_str(src: &str, source_label: &str) -> Vec<Token> {
    scan_tokens(src.as_bytes(), source_label, Position::start())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind::{self, *};
    use crate::utils::Range;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn scan(src: &[u8]) -> Vec<Token> {
        scan_tokens(src, "test.zcl", Position::start())
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    fn range(b0: usize, l0: u32, c0: u32, b1: usize, l1: u32, c1: u32) -> Range {
        Range::new(Position::new(b0, l0, c0), Position::new(b1, l1, c1))
    }

    fn eof_at(byte: usize, line: u32, column: u32) -> Token {
        Token::eof(Range::empty(Position::new(byte, line, column)))
    }

    // ========================================================================
    // REFERENCE CASES
    // ========================================================================

    #[test]
    fn test_empty_input() {
        assert_eq!(scan(b""), vec![eof_at(0, 1, 1)]);
    }

    #[test]
    fn test_single_space_is_skipped() {
        assert_eq!(scan(b" "), vec![eof_at(1, 1, 2)]);
    }

    #[test]
    fn test_number_literals() {
        for src in ["1", "12", "12.3", "1e2", "1e+2", "1E-2", "0.5e10"] {
            let tokens = scan(src.as_bytes());
            assert_eq!(kinds(&tokens), vec![NumberLit, Eof], "input {src:?}");
            assert_eq!(tokens[0].bytes, src.as_bytes());
            assert_eq!(
                tokens[0].range,
                range(0, 1, 1, src.len(), 1, src.len() as u32 + 1)
            );
        }
    }

    #[test]
    fn test_identifier() {
        let tokens = scan(b"hello");
        assert_eq!(
            tokens,
            vec![
                Token::new(Ident, "hello", range(0, 1, 1, 5, 1, 6)),
                eof_at(5, 1, 6),
            ]
        );
    }

    #[test]
    fn test_combining_mark_shares_a_column() {
        let tokens = scan("he\u{301}llo".as_bytes());
        assert_eq!(
            tokens,
            vec![
                Token::new(Ident, "he\u{301}llo", range(0, 1, 1, 7, 1, 6)),
                eof_at(7, 1, 6),
            ]
        );
    }

    #[test]
    fn test_flag_sequence_takes_a_column_per_indicator() {
        let tokens = scan("🇺🇸🇫🇷🇯🇵".as_bytes());
        assert_eq!(tokens.len(), 7);
        for (i, token) in tokens[..6].iter().enumerate() {
            let column = i as u32 + 1;
            assert_eq!(token.kind, Invalid);
            assert_eq!(token.range, range(4 * i, 1, column, 4 * i + 4, 1, column + 1));
        }
        assert_eq!(tokens[6], eof_at(24, 1, 7));
    }

    #[test]
    fn test_joiner_sequence_in_template_columns() {
        let tokens = scan("\"\u{1f468}\u{200d}\u{1f469}\"".as_bytes());
        assert_eq!(
            tokens,
            vec![
                Token::new(OQuote, "\"", range(0, 1, 1, 1, 1, 2)),
                Token::new(QuotedLit, "\u{1f468}\u{200d}\u{1f469}", range(1, 1, 2, 12, 1, 5)),
                Token::new(CQuote, "\"", range(12, 1, 5, 13, 1, 6)),
                eof_at(13, 1, 6),
            ]
        );
    }

    #[test]
    fn test_arithmetic_expression() {
        let tokens = scan(b" (1 + 2) * 3 ");
        assert_eq!(
            tokens,
            vec![
                Token::new(OParen, "(", range(1, 1, 2, 2, 1, 3)),
                Token::new(NumberLit, "1", range(2, 1, 3, 3, 1, 4)),
                Token::new(Plus, "+", range(4, 1, 5, 5, 1, 6)),
                Token::new(NumberLit, "2", range(6, 1, 7, 7, 1, 8)),
                Token::new(CParen, ")", range(7, 1, 8, 8, 1, 9)),
                Token::new(Star, "*", range(9, 1, 10, 10, 1, 11)),
                Token::new(NumberLit, "3", range(11, 1, 12, 12, 1, 13)),
                eof_at(13, 1, 14),
            ]
        );
    }

    #[test]
    fn test_wide_symbol_is_one_invalid_token() {
        let tokens = scan("🌻".as_bytes());
        assert_eq!(
            tokens,
            vec![
                Token::new(Invalid, "🌻", range(0, 1, 1, 4, 1, 2)),
                eof_at(4, 1, 2),
            ]
        );
    }

    #[test]
    fn test_bitwise_or() {
        let tokens = scan(b"|");
        assert_eq!(
            tokens,
            vec![
                Token::new(BitwiseOr, "|", range(0, 1, 1, 1, 1, 2)),
                eof_at(1, 1, 2),
            ]
        );
    }

    #[test]
    fn test_single_bad_byte() {
        let tokens = scan(b"\x80");
        assert_eq!(
            tokens,
            vec![
                Token::new(BadUtf8, &b"\x80"[..], range(0, 1, 1, 1, 1, 2)),
                eof_at(1, 1, 2),
            ]
        );
    }

    #[test]
    fn test_consecutive_bad_bytes_are_separate_tokens() {
        let tokens = scan(b" \x80\x80");
        assert_eq!(
            tokens,
            vec![
                Token::new(BadUtf8, &b"\x80"[..], range(1, 1, 2, 2, 1, 3)),
                Token::new(BadUtf8, &b"\x80"[..], range(2, 1, 3, 3, 1, 4)),
                eof_at(3, 1, 4),
            ]
        );
    }

    #[test]
    fn test_tab_run_is_one_token() {
        let tokens = scan(b"\t\t");
        assert_eq!(
            tokens,
            vec![
                Token::new(Tabs, "\t\t", range(0, 1, 1, 2, 1, 3)),
                eof_at(2, 1, 3),
            ]
        );
    }

    // ========================================================================
    // EDGE CASES
    // ========================================================================

    #[test]
    fn test_dot_after_digits_without_fraction() {
        assert_eq!(kinds(&scan(b"1.")), vec![NumberLit, Dot, Eof]);
        assert_eq!(kinds(&scan(b"1e")), vec![NumberLit, Ident, Eof]);
        assert_eq!(kinds(&scan(b"1e+")), vec![NumberLit, Ident, Plus, Eof]);
    }

    #[test]
    fn test_attribute_access_after_index() {
        assert_eq!(
            kinds(&scan(b"a[0].b")),
            vec![Ident, OBrack, NumberLit, CBrack, Dot, Ident, Eof]
        );
    }

    #[test]
    fn test_ellipsis_and_lookahead_limit() {
        assert_eq!(kinds(&scan(b"....")), vec![Ellipsis, Dot, Eof]);
        assert_eq!(kinds(&scan(b"..")), vec![Dot, Dot, Eof]);
    }

    #[test]
    fn test_multiline_positions() {
        let tokens = scan(b"a = 1\nbb = 2\n");
        let bb = &tokens[4];
        assert_eq!(bb.kind, Ident);
        assert_eq!(bb.range, range(6, 2, 1, 8, 2, 3));
        assert_matches!(tokens.last(), Some(t) if t.range.start == Position::new(13, 3, 1));
    }

    #[test]
    fn test_crlf_newline() {
        let tokens = scan(b"a\r\nb");
        assert_eq!(kinds(&tokens), vec![Ident, Newline, Ident, Eof]);
        assert_eq!(tokens[1].range, range(1, 1, 2, 3, 2, 1));
        assert_eq!(tokens[2].range.start, Position::new(3, 2, 1));
    }

    #[test]
    fn test_bad_byte_resyncs_on_next_byte() {
        let tokens = scan(b"\xffabc");
        assert_eq!(kinds(&tokens), vec![BadUtf8, Ident, Eof]);
        assert_eq!(tokens[1].range, range(1, 1, 2, 4, 1, 5));
    }

    #[test]
    fn test_start_position_offsets_ranges() {
        let start = Position::new(100, 5, 9);
        let tokens = scan_tokens(b"ab\ncd", "fragment.zcl", start);
        assert_eq!(tokens[0].range, range(100, 5, 9, 102, 5, 11));
        assert_eq!(tokens[2].range, range(103, 6, 1, 105, 6, 3));
        assert_eq!(tokens[3], eof_at(105, 6, 3));
    }

    #[test]
    fn test_scan_str_matches_scan_tokens() {
        let src = "x = \"${y}\" # c";
        assert_eq!(scan_str(src, "a.zcl"), scan(src.as_bytes()));
    }

    #[test]
    fn test_realistic_block() {
        let src = "resource \"aws_instance\" \"web\" {\n  ami = var.ami # pinned\n  count = 2\n}\n";
        let tokens = scan(src.as_bytes());
        assert!(tokens.iter().all(|t| !t.is_error()));
        assert_eq!(
            kinds(&tokens)[..6],
            [Ident, OQuote, QuotedLit, CQuote, OQuote, QuotedLit]
        );
        assert_eq!(tokens.iter().filter(|t| t.kind == Comment).count(), 1);
        assert!(validate_coverage(&tokens, src.as_bytes(), Position::start()).is_ok());
    }

    // ========================================================================
    // PROPERTIES
    // ========================================================================

    fn zcl_like() -> impl Strategy<Value = Vec<u8>> {
        let pieces = prop::sample::select(vec![
            "a", "_b1", "é", "e\u{301}", "🌻", "1", "2.5", "3e4", " ", "\t", "\n", "\r\n",
            "\r", "+", "==", "...", "=>", "{", "}", "${", "%{", "\"", "\\", "$${", "#", "//",
            "/*", "*/", "|", "$",
        ]);
        let raw = prop_oneof![
            pieces.prop_map(|s| s.as_bytes().to_vec()),
            any::<u8>().prop_map(|b| vec![b]),
        ];
        prop::collection::vec(raw, 0..48).prop_map(|chunks| chunks.concat())
    }

    /// Token boundaries in scan order never move backwards in line/column
    fn check_positions_ordered(tokens: &[Token]) -> Result<(), TestCaseError> {
        let positions: Vec<Position> = tokens
            .iter()
            .flat_map(|t| [t.range.start, t.range.end])
            .collect();
        for pair in positions.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!(a.byte <= b.byte, "{:?} then {:?}", a, b);
            prop_assert!((a.line, a.column) <= (b.line, b.column), "{:?} then {:?}", a, b);
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn test_positions_ordered_for_any_bytes(src in prop::collection::vec(any::<u8>(), 0..256)) {
            check_positions_ordered(&scan(&src))?;
        }

        #[test]
        fn test_positions_ordered_for_zcl_like_input(src in zcl_like()) {
            check_positions_ordered(&scan(&src))?;
        }

        #[test]
        fn test_positions_ordered_for_any_chars(chars in prop::collection::vec(any::<char>(), 0..64)) {
            let src: String = chars.into_iter().collect();
            check_positions_ordered(&scan(src.as_bytes()))?;
        }

        #[test]
        fn test_any_bytes_are_covered(src in prop::collection::vec(any::<u8>(), 0..256)) {
            let tokens = scan(&src);
            prop_assert_eq!(validate_coverage(&tokens, &src, Position::start()), Ok(()));
        }

        #[test]
        fn test_zcl_like_input_is_covered(src in zcl_like()) {
            let tokens = scan(&src);
            prop_assert_eq!(validate_coverage(&tokens, &src, Position::start()), Ok(()));
        }

        #[test]
        fn test_scan_is_deterministic(src in zcl_like()) {
            prop_assert_eq!(scan(&src), scan(&src));
        }

        #[test]
        fn test_token_length_matches_range(src in prop::collection::vec(any::<u8>(), 0..256)) {
            for token in scan(&src) {
                prop_assert_eq!(token.range.len(), token.bytes.len());
                prop_assert!(token.range.end.line >= token.range.start.line);
            }
        }

        #[test]
        fn test_bad_bytes_are_isolated(src in prop::collection::vec(any::<u8>(), 0..256)) {
            let tokens = scan(&src);
            let malformed = Decoder::new(&src)
                .filter(|(_, d)| matches!(d, Decoded::Malformed(_)))
                .count();
            let bad: Vec<_> = tokens.iter().filter(|t| t.kind == BadUtf8).collect();
            prop_assert_eq!(bad.len(), malformed);
            for token in bad {
                prop_assert_eq!(token.bytes.len(), 1);
                prop_assert!(matches!(
                    decode_at(&src, token.range.start.byte),
                    Some(Decoded::Malformed(_))
                ));
            }
        }

        #[test]
        fn test_valid_text_has_no_bad_bytes(src in any::<String>()) {
            let tokens = scan_str(&src, "text.zcl");
            prop_assert!(tokens.iter().all(|t| t.kind != BadUtf8));
        }

        #[test]
        fn test_start_offset_shifts_positions(
            src in zcl_like(),
            byte in 0usize..10_000,
            line in 1u32..500,
            column in 1u32..80,
        ) {
            let base = scan(&src);
            let shifted = scan_tokens(&src, "shifted.zcl", Position::new(byte, line, column));
            prop_assert_eq!(base.len(), shifted.len());

            let shift = |p: Position| Position::new(
                p.byte + byte,
                p.line + line - 1,
                if p.line == 1 { p.column + column - 1 } else { p.column },
            );
            for (a, b) in base.iter().zip(&shifted) {
                prop_assert_eq!(a.kind, b.kind);
                prop_assert_eq!(&a.bytes, &b.bytes);
                prop_assert_eq!(shift(a.range.start), b.range.start);
                prop_assert_eq!(shift(a.range.end), b.range.end);
            }
        }
    }
}
