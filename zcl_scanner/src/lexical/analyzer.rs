//! Instrumented lexical analysis for pipeline use
//!
//! Wraps `scan_tokens` with runtime preferences, metrics and logging. The
//! analyzer only observes the token list; it never alters it.

use super::emitter::validate_coverage;
use super::scan_tokens;
use crate::config::compile_time::lexical::MAX_REPORTED_ERROR_TOKENS;
use crate::config::runtime::ScannerPreferences;
use crate::logging::{self, codes};
use crate::tokens::{Token, TokenClass, TokenKind};
use crate::utils::Position;
use crate::{log_debug, log_error, log_success, log_warning};
use std::collections::BTreeMap;

/// Counts gathered over one scan
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub significant_tokens: usize,
    pub bytes_scanned: usize,
    pub line_count: u32,
    pub invalid_tokens: usize,
    pub bad_utf8_tokens: usize,
    /// Error tokens that were logged individually
    pub reported_errors: usize,
    pub unterminated_templates: usize,
    pub unterminated_comments: usize,

    // Runtime preference-controlled metrics
    pub class_counts: BTreeMap<TokenClass, usize>,
    pub operator_usage_patterns: BTreeMap<TokenKind, usize>,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &ScannerPreferences) {
        self.total_tokens += 1;
        if token.is_significant() {
            self.significant_tokens += 1;
        }

        match token.kind {
            TokenKind::Invalid => self.invalid_tokens += 1,
            TokenKind::BadUtf8 => self.bad_utf8_tokens += 1,
            kind if kind.is_operator() && preferences.track_operator_patterns => {
                *self.operator_usage_patterns.entry(kind).or_insert(0) += 1;
            }
            _ => {}
        }

        if preferences.collect_detailed_metrics {
            *self.class_counts.entry(token.kind.token_class()).or_insert(0) += 1;
        }
    }

    pub fn error_tokens(&self) -> usize {
        self.invalid_tokens + self.bad_utf8_tokens
    }

    pub fn has_errors(&self) -> bool {
        self.error_tokens() > 0 || self.unterminated_templates > 0 || self.unterminated_comments > 0
    }

    pub fn class_count(&self, class: TokenClass) -> usize {
        self.class_counts.get(&class).copied().unwrap_or(0)
    }
}

/// Template or interpolation still open while replaying a token list
#[derive(Debug, Clone, Copy)]
enum OpenSequence<'t> {
    Template(&'t Token),
    Interpolation,
}

/// Scanner front door with metrics and logging
#[derive(Debug, Default)]
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: ScannerPreferences,
    next_source_id: usize,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: ScannerPreferences) -> Self {
        Self {
            preferences,
            ..Self::default()
        }
    }

    /// Scan `src` under the logging context of `source_label`
    pub fn analyze(&mut self, src: &[u8], source_label: &str, start: Position) -> Vec<Token> {
        self.metrics = LexicalMetrics {
            bytes_scanned: src.len(),
            ..LexicalMetrics::default()
        };

        let source_id = self.next_source_id;
        self.next_source_id += 1;

        logging::with_source_context(source_label, source_id, || {
            log_debug!("Starting lexical analysis",
                "source" => source_label,
                "bytes" => src.len(),
                "start" => start
            );

            let tokens = scan_tokens(src, source_label, start);

            for token in &tokens {
                self.metrics.record_token(token, &self.preferences);
            }
            self.metrics.line_count = tokens
                .last()
                .map(|eof| eof.range.end.line - start.line + 1)
                .unwrap_or(1);

            self.report_error_tokens(&tokens);
            self.report_unterminated(&tokens);

            if self.preferences.validate_coverage {
                match validate_coverage(&tokens, src, start) {
                    Ok(()) => log_success!(
                        codes::success::COVERAGE_VALIDATION_PASSED,
                        "Token coverage verified",
                        "tokens" => tokens.len()
                    ),
                    Err(err) => log_error!(err.error_code(), &err.to_string(),
                        "source" => source_label
                    ),
                }
            }

            log_success!(
                codes::success::TOKENIZATION_COMPLETE,
                "Lexical analysis completed",
                "tokens" => self.metrics.total_tokens,
                "significant" => self.metrics.significant_tokens,
                "errors" => self.metrics.error_tokens(),
                "lines" => self.metrics.line_count
            );

            tokens
        })
    }

    /// Scan a string from the start of a file
    pub fn analyze_str(&mut self, src: &str, source_label: &str) -> Vec<Token> {
        self.analyze(src.as_bytes(), source_label, Position::start())
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &ScannerPreferences {
        &self.preferences
    }

    pub fn set_preferences(&mut self, preferences: ScannerPreferences) {
        self.preferences = preferences;
    }

    fn report_limit(&self) -> usize {
        if self.preferences.log_error_tokens {
            self.preferences.max_reported_errors.min(MAX_REPORTED_ERROR_TOKENS)
        } else {
            0
        }
    }

    fn report_error_tokens(&mut self, tokens: &[Token]) {
        let limit = self.report_limit();

        for token in tokens.iter().filter(|t| t.is_error()).take(limit) {
            let (code, message) = match token.kind {
                TokenKind::BadUtf8 => (
                    codes::lexical::MALFORMED_UTF8,
                    format!("Malformed UTF-8 byte 0x{:02x}", token.bytes.first().copied().unwrap_or(0)),
                ),
                _ => (
                    codes::lexical::INVALID_CHARACTER,
                    format!("Invalid character {:?}", token.text()),
                ),
            };
            log_error!(code, &message, range = token.range);
            self.metrics.reported_errors += 1;
        }

        let total = self.metrics.error_tokens();
        if self.preferences.log_error_tokens && total > self.metrics.reported_errors {
            log_warning!(code = codes::lexical::ERROR_REPORT_TRUNCATED,
                "Further error tokens were not reported",
                "reported" => self.metrics.reported_errors,
                "total" => total
            );
        }
    }

    /// Quoted templates cut off by a line end and block comments cut off by
    /// end of input
    fn report_unterminated(&mut self, tokens: &[Token]) {
        self.report_open_templates(tokens);
        self.report_open_comments(tokens);
    }

    /// Replays the classifier's template nesting over the token list
    fn report_open_templates(&mut self, tokens: &[Token]) {
        let mut open: Vec<OpenSequence<'_>> = Vec::new();

        for token in tokens {
            match token.kind {
                TokenKind::OQuote => open.push(OpenSequence::Template(token)),
                TokenKind::TemplateInterp | TokenKind::TemplateControl => {
                    open.push(OpenSequence::Interpolation)
                }
                TokenKind::CQuote => {
                    if matches!(open.last(), Some(OpenSequence::Template(_))) {
                        open.pop();
                    }
                }
                TokenKind::TemplateSeqEnd => {
                    if matches!(open.last(), Some(OpenSequence::Interpolation)) {
                        open.pop();
                    }
                }
                TokenKind::Newline => {
                    if let Some(&OpenSequence::Template(opened)) = open.last() {
                        open.pop();
                        self.report_open_template(opened);
                    }
                }
                TokenKind::Eof => {
                    for sequence in open.drain(..).rev() {
                        if let OpenSequence::Template(opened) = sequence {
                            self.report_open_template(opened);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn report_open_template(&mut self, opened: &Token) {
        self.metrics.unterminated_templates += 1;
        log_error!(codes::lexical::UNTERMINATED_TEMPLATE,
            "Quoted template is not closed before the end of the line",
            range = opened.range
        );
    }

    /// Bad bytes split a comment into chunks; any other token ends it
    fn report_open_comments(&mut self, tokens: &[Token]) {
        let mut open_block: Option<&Token> = None;

        for token in tokens {
            match token.kind {
                TokenKind::Comment => {
                    if token.bytes.starts_with(b"/*") && open_block.is_none() {
                        open_block = Some(token);
                    }
                    let closes = token.bytes.ends_with(b"*/")
                        && !(token.bytes.starts_with(b"/*") && token.bytes.len() < 4);
                    if closes {
                        open_block = None;
                    }
                }
                TokenKind::BadUtf8 => {}
                _ => {
                    if let Some(opened) = open_block.take() {
                        self.report_open_comment(opened);
                    }
                }
            }
        }
    }

    fn report_open_comment(&mut self, opened: &Token) {
        self.metrics.unterminated_comments += 1;
        log_error!(codes::lexical::UNTERMINATED_COMMENT,
            "Block comment is not closed before the end of input",
            range = opened.range
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preferences() -> ScannerPreferences {
        ScannerPreferences {
            collect_detailed_metrics: true,
            track_operator_patterns: true,
            log_error_tokens: true,
            max_reported_errors: 2,
            validate_coverage: true,
        }
    }

    #[test]
    fn test_analyzer_returns_scanner_output() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences());
        let src = "a = [1, 2] # list\n";
        assert_eq!(analyzer.analyze_str(src, "a.zcl"), crate::lexical::scan_str(src, "a.zcl"));
    }

    #[test]
    fn test_metrics_counts() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences());
        analyzer.analyze_str("a = b + c + 1\n\tx", "m.zcl");
        let metrics = analyzer.metrics();

        assert_eq!(metrics.total_tokens, 11);
        assert_eq!(metrics.significant_tokens, 10);
        assert_eq!(metrics.class_count(TokenClass::Identifier), 4);
        assert_eq!(metrics.class_count(TokenClass::Whitespace), 2);
        assert_eq!(metrics.operator_usage_patterns.get(&TokenKind::Plus), Some(&2));
        assert_eq!(metrics.bytes_scanned, 16);
        assert_eq!(metrics.line_count, 2);
        assert!(!metrics.has_errors());
    }

    #[test]
    fn test_error_reporting_is_capped() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences());
        analyzer.analyze(b"\x80 @ \xff ` ok", "e.zcl", Position::start());
        let metrics = analyzer.metrics();

        assert_eq!(metrics.bad_utf8_tokens, 2);
        assert_eq!(metrics.invalid_tokens, 2);
        assert_eq!(metrics.reported_errors, 2);
    }

    #[test]
    fn test_error_reporting_can_be_disabled() {
        let mut analyzer = LexicalAnalyzer::with_preferences(ScannerPreferences {
            log_error_tokens: false,
            ..preferences()
        });
        analyzer.analyze_str("@", "e.zcl");
        assert_eq!(analyzer.metrics().invalid_tokens, 1);
        assert_eq!(analyzer.metrics().reported_errors, 0);
    }

    #[test]
    fn test_operator_tracking_off() {
        let mut analyzer = LexicalAnalyzer::with_preferences(ScannerPreferences {
            track_operator_patterns: false,
            collect_detailed_metrics: false,
            ..preferences()
        });
        analyzer.analyze_str("a + b", "o.zcl");
        assert!(analyzer.metrics().operator_usage_patterns.is_empty());
        assert!(analyzer.metrics().class_counts.is_empty());
        assert_eq!(analyzer.metrics().total_tokens, 4);
    }

    #[test]
    fn test_unterminated_template_detected() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences());
        analyzer.analyze_str("a = \"abc\nb = \"", "t.zcl");
        assert_eq!(analyzer.metrics().unterminated_templates, 2);

        analyzer.analyze_str("a = \"abc\"\n", "t.zcl");
        assert_eq!(analyzer.metrics().unterminated_templates, 0);
    }

    #[test]
    fn test_unterminated_template_after_interpolation() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences());
        analyzer.analyze_str("a = \"x ${b}\nc = 1", "t.zcl");
        assert_eq!(analyzer.metrics().unterminated_templates, 1);

        analyzer.analyze_str("a = \"${\"x\"}\"\n", "t.zcl");
        assert_eq!(analyzer.metrics().unterminated_templates, 0);
    }

    #[test]
    fn test_unterminated_template_after_bad_byte() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences());
        analyzer.analyze(b"a = \"\x80\n", "t.zcl", Position::start());
        assert_eq!(analyzer.metrics().unterminated_templates, 1);
        assert_eq!(analyzer.metrics().bad_utf8_tokens, 1);
    }

    #[test]
    fn test_unterminated_template_inside_interpolation() {
        // The line end belongs to the interpolation; the template stays open to EOF
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences());
        analyzer.analyze_str("a = \"${b\n", "t.zcl");
        assert_eq!(analyzer.metrics().unterminated_templates, 1);
    }

    #[test]
    fn test_unterminated_comment_detected() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences());
        analyzer.analyze_str("a /* open", "c.zcl");
        assert_eq!(analyzer.metrics().unterminated_comments, 1);

        analyzer.analyze(b"/* a \x80 b */ x /*/", "c.zcl", Position::start());
        assert_eq!(analyzer.metrics().unterminated_comments, 1);

        analyzer.analyze_str("/* done */ # line", "c.zcl");
        assert!(!analyzer.metrics().has_errors());
    }

    #[test]
    fn test_metrics_reset_between_scans() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences());
        analyzer.analyze_str("@@@", "one.zcl");
        analyzer.analyze_str("ok", "two.zcl");
        assert_eq!(analyzer.metrics().invalid_tokens, 0);
        assert_eq!(analyzer.metrics().total_tokens, 2);
    }

    #[test]
    fn test_error_tokens_reach_global_collector() {
        use crate::logging::{LogLevel, LoggingService, MemoryLogger};
        use std::sync::Arc;

        // Only this test installs the global logger; ignore a repeat install
        let memory = Arc::new(MemoryLogger::new());
        let installed = logging::init_global_logging_with_service(Arc::new(LoggingService::new(
            memory.clone(),
            LogLevel::Debug,
        )));

        let mut analyzer = LexicalAnalyzer::with_preferences(preferences());
        analyzer.analyze(b"ok \x80 \"x\n", "collector_check.zcl", Position::start());

        let errors = logging::get_source_errors("collector_check.zcl");
        assert!(errors.iter().any(|e| {
            e.code == codes::lexical::MALFORMED_UTF8 && e.range.map(|r| r.start.byte) == Some(3)
        }));
        assert!(errors.iter().any(|e| {
            e.code == codes::lexical::UNTERMINATED_TEMPLATE
                && e.range.map(|r| r.start.byte) == Some(5)
        }));

        if installed.is_ok() {
            assert!(memory.has_error_with_code(codes::lexical::UNTERMINATED_TEMPLATE));
        }
    }

    #[test]
    fn test_line_count_with_start_offset() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences());
        analyzer.analyze(b"a\nb\nc", "f.zcl", Position::new(40, 10, 3));
        assert_eq!(analyzer.metrics().line_count, 3);
    }
}
