//! Error, warning and success codes for the zcl scanner
//!
//! Single source of truth for every code the crate logs, together with the
//! behavioural metadata attached to it.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(Severity::Critical),
            "High" => Some(Severity::High),
            "Medium" => Some(Severity::Medium),
            "Low" => Some(Severity::Low),
            _ => None,
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Configuration error codes
pub mod config {
    use super::Code;

    pub const CONFIG_IO_ERROR: Code = Code::new("E001");
    pub const CONFIG_PARSE_ERROR: Code = Code::new("E002");
    pub const CONFIG_INVALID_VALUE: Code = Code::new("E003");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const MALFORMED_UTF8: Code = Code::new("E021");
    pub const UNTERMINATED_TEMPLATE: Code = Code::new("E022");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E023");
    pub const COVERAGE_VIOLATION: Code = Code::new("E024");
    pub const ERROR_REPORT_TRUNCATED: Code = Code::new("W020");
}

/// Token stream error codes
pub mod stream {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E050");
    pub const UNEXPECTED_END_OF_STREAM: Code = Code::new("E051");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const CONFIG_LOADED: Code = Code::new("I002");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const COVERAGE_VALIDATION_PASSED: Code = Code::new("I021");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // System errors
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal scanner error",
                "File a bug report with the input that triggered it",
            ),
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "Logging or configuration initialization failed",
                "Check environment variables and configuration files",
            ),
            // Configuration errors
            ErrorMetadata::new(
                "E001",
                "Configuration",
                Severity::Medium,
                false,
                true,
                "Configuration file could not be read",
                "Verify the configuration path exists and is readable",
            ),
            ErrorMetadata::new(
                "E002",
                "Configuration",
                Severity::Medium,
                false,
                true,
                "Configuration file is not valid TOML for the expected schema",
                "Fix the syntax or field names in the configuration file",
            ),
            ErrorMetadata::new(
                "E003",
                "Configuration",
                Severity::Low,
                true,
                false,
                "Configuration value is out of range",
                "Adjust the value to fall inside the documented limits",
            ),
            // Lexical errors
            ErrorMetadata::new(
                "E020",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "Character is not valid at this position",
                "Remove the character or place it inside a quoted template",
            ),
            ErrorMetadata::new(
                "E021",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "Byte sequence is not valid UTF-8",
                "Re-encode the source file as UTF-8",
            ),
            ErrorMetadata::new(
                "E022",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "Quoted template is not closed before end of line",
                "Add the closing double quote",
            ),
            ErrorMetadata::new(
                "E023",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Block comment is not closed before end of input",
                "Add the closing */",
            ),
            ErrorMetadata::new(
                "E024",
                "Lexical",
                Severity::Critical,
                false,
                true,
                "Token list does not cover the source exactly",
                "File a bug report with the input that triggered it",
            ),
            ErrorMetadata::new(
                "W020",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Too many error tokens, remaining ones were not reported",
                "Fix the reported errors and scan again",
            ),
            // Token stream errors
            ErrorMetadata::new(
                "E050",
                "TokenStream",
                Severity::Medium,
                true,
                false,
                "Token does not match what the parser expected",
                "Check the syntax near the reported location",
            ),
            ErrorMetadata::new(
                "E051",
                "TokenStream",
                Severity::Medium,
                true,
                false,
                "Input ended while the parser expected more tokens",
                "Complete the unfinished construct",
            ),
        ];

        entries.into_iter().map(|meta| (meta.code, meta)).collect()
    })
}

// ============================================================================
// LOOKUP FUNCTIONS
// ============================================================================

/// Get complete metadata for a code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let meta = get_error_metadata(lexical::MALFORMED_UTF8.as_str()).unwrap();
        assert_eq!(meta.category, "Lexical");
        assert!(meta.recoverable);
        assert!(!meta.requires_halt);
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_severity("X999"), Severity::Medium);
        assert!(is_recoverable("X999"));
        assert!(!requires_halt("X999"));
        assert_eq!(get_category("X999"), "Unknown");
        assert_eq!(get_description("X999"), "Unknown error");
    }

    #[test]
    fn test_coverage_violation_halts() {
        assert!(requires_halt(lexical::COVERAGE_VIOLATION.as_str()));
        assert_eq!(
            get_severity(lexical::COVERAGE_VIOLATION.as_str()),
            Severity::Critical
        );
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("High"), Some(Severity::High));
        assert_eq!(Severity::parse("high"), None);
        assert_eq!(Severity::Low.as_str(), "Low");
    }
}
