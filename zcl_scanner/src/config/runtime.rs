// RUNTIME PREFERENCES (User Experience)

use super::compile_time::lexical::MAX_REPORTED_ERROR_TOKENS;
use crate::logging::codes::{self, Code};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub use crate::logging::events::LogLevel;

/// Errors raised while loading or validating runtime configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("{0} already initialized")]
    AlreadyInitialized(&'static str),
}

impl ConfigError {
    /// Logging code for this error
    pub fn error_code(&self) -> Code {
        match self {
            Self::Io { .. } => codes::config::CONFIG_IO_ERROR,
            Self::Parse(_) => codes::config::CONFIG_PARSE_ERROR,
            Self::InvalidValue { .. } => codes::config::CONFIG_INVALID_VALUE,
            Self::AlreadyInitialized(_) => codes::system::INITIALIZATION_FAILURE,
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerPreferences {
    /// Whether to count tokens per class and kind
    pub collect_detailed_metrics: bool,

    /// Whether to keep a histogram of operator usage
    pub track_operator_patterns: bool,

    /// Whether each Invalid and BadUtf8 token is logged as an error event
    pub log_error_tokens: bool,

    /// Upper bound on logged error tokens per scan, capped by the build profile
    pub max_reported_errors: usize,

    /// Whether to re-check token coverage after every scan
    pub validate_coverage: bool,
}

impl Default for ScannerPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env_flag(env_vars::SCANNER_DETAILED_METRICS, true),
            track_operator_patterns: env_flag(env_vars::SCANNER_TRACK_OPERATORS, false),
            log_error_tokens: env_flag(env_vars::SCANNER_LOG_ERROR_TOKENS, true),
            max_reported_errors: env::var(env_vars::SCANNER_MAX_REPORTED_ERRORS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(MAX_REPORTED_ERROR_TOKENS),
            validate_coverage: env_flag(
                env_vars::SCANNER_VALIDATE_COVERAGE,
                cfg!(debug_assertions),
            ),
        }
    }
}

impl ScannerPreferences {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_reported_errors > MAX_REPORTED_ERROR_TOKENS {
            return Err(ConfigError::InvalidValue {
                field: "scanner.max_reported_errors",
                reason: format!(
                    "{} exceeds build limit {}",
                    self.max_reported_errors, MAX_REPORTED_ERROR_TOKENS
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level an event needs to be emitted
    pub min_log_level: LogLevel,

    /// Whether events carry the label of the source being scanned
    pub include_source_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_flag(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            include_source_context: env_flag(env_vars::LOGGING_INCLUDE_SOURCE_CONTEXT, true),
        }
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level {
        "0" => Some(LogLevel::Error),
        "1" => Some(LogLevel::Warning),
        "2" => Some(LogLevel::Info),
        "3" => Some(LogLevel::Debug),
        other => LogLevel::parse(other),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub scanner: ScannerPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse a configuration document; missing fields fall back to env defaults
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `ZCL_CONFIG_FILE` when set, otherwise use defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(env_vars::CONFIG_FILE) {
            Ok(path) => Self::load_from_file(path),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scanner.validate()
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    pub const CONFIG_FILE: &str = "ZCL_CONFIG_FILE";

    // Scanner
    pub const SCANNER_DETAILED_METRICS: &str = "ZCL_SCANNER_DETAILED_METRICS";
    pub const SCANNER_TRACK_OPERATORS: &str = "ZCL_SCANNER_TRACK_OPERATORS";
    pub const SCANNER_LOG_ERROR_TOKENS: &str = "ZCL_SCANNER_LOG_ERROR_TOKENS";
    pub const SCANNER_MAX_REPORTED_ERRORS: &str = "ZCL_SCANNER_MAX_REPORTED_ERRORS";
    pub const SCANNER_VALIDATE_COVERAGE: &str = "ZCL_SCANNER_VALIDATE_COVERAGE";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "ZCL_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "ZCL_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "ZCL_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_SOURCE_CONTEXT: &str = "ZCL_LOGGING_INCLUDE_SOURCE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("1"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [scanner]
            track_operator_patterns = true
            max_reported_errors = 5

            [logging]
            min_log_level = "warn"
            "#,
        )
        .unwrap();

        assert!(config.scanner.track_operator_patterns);
        assert_eq!(config.scanner.max_reported_errors, 5);
        assert_eq!(config.logging.min_log_level, LogLevel::Warning);
        assert_eq!(
            config.scanner.collect_detailed_metrics,
            ScannerPreferences::default().collect_detailed_metrics
        );
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = RuntimeConfig::from_toml_str("").unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = RuntimeConfig::from_toml_str("[scanner\nbroken").unwrap_err();
        assert_matches!(err, ConfigError::Parse(_));
        assert_eq!(err.error_code(), codes::config::CONFIG_PARSE_ERROR);
    }

    #[test]
    fn test_unknown_level_is_parse_error() {
        let err = RuntimeConfig::from_toml_str("[logging]\nmin_log_level = \"loud\"").unwrap_err();
        assert_matches!(err, ConfigError::Parse(_));
    }

    #[test]
    fn test_error_cap_above_build_limit_rejected() {
        let input = format!(
            "[scanner]\nmax_reported_errors = {}",
            MAX_REPORTED_ERROR_TOKENS + 1
        );
        let err = RuntimeConfig::from_toml_str(&input).unwrap_err();
        assert_matches!(
            err,
            ConfigError::InvalidValue {
                field: "scanner.max_reported_errors",
                ..
            }
        );
        assert_eq!(err.error_code(), codes::config::CONFIG_INVALID_VALUE);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nuse_structured_logging = true").unwrap();

        let config = RuntimeConfig::load_from_file(file.path()).unwrap();
        assert!(config.logging.use_structured_logging);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        let err = RuntimeConfig::load_from_file(&missing).unwrap_err();
        assert_matches!(err, ConfigError::Io { ref path, .. } if path == &missing);
        assert_eq!(err.error_code(), codes::config::CONFIG_IO_ERROR);
    }

    #[test]
    fn test_config_serializes_back_to_toml() {
        let config = RuntimeConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(RuntimeConfig::from_toml_str(&text).unwrap(), config);
    }
}
