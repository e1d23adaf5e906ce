//! Logging configuration: compile-time limits plus runtime preferences
//!
//! Buffer sizes come from the build profile and cannot change at runtime.
//! Output format and verbosity are user preferences, installed once per
//! process and falling back to environment defaults.

use crate::config::compile_time::logging::*;
use crate::config::runtime::{ConfigError, LoggingPreferences};
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

// ============================================================================
// RUNTIME PREFERENCES STORAGE
// ============================================================================

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install runtime preferences for the process
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), ConfigError> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| ConfigError::AlreadyInitialized("Logging preferences"))
}

/// Get runtime preferences (with fallback to defaults)
fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

// ============================================================================
// CONFIGURATION ACCESS FUNCTIONS
// ============================================================================

pub fn get_min_log_level() -> LogLevel {
    get_runtime_preferences().min_log_level
}

pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

pub fn include_source_context() -> bool {
    get_runtime_preferences().include_source_context
}

/// Capacity of in-memory event buffers
pub fn get_log_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

/// Events retained per scanned source
pub fn get_max_log_events_per_source() -> usize {
    MAX_LOG_EVENTS_PER_SOURCE
}

/// Events retained by the diagnostic collector across all sources
pub fn get_max_error_collection() -> usize {
    MAX_ERROR_COLLECTION
}

pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

// ============================================================================
// CONFIGURATION VALIDATION
// ============================================================================

/// Validate compile-time limits
pub fn validate_config() -> Result<(), ConfigError> {
    if LOG_BUFFER_SIZE < 100 || LOG_BUFFER_SIZE > 100_000 {
        return Err(ConfigError::InvalidValue {
            field: "logging.log_buffer_size",
            reason: format!("{} is outside 100..=100000", LOG_BUFFER_SIZE),
        });
    }

    if MAX_LOG_EVENTS_PER_SOURCE > LOG_BUFFER_SIZE {
        return Err(ConfigError::InvalidValue {
            field: "logging.max_log_events_per_source",
            reason: "exceeds log_buffer_size".to_string(),
        });
    }

    Ok(())
}

/// Get configuration summary for diagnostics
pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();

    format!(
        "Logging Configuration:\n\
         === Limits (Compile-time, {}) ===\n\
         - Log buffer size: {}\n\
         - Max events per source: {}\n\
         - Max collected events: {}\n\
         - Max message length: {}\n\
         === Preferences (Runtime) ===\n\
         - Min log level: {:?}\n\
         - Structured logging: {}\n\
         - Console logging: {}\n\
         - Include source context: {}",
        crate::config::build_info::profile(),
        LOG_BUFFER_SIZE,
        MAX_LOG_EVENTS_PER_SOURCE,
        MAX_ERROR_COLLECTION,
        MAX_LOG_MESSAGE_LENGTH,
        preferences.min_log_level,
        preferences.use_structured_logging,
        preferences.enable_console_logging,
        preferences.include_source_context,
    )
}

/// Get recommended configuration for development
pub fn get_development_preferences() -> LoggingPreferences {
    LoggingPreferences {
        use_structured_logging: false,
        enable_console_logging: true,
        min_log_level: LogLevel::Debug,
        include_source_context: true,
    }
}

/// Get recommended configuration for production
pub fn get_production_preferences() -> LoggingPreferences {
    LoggingPreferences {
        use_structured_logging: true,
        enable_console_logging: true,
        min_log_level: LogLevel::Info,
        include_source_context: true,
    }
}
