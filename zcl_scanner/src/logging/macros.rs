//! Logging macros taking a `Code` and `"key" => value` context pairs
//!
//! Context values may be any `Display` type. All macros are silent until the
//! global logger is initialised.

// ============================================================================
// ERROR LOGGING
// ============================================================================

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::log_error_with_context($code, $message, None, &[])
    };

    ($code:expr, $message:expr, range = $range:expr) => {
        $crate::logging::log_error_with_context($code, $message, Some($range), &[])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        {
            let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::log_error_with_context($code, $message, None, &context)
        }
    };

    ($code:expr, $message:expr, range = $range:expr, $($key:expr => $value:expr),+) => {
        {
            let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::log_error_with_context($code, $message, Some($range), &context)
        }
    };
}

// ============================================================================
// WARNING LOGGING
// ============================================================================

#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        $crate::logging::log_warning_with_context(None, $message, None, &[])
    };

    (code = $code:expr, $message:expr) => {
        $crate::logging::log_warning_with_context(Some($code), $message, None, &[])
    };

    (code = $code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        {
            let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::log_warning_with_context(Some($code), $message, None, &context)
        }
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        {
            let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::log_warning_with_context(None, $message, None, &context)
        }
    };
}

// ============================================================================
// SUCCESS AND INFO LOGGING
// ============================================================================

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::log_success_with_context($code, $message, &[])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        {
            let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::log_success_with_context($code, $message, &context)
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::log_info_with_context($message, &[])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        {
            let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::log_info_with_context($message, &context)
        }
    };
}

// ============================================================================
// DEBUG LOGGING
// ============================================================================

/// Context values are only formatted when debug output is enabled
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        if $crate::logging::debug_enabled() {
            $crate::logging::log_debug_with_context($message, &[])
        }
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::debug_enabled() {
            let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::log_debug_with_context($message, &context)
        }
    };
}
