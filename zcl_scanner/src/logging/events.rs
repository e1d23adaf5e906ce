//! Event system for scanner logging

use super::codes::{self, Code};
use crate::utils::Range;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    #[serde(alias = "warn")]
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Parse a level name as used in `ZCL_LOG_LEVEL`
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warning),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

/// Core log event structure
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub range: Option<Range>,
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn with_level(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: truncate_message(message, super::config::get_max_log_message_length()),
            range: None,
            context: BTreeMap::new(),
        }
    }

    /// Create a new error event
    pub fn error(error_code: Code, message: &str) -> Self {
        Self::with_level(LogLevel::Error, error_code, message)
    }

    /// Create a new warning event with the generic warning code
    pub fn warning(message: &str) -> Self {
        Self::with_level(LogLevel::Warning, Code::new("W000"), message)
    }

    /// Create warning with specific code
    pub fn warning_with_code(warning_code: Code, message: &str) -> Self {
        Self::with_level(LogLevel::Warning, warning_code, message)
    }

    /// Create a new info event with the generic info code
    pub fn info(message: &str) -> Self {
        Self::with_level(LogLevel::Info, Code::new("I000"), message)
    }

    /// Create a success event (info with success code)
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::with_level(LogLevel::Info, success_code, message)
    }

    /// Create a debug event
    pub fn debug(message: &str) -> Self {
        Self::with_level(LogLevel::Debug, Code::new("D000"), message)
    }

    /// Attach a source range
    pub fn with_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    /// Add context data
    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    /// Add source label context
    pub fn with_source(self, label: &str) -> Self {
        self.with_context("source", label)
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    pub fn is_debug(&self) -> bool {
        self.level == LogLevel::Debug
    }

    /// Source label recorded on this event, if any
    pub fn source(&self) -> Option<&str> {
        self.context.get("source").map(String::as_str)
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn description(&self) -> &'static str {
        codes::get_description(self.code.as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.code.as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.code.as_str())
    }

    /// Format for display
    pub fn format(&self) -> String {
        let range_str = self
            .range
            .as_ref()
            .map(|r| format!(" at {}", r.start))
            .unwrap_or_default();

        format!(
            "[{}] {} - {}{}",
            self.level.as_str(),
            self.code.as_str(),
            self.message,
            range_str
        )
    }

    /// Format with detailed error information
    pub fn format_detailed(&self) -> String {
        let mut output = self.format();

        output.push_str(&format!("\n  Category: {}", self.category()));
        output.push_str(&format!("\n  Severity: {}", self.severity()));

        if self.is_error() {
            output.push_str(&format!("\n  Recoverable: {}", self.is_recoverable()));
            output.push_str(&format!("\n  Requires halt: {}", self.requires_halt()));
        }

        let description = self.description();
        if description != "Unknown error" {
            output.push_str(&format!("\n  Description: {}", description));
        }

        let action = self.recommended_action();
        if action != "No specific action available" {
            output.push_str(&format!("\n  Recommended action: {}", action));
        }

        if !self.context.is_empty() {
            output.push_str("\n  Context:");
            for (key, value) in &self.context {
                output.push_str(&format!("\n    {}: {}", key, value));
            }
        }

        output
    }

    /// Format as JSON for structured logging
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": self.message,
            "category": self.category(),
            "severity": self.severity(),
        });

        if self.is_error() {
            json["error_metadata"] = serde_json::json!({
                "recoverable": self.is_recoverable(),
                "requires_halt": self.requires_halt(),
                "description": self.description(),
                "recommended_action": self.recommended_action(),
            });
        }

        if let Some(range) = &self.range {
            json["range"] = serde_json::to_value(range)?;
        }

        if !self.context.is_empty() {
            json["context"] = serde_json::to_value(&self.context)?;
        }

        serde_json::to_string(&json)
    }
}

/// Cut a message to at most `max` bytes on a char boundary
fn truncate_message(message: &str, max: usize) -> String {
    if message.len() <= max {
        return message.to_string();
    }
    let mut end = max;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &message[..end])
}
