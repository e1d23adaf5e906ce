//! Logging service and logger backends

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::sync::{Arc, Mutex, MutexGuard};

/// Simple logger trait
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Main logging service with level filtering
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Create service from the installed logging preferences
    pub fn with_config() -> Self {
        let min_level = config::get_min_log_level();
        Self::new(Arc::new(create_configured_multi_logger(min_level)), min_level)
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Check if level should be logged
    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    pub fn log_error(&self, error_code: Code, message: &str) {
        self.log_event(LogEvent::error(error_code, message));
    }

    pub fn log_success(&self, success_code: Code, message: &str) {
        self.log_event(LogEvent::success(success_code, message));
    }

    pub fn log_info(&self, message: &str) {
        self.log_event(LogEvent::info(message));
    }

    pub fn log_warning(&self, message: &str) {
        self.log_event(LogEvent::warning(message));
    }

    pub fn log_debug(&self, message: &str) {
        self.log_event(LogEvent::debug(message));
    }
}

/// Human-readable console logger
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            match event.level {
                LogLevel::Error => eprintln!("{}", event.format()),
                _ => println!("{}", event.format()),
            }
        }
    }
}

/// JSON-lines logger for tooling
pub struct StructuredLogger {
    min_level: LogLevel,
}

impl StructuredLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            let line = event.format_json().unwrap_or_else(|_| event.format());
            match event.level {
                LogLevel::Error => eprintln!("{}", line),
                _ => println!("{}", line),
            }
        }
    }
}

/// Bounded in-memory logger, mainly for tests
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
    capacity: usize,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::with_capacity(config::get_log_buffer_size())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn event_count(&self) -> usize {
        self.lock().len()
    }

    pub fn get_errors(&self) -> Vec<LogEvent> {
        self.lock().iter().filter(|e| e.is_error()).cloned().collect()
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_error() && e.code == code)
    }

    pub fn has_success_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_info() && e.code == code)
    }

    pub fn get_summary(&self) -> EventSummary {
        let events = self.lock();
        EventSummary {
            total_count: events.len(),
            error_count: events.iter().filter(|e| e.is_error()).count(),
            warning_count: events.iter().filter(|e| e.is_warning()).count(),
            info_count: events.iter().filter(|e| e.is_info()).count(),
            debug_count: events.iter().filter(|e| e.is_debug()).count(),
            critical_count: events
                .iter()
                .filter(|e| e.is_error() && e.requires_halt())
                .count(),
        }
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.lock();

        // Drop oldest events to stay within capacity
        if events.len() >= self.capacity {
            let remove_count = events.len() - self.capacity + 1;
            events.drain(0..remove_count);
        }

        events.push(event.clone());
    }
}

/// Summary of events in memory logger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSummary {
    pub total_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub debug_count: usize,
    pub critical_count: usize,
}

impl EventSummary {
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }

    pub fn has_critical_errors(&self) -> bool {
        self.critical_count > 0
    }
}

/// Fan-out logger writing to several backends
pub struct MultiLogger {
    loggers: Vec<Arc<dyn Logger>>,
    min_level: LogLevel,
}

impl MultiLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            loggers: Vec::new(),
            min_level,
        }
    }

    pub fn add_logger(&mut self, logger: Arc<dyn Logger>) {
        self.loggers.push(logger);
    }

    pub fn with_console(mut self, console_level: LogLevel) -> Self {
        self.add_logger(Arc::new(ConsoleLogger::new(console_level)));
        self
    }

    pub fn with_structured_console(mut self, console_level: LogLevel) -> Self {
        self.add_logger(Arc::new(StructuredLogger::new(console_level)));
        self
    }

    pub fn with_memory(mut self) -> (Self, Arc<MemoryLogger>) {
        let memory_logger = Arc::new(MemoryLogger::new());
        self.add_logger(memory_logger.clone());
        (self, memory_logger)
    }

    pub fn logger_count(&self) -> usize {
        self.loggers.len()
    }
}

impl Logger for MultiLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            for logger in &self.loggers {
                logger.log(event);
            }
        }
    }
}

// ============================================================================
// CONFIGURATION-AWARE FACTORY FUNCTIONS
// ============================================================================

/// Build the logger stack described by the installed preferences
pub fn create_configured_multi_logger(min_level: LogLevel) -> MultiLogger {
    let multi_logger = MultiLogger::new(min_level);

    if !config::use_console_logging() {
        return multi_logger;
    }

    if config::use_structured_logging() {
        multi_logger.with_structured_console(min_level)
    } else {
        multi_logger.with_console(min_level)
    }
}

/// Memory-backed logger capturing every level
pub fn create_test_logger() -> Arc<MemoryLogger> {
    Arc::new(MemoryLogger::new())
}
