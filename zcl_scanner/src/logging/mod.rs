//! Global logging module for the zcl scanner
//!
//! Provides a process-wide logging service, per-source diagnostic collection
//! and a thread-local source context picked up by the logging macros. Every
//! entry point is a no-op until `init_global_logging` has been called, so
//! library users who never initialise logging pay nothing.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{CollectionSummary, DiagnosticCollector, SourceContext};
pub use events::{LogEvent, LogLevel};
pub use service::{
    ConsoleLogger, Logger, LoggingService, MemoryLogger, MultiLogger, StructuredLogger,
};

use crate::config::runtime::ConfigError;
use crate::utils::Range;

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_COLLECTOR: OnceLock<Arc<DiagnosticCollector>> = OnceLock::new();

thread_local! {
    static SOURCE_CONTEXT: RefCell<Option<SourceContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize the global logging system from installed preferences
pub fn init_global_logging() -> Result<(), ConfigError> {
    config::validate_config()?;
    let service = Arc::new(LoggingService::with_config());
    init_global_logging_with_service(service.clone())?;

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));
    Ok(())
}

/// Initialize with a custom service (primarily for testing)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), ConfigError> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| ConfigError::AlreadyInitialized("Global logger"))?;

    // A collector may already exist if a previous init failed after this point
    let _ = GLOBAL_COLLECTOR.set(Arc::new(DiagnosticCollector::new()));
    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

// ============================================================================
// GLOBAL ACCESS
// ============================================================================

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_collector() -> Option<&'static DiagnosticCollector> {
    GLOBAL_COLLECTOR.get().map(|collector| collector.as_ref())
}

// ============================================================================
// SOURCE CONTEXT MANAGEMENT
// ============================================================================

/// Set the source context for the current thread
pub fn set_source_context(label: &str, source_id: usize) {
    if let Some(collector) = try_get_global_collector() {
        collector.record_source(label);
    }

    SOURCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(SourceContext::new(label, source_id));
    });
}

pub fn clear_source_context() {
    SOURCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with a source context, restoring any previous context afterwards
pub fn with_source_context<F, R>(label: &str, source_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_source_context();
    set_source_context(label, source_id);
    let result = f();
    SOURCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = previous;
    });
    result
}

pub fn get_current_source_context() -> Option<SourceContext> {
    SOURCE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

fn attach_source(event: LogEvent) -> (LogEvent, Option<String>) {
    match get_current_source_context() {
        Some(ctx) if config::include_source_context() => {
            let label = ctx.label.clone();
            (event.with_source(&ctx.label), Some(label))
        }
        Some(ctx) => (event, Some(ctx.label)),
        None => (event, None),
    }
}

/// Emit an event to the global logger and, for problems, the collector
pub fn dispatch_event(event: LogEvent) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };

    let (event, label) = attach_source(event);

    if event.is_error() || event.is_warning() {
        if let (Some(label), Some(collector)) = (label, try_get_global_collector()) {
            collector.record_event(&label, event.clone());
        }
    }

    logger.log_event(event);
}

fn with_pairs(mut event: LogEvent, context: &[(&str, String)]) -> LogEvent {
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    event
}

/// Used by `log_error!`
pub fn log_error_with_context(
    code: Code,
    message: &str,
    range: Option<Range>,
    context: &[(&str, String)],
) {
    let mut event = with_pairs(LogEvent::error(code, message), context);
    if let Some(range) = range {
        event = event.with_range(range);
    }
    dispatch_event(event);
}

/// Used by `log_warning!`
pub fn log_warning_with_context(
    code: Option<Code>,
    message: &str,
    range: Option<Range>,
    context: &[(&str, String)],
) {
    let event = match code {
        Some(code) => LogEvent::warning_with_code(code, message),
        None => LogEvent::warning(message),
    };
    let mut event = with_pairs(event, context);
    if let Some(range) = range {
        event = event.with_range(range);
    }
    dispatch_event(event);
}

/// Used by `log_success!`
pub fn log_success_with_context(code: Code, message: &str, context: &[(&str, String)]) {
    dispatch_event(with_pairs(LogEvent::success(code, message), context));
}

/// Used by `log_info!`
pub fn log_info_with_context(message: &str, context: &[(&str, String)]) {
    dispatch_event(with_pairs(LogEvent::info(message), context));
}

/// Used by `log_debug!`
pub fn log_debug_with_context(message: &str, context: &[(&str, String)]) {
    dispatch_event(with_pairs(LogEvent::debug(message), context));
}

/// Whether debug events would reach a logger
pub fn debug_enabled() -> bool {
    try_get_global_logger().is_some_and(|logger| logger.should_log(LogLevel::Debug))
}

// ============================================================================
// SUMMARIES
// ============================================================================

pub fn get_collection_summary() -> CollectionSummary {
    try_get_global_collector()
        .map(|collector| collector.get_summary())
        .unwrap_or_default()
}

pub fn get_source_errors(label: &str) -> Vec<LogEvent> {
    try_get_global_collector()
        .map(|collector| collector.get_source_errors(label))
        .unwrap_or_default()
}

pub fn clear_collection() {
    if let Some(collector) = try_get_global_collector() {
        collector.clear();
    }
}

pub fn get_system_diagnostics() -> String {
    let mut diagnostics = String::from("=== Logging System Diagnostics ===\n");
    diagnostics.push_str(&format!("Initialized: {}\n", is_initialized()));

    if let Some(collector) = try_get_global_collector() {
        let (current, max, fraction) = collector.get_capacity_info();
        diagnostics.push_str(&format!(
            "Capacity: {}/{} ({:.1}%)\n",
            current,
            max,
            fraction * 100.0
        ));

        let summary = collector.get_summary();
        diagnostics.push_str(&format!("Sources: {}\n", summary.total_sources));
        diagnostics.push_str(&format!("Total errors: {}\n", summary.total_errors));
        diagnostics.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    diagnostics.push('\n');
    diagnostics.push_str(&config::get_config_summary());
    diagnostics
}

/// Error logging that falls back to stderr when uninitialised
pub fn safe_log_error(code: Code, message: &str) {
    match try_get_global_logger() {
        Some(logger) => logger.log_event(LogEvent::error(code, message)),
        None => eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message),
    }
}
