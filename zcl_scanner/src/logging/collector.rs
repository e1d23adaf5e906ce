//! Per-source diagnostic collection
//!
//! Events logged while a source context is active are grouped by source label
//! so a caller scanning many buffers can report problems source by source.

use super::config;
use super::events::LogEvent;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// The source currently being scanned on a thread
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub label: String,
    pub source_id: usize,
    pub start_time: Instant,
}

impl SourceContext {
    pub fn new(label: impl Into<String>, source_id: usize) -> Self {
        Self {
            label: label.into(),
            source_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    pub total_sources: usize,
    pub clean_sources: usize,
    pub sources_with_errors: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    /// Events refused because a limit was reached
    pub dropped_events: usize,
}

impl CollectionSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

#[derive(Debug, Default)]
struct CollectorState {
    events: BTreeMap<String, Vec<LogEvent>>,
    total: usize,
    dropped: usize,
}

/// Thread-safe collector of events grouped by source label
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    state: Mutex<CollectorState>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CollectorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a source so it shows up in summaries even without events
    pub fn record_source(&self, label: &str) {
        self.lock().events.entry(label.to_string()).or_default();
    }

    /// Record an event for a source, honouring per-source and global limits
    pub fn record_event(&self, label: &str, event: LogEvent) {
        let mut state = self.lock();

        if state.total >= config::get_max_error_collection() {
            state.dropped += 1;
            return;
        }

        let per_source = config::get_max_log_events_per_source();
        let events = state.events.entry(label.to_string()).or_default();
        if events.len() >= per_source {
            state.dropped += 1;
            return;
        }

        events.push(event);
        state.total += 1;
    }

    pub fn get_source_events(&self, label: &str) -> Vec<LogEvent> {
        self.lock().events.get(label).cloned().unwrap_or_default()
    }

    pub fn get_source_errors(&self, label: &str) -> Vec<LogEvent> {
        self.lock()
            .events
            .get(label)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn source_has_errors(&self, label: &str) -> bool {
        self.lock()
            .events
            .get(label)
            .is_some_and(|events| events.iter().any(|e| e.is_error()))
    }

    pub fn get_sources_with_errors(&self) -> Vec<String> {
        self.lock()
            .events
            .iter()
            .filter(|(_, events)| events.iter().any(|e| e.is_error()))
            .map(|(label, _)| label.clone())
            .collect()
    }

    pub fn total_event_count(&self) -> usize {
        self.lock().total
    }

    /// Current usage against the global limit as (current, max, fraction)
    pub fn get_capacity_info(&self) -> (usize, usize, f64) {
        let current = self.total_event_count();
        let max = config::get_max_error_collection();
        let fraction = if max > 0 {
            current as f64 / max as f64
        } else {
            0.0
        };
        (current, max, fraction)
    }

    pub fn get_summary(&self) -> CollectionSummary {
        let state = self.lock();
        let mut summary = CollectionSummary {
            total_sources: state.events.len(),
            dropped_events: state.dropped,
            ..CollectionSummary::default()
        };

        for events in state.events.values() {
            let errors = events.iter().filter(|e| e.is_error()).count();
            summary.total_errors += errors;
            summary.total_warnings += events.iter().filter(|e| e.is_warning()).count();
            if errors > 0 {
                summary.sources_with_errors += 1;
            } else {
                summary.clean_sources += 1;
            }
        }

        summary
    }

    pub fn clear(&self) {
        *self.lock() = CollectorState::default();
    }

    /// Render collected errors and warnings grouped by source
    pub fn format_report(&self) -> String {
        let state = self.lock();
        let mut output = String::new();

        for (label, events) in &state.events {
            for event in events.iter().filter(|e| e.is_error() || e.is_warning()) {
                let kind = if event.is_error() { "error" } else { "warning" };
                output.push_str(&format!("{}[{}]: {}\n", kind, event.code, event.message));
                match event.range {
                    Some(range) => output.push_str(&format!("  --> {}:{}\n", label, range.start)),
                    None => output.push_str(&format!("  --> {}\n", label)),
                }
            }
        }

        let errors: usize = state
            .events
            .values()
            .map(|events| events.iter().filter(|e| e.is_error()).count())
            .sum();
        if errors == 0 {
            output.push_str("no errors\n");
        } else {
            output.push_str(&format!(
                "{} error(s) in {} source(s)\n",
                errors,
                state
                    .events
                    .values()
                    .filter(|events| events.iter().any(|e| e.is_error()))
                    .count()
            ));
        }

        output
    }
}
