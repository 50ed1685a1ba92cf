//! Port for structured interaction logging.
//!
//! Defines the [`InteractionLogger`] trait for recording one event per
//! finished bridge invocation (tool, caller, agent, status, reason).
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures an audit
//! trail in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured interaction event for logging.
pub struct InteractionEvent {
    /// Event type identifier (e.g., "tool_call", "outcome").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl InteractionEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging interaction events to a structured log.
///
/// The `log` method is synchronous and non-fallible; logging failures are
/// ignored so they never affect an invocation.
pub trait InteractionLogger: Send + Sync {
    fn log(&self, event: InteractionEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoInteractionLogger;

impl InteractionLogger for NoInteractionLogger {
    fn log(&self, _event: InteractionEvent) {}
}
