#![forbid(unsafe_code)]

mod events;
mod memory;

pub use events::{RecordedEvent, SessionSummaryEvent};
pub use memory::InMemoryRecorder;

use quiz_core::model::Attempt;

/// Boundary each session emits its events to.
///
/// Calls are synchronous and fire-and-forget: the session guarantees
/// chronological order and exactly-once emission, while durability, batching,
/// and retry belong entirely to the implementor. Delivery failures are never
/// surfaced back to the session.
pub trait SessionRecorder: Send + Sync {
    /// Append one answer attempt.
    fn record_answer(&self, attempt: &Attempt);

    /// Append the final session summary.
    fn record_summary(&self, summary: &SessionSummaryEvent);
}

/// Recorder that drops every event, for callers that keep no log.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecorder;

impl SessionRecorder for NullRecorder {
    fn record_answer(&self, _attempt: &Attempt) {}

    fn record_summary(&self, _summary: &SessionSummaryEvent) {}
}
