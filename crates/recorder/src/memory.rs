use std::sync::{Arc, Mutex};

use quiz_core::model::Attempt;

use crate::SessionRecorder;
use crate::events::{RecordedEvent, SessionSummaryEvent};

/// In-memory recorder keeping events in emission order.
///
/// Stands in for a durable append log in tests and prototyping. A poisoned
/// lock silently drops the event: delivery is best-effort at this boundary.
#[derive(Clone, Default)]
pub struct InMemoryRecorder {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl InMemoryRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of every recorded event, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Snapshot of the answer events only, in emission order.
    #[must_use]
    pub fn answers(&self) -> Vec<Attempt> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RecordedEvent::Answer(attempt) => Some(attempt),
                RecordedEvent::Summary(_) => None,
            })
            .collect()
    }

    /// Snapshot of the summary events only, in emission order.
    #[must_use]
    pub fn summaries(&self) -> Vec<SessionSummaryEvent> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RecordedEvent::Summary(summary) => Some(summary),
                RecordedEvent::Answer(_) => None,
            })
            .collect()
    }
}

impl SessionRecorder for InMemoryRecorder {
    fn record_answer(&self, attempt: &Attempt) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(RecordedEvent::Answer(attempt.clone()));
        }
    }

    fn record_summary(&self, summary: &SessionSummaryEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(RecordedEvent::Summary(summary.clone()));
        }
    }
}
