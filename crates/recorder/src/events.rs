use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quiz_core::model::{Attempt, QuizMode, SessionId, SessionReport};

/// Summary emitted exactly once when a session reaches its terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummaryEvent {
    pub session_id: SessionId,
    pub mode: QuizMode,
    pub modules: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub report: SessionReport,
}

/// Everything a recorder can observe, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordedEvent {
    Answer(Attempt),
    Summary(SessionSummaryEvent),
}
