use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of a single graded submission for one question.
///
/// Attempts are append-only: sessions create them at grading time, forward
/// them to the recorder, and never mutate or delete them. The same shape is
/// the answer-event wire format at the recorder boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub module: String,
    pub question_number: u32,
    /// 1-based; increments only on incorrect resubmission of the same question.
    pub attempt_index: u32,
    pub submitted_option: String,
    pub correct: bool,
    pub submitted_at: DateTime<Utc>,
}

impl Attempt {
    #[must_use]
    pub fn new(
        module: impl Into<String>,
        question_number: u32,
        attempt_index: u32,
        submitted_option: impl Into<String>,
        correct: bool,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            module: module.into(),
            question_number,
            attempt_index,
            submitted_option: submitted_option.into(),
            correct,
            submitted_at,
        }
    }
}
