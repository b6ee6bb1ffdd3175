use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

//
// ─── MODE ──────────────────────────────────────────────────────────────────────
//

/// The three ways a quiz session can be run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    Practice,
    FullTest,
    Exam,
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizMode::Practice => write!(f, "practice"),
            QuizMode::FullTest => write!(f, "full_test"),
            QuizMode::Exam => write!(f, "exam"),
        }
    }
}

//
// ─── ATTEMPT BUCKETS ───────────────────────────────────────────────────────────
//

/// Display bucket for "correct at attempt N" counts.
///
/// Raw attempt counters stay exact inside the session; bucketing is applied
/// only when the report is built, with everything from the fifth attempt up
/// collapsing into `FivePlus`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AttemptBucket {
    First,
    Second,
    Third,
    Fourth,
    FivePlus,
}

impl AttemptBucket {
    /// Bucket an exact attempt count (1-based).
    #[must_use]
    pub fn from_attempts(attempts: u32) -> Self {
        match attempts {
            0 | 1 => AttemptBucket::First,
            2 => AttemptBucket::Second,
            3 => AttemptBucket::Third,
            4 => AttemptBucket::Fourth,
            _ => AttemptBucket::FivePlus,
        }
    }
}

impl fmt::Display for AttemptBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptBucket::First => write!(f, "1"),
            AttemptBucket::Second => write!(f, "2"),
            AttemptBucket::Third => write!(f, "3"),
            AttemptBucket::Fourth => write!(f, "4"),
            AttemptBucket::FivePlus => write!(f, "5+"),
        }
    }
}

//
// ─── PRACTICE REPORT ───────────────────────────────────────────────────────────
//

/// Per-module slice of a practice report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePracticeStats {
    pub attempted: u32,
    pub correct_first_try: u32,
    pub correct_after_retry: u32,
    pub skipped: u32,
    pub revealed: u32,
}

impl ModulePracticeStats {
    #[must_use]
    pub fn total_correct(&self) -> u32 {
        self.correct_first_try + self.correct_after_retry
    }
}

/// Final summary of a practice session.
///
/// Only questions presented before termination are counted; unvisited pool
/// entries appear nowhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeReport {
    /// Questions in the shuffled pool at session start.
    pub pool_size: u32,
    /// Questions presented before the session ended.
    pub presented: u32,
    pub correct_by_attempt: BTreeMap<AttemptBucket, u32>,
    pub skipped: u32,
    pub revealed: u32,
    pub modules: BTreeMap<String, ModulePracticeStats>,
}

impl PracticeReport {
    #[must_use]
    pub fn total_correct(&self) -> u32 {
        self.correct_by_attempt.values().sum()
    }

    /// Count of questions answered correctly at the given bucket.
    #[must_use]
    pub fn correct_at(&self, bucket: AttemptBucket) -> u32 {
        self.correct_by_attempt.get(&bucket).copied().unwrap_or(0)
    }
}

//
// ─── FULL-TEST REPORT ──────────────────────────────────────────────────────────
//

/// Graded outcome of one question in a full test or exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionVerdict {
    pub number: u32,
    pub text: String,
    pub submitted_option: Option<String>,
    pub correct_option: String,
    pub correct: bool,
}

/// Final summary of a full-test session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullTestReport {
    pub module: String,
    pub total: u32,
    pub correct: u32,
    pub wrong: u32,
    pub score_percent: f64,
    pub questions: Vec<QuestionVerdict>,
}

//
// ─── EXAM REPORT ───────────────────────────────────────────────────────────────
//

/// How an exam module reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    Submitted,
    TimedOut,
}

/// Result of a single finalized exam module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleExamResult {
    pub module: String,
    pub total: u32,
    pub correct: u32,
    pub score_percent: f64,
    /// Capped at the module's time limit when the deadline was missed.
    pub time_spent_secs: i64,
    pub completed_by: CompletionKind,
}

/// Final summary of an exam session: every module's result plus the overall
/// aggregate (sum of correct answers over sum of drawn questions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamReport {
    pub modules: Vec<ModuleExamResult>,
    pub total_questions: u32,
    pub total_correct: u32,
    pub overall_percent: f64,
}

//
// ─── SESSION REPORT ────────────────────────────────────────────────────────────
//

/// Mode-specific report carried by a session summary event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionReport {
    Practice(PracticeReport),
    FullTest(FullTestReport),
    Exam(ExamReport),
}

impl SessionReport {
    #[must_use]
    pub fn mode(&self) -> QuizMode {
        match self {
            SessionReport::Practice(_) => QuizMode::Practice,
            SessionReport::FullTest(_) => QuizMode::FullTest,
            SessionReport::Exam(_) => QuizMode::Exam,
        }
    }
}

/// Percentage of `correct` over `total`, zero when nothing was asked.
#[must_use]
pub fn score_percent(correct: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(correct) / f64::from(total) * 100.0
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
