//! Shared error type for the session engines.

use thiserror::Error;

/// Errors emitted by quiz sessions.
///
/// Every variant is recoverable by the caller; unless a method documents
/// otherwise, session state is unchanged when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for the selected modules")]
    EmptySelection,

    #[error("module {module:?} offers {available} questions, the exam draw needs {requested}")]
    InsufficientQuestions {
        module: String,
        requested: u32,
        available: u32,
    },

    #[error("a full test covers exactly one module, got {count}")]
    MultiModuleNotAllowed { count: usize },

    #[error("option {option:?} is not listed for question {number}")]
    InvalidOption { number: u32, option: String },

    #[error("no question with ordinal {0} in the current set")]
    UnknownOrdinal(u32),

    #[error("operation is not valid in the current session state")]
    InvalidState,

    #[error("answers have already been submitted")]
    AlreadySubmitted,

    #[error("{missing} question(s) still lack an answer")]
    IncompleteSubmission { missing: usize },

    #[error("the active module's time limit has expired")]
    TimeExpired,
}
