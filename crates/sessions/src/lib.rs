#![forbid(unsafe_code)]

pub mod error;
pub mod exam;
pub mod practice;

pub use error::SessionError;
pub use exam::{ExamProgress, ExamSession};
pub use full_test::FullTestSession;
pub use practice::{PoolEntry, PracticeSession, SubmitOutcome};
