mod attempt;
mod config;
mod ids;
mod module;
mod question;
mod report;

pub use attempt::Attempt;
pub use config::{
    ConfigError, DEFAULT_QUESTIONS_PER_MODULE, DEFAULT_TIME_LIMIT_SECS, ExamConfig, ModuleBudget,
};
pub use ids::SessionId;
pub use module::{Module, ModuleError};
pub use question::{Question, QuestionError};
pub use report::{
    AttemptBucket, CompletionKind, ExamReport, FullTestReport, ModuleExamResult,
    ModulePracticeStats, PracticeReport, QuestionVerdict, QuizMode, SessionReport, score_percent,
};
