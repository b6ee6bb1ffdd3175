use std::collections::HashMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("question count must be > 0")]
    InvalidQuestionCount,

    #[error("time limit must be > 0 seconds")]
    InvalidTimeLimit,
}

//
// ─── BUDGET ────────────────────────────────────────────────────────────────────
//

/// Questions drawn per exam module when no override is configured.
pub const DEFAULT_QUESTIONS_PER_MODULE: u32 = 15;

/// Seconds allowed per exam module when no override is configured.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 900;

/// Question/time budget for a single exam module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleBudget {
    question_count: u32,
    time_limit_secs: u32,
}

impl ModuleBudget {
    /// Build a validated budget.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when either value is zero.
    pub fn new(question_count: u32, time_limit_secs: u32) -> Result<Self, ConfigError> {
        if question_count == 0 {
            return Err(ConfigError::InvalidQuestionCount);
        }
        if time_limit_secs == 0 {
            return Err(ConfigError::InvalidTimeLimit);
        }
        Ok(Self {
            question_count,
            time_limit_secs,
        })
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn time_limit(&self) -> Duration {
        Duration::seconds(i64::from(self.time_limit_secs))
    }
}

impl Default for ModuleBudget {
    fn default() -> Self {
        Self {
            question_count: DEFAULT_QUESTIONS_PER_MODULE,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
        }
    }
}

//
// ─── EXAM CONFIG ───────────────────────────────────────────────────────────────
//

/// Exam configuration: per-module budget overrides plus the default pair
/// applied to any module without one. Read-only once a session is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamConfig {
    default_budget: ModuleBudget,
    overrides: HashMap<String, ModuleBudget>,
}

impl ExamConfig {
    #[must_use]
    pub fn new(default_budget: ModuleBudget) -> Self {
        Self {
            default_budget,
            overrides: HashMap::new(),
        }
    }

    /// Set the budget for one named module.
    #[must_use]
    pub fn with_budget(mut self, module: impl Into<String>, budget: ModuleBudget) -> Self {
        self.overrides.insert(module.into(), budget);
        self
    }

    #[must_use]
    pub fn default_budget(&self) -> ModuleBudget {
        self.default_budget
    }

    /// Budget for the named module, falling back to the default pair.
    #[must_use]
    pub fn budget_for(&self, module: &str) -> ModuleBudget {
        self.overrides
            .get(module)
            .copied()
            .unwrap_or(self.default_budget)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_validates_inputs() {
        assert!(matches!(
            ModuleBudget::new(0, 60).unwrap_err(),
            ConfigError::InvalidQuestionCount
        ));
        assert!(matches!(
            ModuleBudget::new(5, 0).unwrap_err(),
            ConfigError::InvalidTimeLimit
        ));
        let budget = ModuleBudget::new(5, 60).unwrap();
        assert_eq!(budget.question_count(), 5);
        assert_eq!(budget.time_limit(), Duration::seconds(60));
    }

    #[test]
    fn default_pair_matches_exam_constants() {
        let budget = ModuleBudget::default();
        assert_eq!(budget.question_count(), DEFAULT_QUESTIONS_PER_MODULE);
        assert_eq!(budget.time_limit_secs(), DEFAULT_TIME_LIMIT_SECS);
    }

    #[test]
    fn overrides_win_and_others_fall_back() {
        let config = ExamConfig::default()
            .with_budget("Mod A", ModuleBudget::new(2, 60).unwrap());

        let a = config.budget_for("Mod A");
        assert_eq!(a.question_count(), 2);
        assert_eq!(a.time_limit_secs(), 60);

        let b = config.budget_for("Mod B");
        assert_eq!(b, config.default_budget());
    }
}
