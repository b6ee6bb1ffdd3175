use std::collections::HashSet;
use thiserror::Error;

use crate::model::question::Question;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("module name cannot be empty")]
    EmptyName,

    #[error("module {name:?} has no questions")]
    NoQuestions { name: String },

    #[error("module {name:?} repeats question number {number}")]
    DuplicateNumber { name: String, number: u32 },
}

//
// ─── MODULE ────────────────────────────────────────────────────────────────────
//

/// A named, ordered, immutable collection of questions for one subject area.
///
/// Ordinal numbers are unique within the module and a module always holds at
/// least one question; the loader enforces both before a `Module` exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    name: String,
    questions: Vec<Question>,
}

impl Module {
    /// Build a validated module.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError` when the name is empty, the question list is
    /// empty, or two questions share an ordinal number.
    pub fn new(name: impl Into<String>, questions: Vec<Question>) -> Result<Self, ModuleError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(ModuleError::EmptyName);
        }
        if questions.is_empty() {
            return Err(ModuleError::NoQuestions { name });
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.number()) {
                return Err(ModuleError::DuplicateNumber {
                    name,
                    number: question.number(),
                });
            }
        }

        Ok(Self { name, questions })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Questions in their stored order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Look up a question by its ordinal number.
    #[must_use]
    pub fn question(&self, number: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.number() == number)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn question(number: u32) -> Question {
        Question::new(
            number,
            format!("Question {number}"),
            vec!["a".to_owned(), "b".to_owned()],
            "a",
        )
        .unwrap()
    }

    #[test]
    fn builds_and_looks_up_by_number() {
        let module = Module::new("Anatomy", vec![question(1), question(2)]).unwrap();
        assert_eq!(module.name(), "Anatomy");
        assert_eq!(module.question_count(), 2);
        assert_eq!(module.question(2).unwrap().number(), 2);
        assert!(module.question(3).is_none());
    }

    #[test]
    fn rejects_empty_name() {
        let err = Module::new("  ", vec![question(1)]).unwrap_err();
        assert!(matches!(err, ModuleError::EmptyName));
    }

    #[test]
    fn rejects_empty_question_list() {
        let err = Module::new("Anatomy", Vec::new()).unwrap_err();
        assert!(matches!(err, ModuleError::NoQuestions { .. }));
    }

    #[test]
    fn rejects_duplicate_numbers() {
        let err = Module::new("Anatomy", vec![question(1), question(1)]).unwrap_err();
        assert!(matches!(err, ModuleError::DuplicateNumber { number: 1, .. }));
    }
}
