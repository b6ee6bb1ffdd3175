use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {number} has empty text")]
    EmptyText { number: u32 },

    #[error("question {number} needs at least 2 options, got {found}")]
    TooFewOptions { number: u32, found: usize },

    #[error("question {number} has an empty option")]
    EmptyOption { number: u32 },

    #[error("correct option of question {number} is not among its options")]
    CorrectOptionMissing { number: u32 },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question.
///
/// Construction trims surrounding whitespace from text and options and
/// guarantees the correct option appears verbatim in the option list, so
/// grading never needs to re-validate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    number: u32,
    text: String,
    options: Vec<String>,
    correct_option: String,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text is empty, fewer than two options
    /// are given, any option is empty, or the correct option is not listed.
    pub fn new(
        number: u32,
        text: impl Into<String>,
        options: Vec<String>,
        correct_option: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into().trim().to_owned();
        if text.is_empty() {
            return Err(QuestionError::EmptyText { number });
        }

        let options: Vec<String> = options
            .into_iter()
            .map(|opt| opt.trim().to_owned())
            .collect();
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                number,
                found: options.len(),
            });
        }
        if options.iter().any(String::is_empty) {
            return Err(QuestionError::EmptyOption { number });
        }

        let correct_option = correct_option.into().trim().to_owned();
        if !options.contains(&correct_option) {
            return Err(QuestionError::CorrectOptionMissing { number });
        }

        Ok(Self {
            number,
            text,
            options,
            correct_option,
        })
    }

    /// Ordinal number, 1-based and unique within the owning module.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.correct_option
    }

    /// Returns true if `option` is one of the listed options.
    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|opt| opt == option)
    }

    /// Returns true if `option` is the correct one.
    #[must_use]
    pub fn is_correct(&self, option: &str) -> bool {
        self.correct_option == option
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
