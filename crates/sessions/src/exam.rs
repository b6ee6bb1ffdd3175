use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::rng;
use rand::seq::IndexedRandom;

use quiz_core::model::{
    Attempt, CompletionKind, ExamConfig, ExamReport, Module, ModuleExamResult, Question, QuizMode,
    SessionId, SessionReport, score_percent,
};
use recorder::{SessionRecorder, SessionSummaryEvent};

use crate::error::SessionError;

//
// ─── MODULE RUN ────────────────────────────────────────────────────────────────
//

/// One module's drawn questions, stored answers, and timer state.
struct ModuleRun {
    name: String,
    questions: Vec<Question>,
    answers: BTreeMap<u32, String>,
    time_limit: Duration,
    activated_at: Option<DateTime<Utc>>,
    deadline: Option<DateTime<Utc>>,
    cursor: usize,
    result: Option<ModuleExamResult>,
}

impl ModuleRun {
    fn position_of(&self, number: u32) -> Option<usize> {
        self.questions.iter().position(|q| q.number() == number)
    }

    fn expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

/// Snapshot of how far through the exam the learner is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamProgress {
    pub total_modules: usize,
    pub completed_modules: usize,
    /// 1-based position of the active module, `None` once all are finalized.
    pub current_module: Option<usize>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Timed exam simulation over one or more modules.
///
/// Each module gets a random draw of `question_count` questions and its own
/// wall-clock deadline. Modules are attempted strictly in selection order;
/// a module's timer starts when it becomes active (the first at
/// construction, each later one when its predecessor is finalized), so no
/// module loses time while an earlier one is being worked.
///
/// Deadlines are evaluated on demand against the caller-supplied `now` —
/// nothing ticks in the background. Once a deadline has passed, navigation
/// and answer revision fail with `TimeExpired`, but `submit_module` still
/// finalizes whatever answers were stored before expiry.
pub struct ExamSession {
    id: SessionId,
    runs: Vec<ModuleRun>,
    active: usize,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    report: Option<ExamReport>,
    recorder: Arc<dyn SessionRecorder>,
}

impl ExamSession {
    /// Create a session over the given modules, drawing per-module question
    /// subsets according to `config`.
    ///
    /// The first module is activated immediately: its deadline is
    /// `started_at` plus its configured limit.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptySelection` for an empty module list and
    /// `SessionError::InsufficientQuestions` when a module offers fewer
    /// questions than its budget requests.
    pub fn new(
        modules: Vec<Module>,
        config: &ExamConfig,
        recorder: Arc<dyn SessionRecorder>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if modules.is_empty() {
            return Err(SessionError::EmptySelection);
        }

        let mut rng = rng();
        let mut runs = Vec::with_capacity(modules.len());
        for module in modules {
            let budget = config.budget_for(module.name());
            let requested = budget.question_count() as usize;
            let available = module.question_count();
            if available < requested {
                return Err(SessionError::InsufficientQuestions {
                    module: module.name().to_owned(),
                    requested: budget.question_count(),
                    available: u32::try_from(available).unwrap_or(u32::MAX),
                });
            }

            let questions: Vec<Question> = module
                .questions()
                .choose_multiple(&mut rng, requested)
                .cloned()
                .collect();

            runs.push(ModuleRun {
                name: module.name().to_owned(),
                questions,
                answers: BTreeMap::new(),
                time_limit: budget.time_limit(),
                activated_at: None,
                deadline: None,
                cursor: 0,
                result: None,
            });
        }

        if let Some(first) = runs.first_mut() {
            first.activated_at = Some(started_at);
            first.deadline = Some(started_at + first.time_limit);
        }

        Ok(Self {
            id: SessionId::new(),
            runs,
            active: 0,
            started_at,
            ended_at: None,
            report: None,
            recorder,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Name of the module currently being worked, `None` once all are done.
    #[must_use]
    pub fn active_module(&self) -> Option<&str> {
        self.runs.get(self.active).map(|run| run.name.as_str())
    }

    /// The active module's drawn questions, empty once all modules are done.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        self.runs
            .get(self.active)
            .map_or(&[], |run| run.questions.as_slice())
    }

    /// The drawn question under the navigation cursor.
    #[must_use]
    pub fn current(&self) -> Option<&Question> {
        self.runs
            .get(self.active)
            .and_then(|run| run.questions.get(run.cursor))
    }

    /// The answer stored for a question of the active module, if any.
    #[must_use]
    pub fn saved_answer(&self, number: u32) -> Option<&str> {
        self.runs
            .get(self.active)
            .and_then(|run| run.answers.get(&number))
            .map(String::as_str)
    }

    /// Stored answers in the active module.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.runs.get(self.active).map_or(0, |run| run.answers.len())
    }

    #[must_use]
    pub fn progress(&self) -> ExamProgress {
        ExamProgress {
            total_modules: self.runs.len(),
            completed_modules: self.runs.iter().filter(|run| run.result.is_some()).count(),
            current_module: (self.active < self.runs.len()).then_some(self.active + 1),
        }
    }

    /// Time left on the active module's clock, floored at zero.
    ///
    /// Pure read: never mutates timer state. Zero once every module is done.
    #[must_use]
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        let Some(run) = self.runs.get(self.active) else {
            return Duration::zero();
        };
        match run.deadline {
            Some(deadline) if deadline > now => deadline - now,
            _ => Duration::zero(),
        }
    }

    fn active_index(&self) -> Result<usize, SessionError> {
        if self.active < self.runs.len() {
            Ok(self.active)
        } else {
            Err(SessionError::InvalidState)
        }
    }

    /// Move the navigation cursor to the question with the given ordinal.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::TimeExpired` past the active deadline,
    /// `SessionError::UnknownOrdinal` for a number outside the draw, or
    /// `SessionError::InvalidState` once all modules are finalized.
    pub fn go_to(&mut self, number: u32, now: DateTime<Utc>) -> Result<(), SessionError> {
        let idx = self.active_index()?;
        let run = &mut self.runs[idx];
        if run.expired(now) {
            return Err(SessionError::TimeExpired);
        }
        let position = run
            .position_of(number)
            .ok_or(SessionError::UnknownOrdinal(number))?;
        run.cursor = position;
        Ok(())
    }

    /// Store or overwrite the answer for a question of the active module.
    ///
    /// Revisions are unlimited until the module is finalized or its deadline
    /// passes; nothing is recorded yet.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::TimeExpired` past the active deadline, plus
    /// `SessionError::UnknownOrdinal` / `SessionError::InvalidOption` for
    /// values outside the draw, or `SessionError::InvalidState` once all
    /// modules are finalized.
    pub fn set_answer(
        &mut self,
        number: u32,
        option: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        let idx = self.active_index()?;
        let run = &mut self.runs[idx];
        if run.expired(now) {
            return Err(SessionError::TimeExpired);
        }
        let position = run
            .position_of(number)
            .ok_or(SessionError::UnknownOrdinal(number))?;
        if !run.questions[position].has_option(option) {
            return Err(SessionError::InvalidOption {
                number,
                option: option.to_owned(),
            });
        }

        run.answers.insert(number, option.to_owned());
        Ok(())
    }

    /// Finalize the active module and advance to the next one.
    ///
    /// Valid with any subset of questions answered, and also after the
    /// deadline — a timeout never discards stored answers. One attempt is
    /// recorded per answered question; unanswered questions count as
    /// incorrect in the score without an attempt. The next module's timer
    /// starts at `now`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` once all modules are finalized.
    pub fn submit_module(&mut self, now: DateTime<Utc>) -> Result<&ModuleExamResult, SessionError> {
        let idx = self.active_index()?;

        let result = {
            let run = &self.runs[idx];
            let activated_at = run.activated_at.ok_or(SessionError::InvalidState)?;

            let mut correct = 0_u32;
            for question in &run.questions {
                let Some(submitted) = run.answers.get(&question.number()) else {
                    continue;
                };
                let is_correct = question.is_correct(submitted);
                if is_correct {
                    correct += 1;
                }
                self.recorder.record_answer(&Attempt::new(
                    run.name.clone(),
                    question.number(),
                    1,
                    submitted.clone(),
                    is_correct,
                    now,
                ));
            }

            let timed_out = run.expired(now);
            let elapsed = now - activated_at;
            let time_spent = if elapsed > run.time_limit {
                run.time_limit
            } else {
                elapsed
            };
            let total = u32::try_from(run.questions.len()).unwrap_or(u32::MAX);

            ModuleExamResult {
                module: run.name.clone(),
                total,
                correct,
                score_percent: score_percent(correct, total),
                time_spent_secs: time_spent.num_seconds(),
                completed_by: if timed_out {
                    CompletionKind::TimedOut
                } else {
                    CompletionKind::Submitted
                },
            }
        };

        self.runs[idx].result = Some(result);
        self.active += 1;
        if let Some(next) = self.runs.get_mut(self.active) {
            next.activated_at = Some(now);
            next.deadline = Some(now + next.time_limit);
        }

        self.runs[idx].result.as_ref().ok_or(SessionError::InvalidState)
    }

    /// Build the final report once every module is finalized, emitting the
    /// summary event on the first call.
    ///
    /// Idempotent: later calls return the cached report unchanged.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` while any module is still open.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<&ExamReport, SessionError> {
        if self.report.is_none() {
            let results: Option<Vec<ModuleExamResult>> =
                self.runs.iter().map(|run| run.result.clone()).collect();
            let Some(modules) = results else {
                return Err(SessionError::InvalidState);
            };

            let total_questions: u32 = modules.iter().map(|m| m.total).sum();
            let total_correct: u32 = modules.iter().map(|m| m.correct).sum();
            let report = ExamReport {
                modules,
                total_questions,
                total_correct,
                overall_percent: score_percent(total_correct, total_questions),
            };

            self.ended_at = Some(now);
            self.recorder.record_summary(&SessionSummaryEvent {
                session_id: self.id,
                mode: QuizMode::Exam,
                modules: self.runs.iter().map(|run| run.name.clone()).collect(),
                started_at: self.started_at,
                ended_at: now,
                report: SessionReport::Exam(report.clone()),
            });
            self.report = Some(report);
        }

        self.report.as_ref().ok_or(SessionError::InvalidState)
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("id", &self.id)
            .field("modules", &self.runs.len())
            .field("active", &self.active)
            .field("started_at", &self.started_at)
            .field("ended_at", &self.ended_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
