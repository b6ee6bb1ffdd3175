use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rng;
use rand::seq::SliceRandom;

use quiz_core::model::{
    Attempt, AttemptBucket, Module, ModulePracticeStats, PracticeReport, Question, QuizMode,
    SessionId, SessionReport,
};
use recorder::{SessionRecorder, SessionSummaryEvent};

use crate::error::SessionError;

//
// ─── POOL ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryOutcome {
    Pending,
    Correct { attempt: u32 },
    Skipped,
    Revealed,
}

/// One question in the shuffled practice pool, tagged with its module.
#[derive(Debug, Clone)]
pub struct PoolEntry {
    module: String,
    question: Question,
    attempts: u32,
    outcome: EntryOutcome,
}

impl PoolEntry {
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    /// Exact number of submissions made on this entry so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Outcome of a single `PracticeSession::submit` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub correct: bool,
    /// 1-based index of the attempt that was just graded.
    pub attempt_index: u32,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One-question-at-a-time session over a pooled draw across the selected
/// modules, with retry-until-correct semantics.
///
/// The pool is the concatenation of every selected module's questions,
/// shuffled once at construction and consumed front to back; each question
/// appears exactly once per session. Wrong answers keep the cursor in place,
/// skip/reveal are only possible before the first submission on a question,
/// and `terminate` drops everything not yet visited from the report.
pub struct PracticeSession {
    id: SessionId,
    module_names: Vec<String>,
    pool: Vec<PoolEntry>,
    cursor: usize,
    terminated: bool,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    report: Option<PracticeReport>,
    recorder: Arc<dyn SessionRecorder>,
}

impl PracticeSession {
    /// Create a session over the given modules.
    ///
    /// `started_at` should come from the caller's clock so time stays
    /// deterministic under test.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptySelection` if the combined pool is empty.
    pub fn new(
        modules: &[Module],
        recorder: Arc<dyn SessionRecorder>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let mut pool: Vec<PoolEntry> = modules
            .iter()
            .flat_map(|module| {
                module.questions().iter().map(|question| PoolEntry {
                    module: module.name().to_owned(),
                    question: question.clone(),
                    attempts: 0,
                    outcome: EntryOutcome::Pending,
                })
            })
            .collect();

        if pool.is_empty() {
            return Err(SessionError::EmptySelection);
        }

        let mut rng = rng();
        pool.as_mut_slice().shuffle(&mut rng);

        Ok(Self {
            id: SessionId::new(),
            module_names: modules.iter().map(|m| m.name().to_owned()).collect(),
            pool,
            cursor: 0,
            terminated: false,
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

    /// Questions in the pool at session start.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.pool.len()
    }

    /// Pool entries not yet reached.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pool.len().saturating_sub(self.cursor)
    }

    /// Entries already resolved as correct, skipped, or revealed.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.pool.len()
    }

    /// The entry under the cursor, or `None` once the pool is consumed or the
    /// session was terminated.
    #[must_use]
    pub fn current(&self) -> Option<&PoolEntry> {
        if self.terminated {
            return None;
        }
        self.pool.get(self.cursor)
    }

    fn current_index(&self) -> Result<usize, SessionError> {
        if self.terminated || self.is_exhausted() {
            return Err(SessionError::InvalidState);
        }
        Ok(self.cursor)
    }

    /// Grade one submitted option for the current question.
    ///
    /// A correct answer resolves the entry and advances the cursor; a wrong
    /// one leaves the cursor in place so the question can be retried. Either
    /// way the attempt is recorded and forwarded to the recorder.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidOption` if `option` is not listed for
    /// the current question (nothing is recorded), or
    /// `SessionError::InvalidState` when no question is active.
    pub fn submit(
        &mut self,
        option: &str,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome, SessionError> {
        let idx = self.current_index()?;
        let entry = &mut self.pool[idx];

        if !entry.question.has_option(option) {
            return Err(SessionError::InvalidOption {
                number: entry.question.number(),
                option: option.to_owned(),
            });
        }

        entry.attempts += 1;
        let correct = entry.question.is_correct(option);
        let attempt = Attempt::new(
            entry.module.clone(),
            entry.question.number(),
            entry.attempts,
            option,
            correct,
            now,
        );

        if correct {
            entry.outcome = EntryOutcome::Correct {
                attempt: entry.attempts,
            };
            self.cursor += 1;
        }
        let attempt_index = attempt.attempt_index;
        self.recorder.record_answer(&attempt);

        Ok(SubmitOutcome {
            correct,
            attempt_index,
        })
    }

    /// Mark the current question as skipped and move on.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` when no question is active or the
    /// question has already been attempted.
    pub fn skip(&mut self) -> Result<(), SessionError> {
        let idx = self.current_index()?;
        let entry = &mut self.pool[idx];
        if entry.attempts > 0 {
            return Err(SessionError::InvalidState);
        }

        entry.outcome = EntryOutcome::Skipped;
        self.cursor += 1;
        Ok(())
    }

    /// Reveal the correct option for the current question and move on.
    ///
    /// # Errors
    ///
    /// Same preconditions as [`skip`](Self::skip).
    pub fn reveal(&mut self) -> Result<&str, SessionError> {
        let idx = self.current_index()?;
        let entry = &mut self.pool[idx];
        if entry.attempts > 0 {
            return Err(SessionError::InvalidState);
        }

        entry.outcome = EntryOutcome::Revealed;
        self.cursor += 1;
        Ok(self.pool[idx].question.correct_option())
    }

    /// End the session early. Entries not yet visited are excluded from the
    /// report rather than counted as skipped.
    pub fn terminate(&mut self) {
        self.terminated = true;
    }

    /// Build the final report, emitting the summary event on the first call.
    ///
    /// Idempotent: later calls return the cached report unchanged.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` while the pool is neither
    /// exhausted nor terminated.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<&PracticeReport, SessionError> {
        if self.report.is_none() {
            if !(self.is_exhausted() || self.terminated) {
                return Err(SessionError::InvalidState);
            }

            let report = self.build_report();
            self.ended_at = Some(now);
            self.recorder.record_summary(&SessionSummaryEvent {
                session_id: self.id,
                mode: QuizMode::Practice,
                modules: self.module_names.clone(),
                started_at: self.started_at,
                ended_at: now,
                report: SessionReport::Practice(report.clone()),
            });
            self.report = Some(report);
        }

        self.report.as_ref().ok_or(SessionError::InvalidState)
    }

    fn build_report(&self) -> PracticeReport {
        let mut correct_by_attempt: BTreeMap<AttemptBucket, u32> = BTreeMap::new();
        let mut modules: BTreeMap<String, ModulePracticeStats> = BTreeMap::new();
        let mut skipped = 0;
        let mut revealed = 0;
        let mut presented = 0;

        for entry in &self.pool {
            let stats = modules.entry(entry.module.clone()).or_default();
            match entry.outcome {
                EntryOutcome::Pending => continue,
                EntryOutcome::Correct { attempt } => {
                    *correct_by_attempt
                        .entry(AttemptBucket::from_attempts(attempt))
                        .or_insert(0) += 1;
                    if attempt == 1 {
                        stats.correct_first_try += 1;
                    } else {
                        stats.correct_after_retry += 1;
                    }
                }
                EntryOutcome::Skipped => {
                    skipped += 1;
                    stats.skipped += 1;
                }
                EntryOutcome::Revealed => {
                    revealed += 1;
                    stats.revealed += 1;
                }
            }
            stats.attempted += 1;
            presented += 1;
        }

        // Modules with no resolved entry carry nothing to report.
        modules.retain(|_, stats| stats.attempted > 0);

        PracticeReport {
            pool_size: u32::try_from(self.pool.len()).unwrap_or(u32::MAX),
            presented,
            correct_by_attempt,
            skipped,
            revealed,
            modules,
        }
    }
}

impl fmt::Debug for PracticeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PracticeSession")
            .field("id", &self.id)
            .field("pool_len", &self.pool.len())
            .field("cursor", &self.cursor)
            .field("terminated", &self.terminated)
            .field("started_at", &self.started_at)
            .field("ended_at", &self.ended_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;
    use recorder::InMemoryRecorder;

    fn module(name: &str, numbers: &[u32]) -> Module {
        let questions = numbers
            .iter()
            .map(|n| {
                Question::new(
                    *n,
                    format!("Question {n}"),
                    vec!["right".to_owned(), "wrong".to_owned()],
                    "right",
                )
                .unwrap()
            })
            .collect();
        Module::new(name, questions).unwrap()
    }

    fn session_with(
        modules: &[Module],
    ) -> (PracticeSession, InMemoryRecorder) {
        let recorder = InMemoryRecorder::new();
        let session =
            PracticeSession::new(modules, Arc::new(recorder.clone()), fixed_now()).unwrap();
        (session, recorder)
    }

    #[test]
    fn empty_selection_is_rejected() {
        let recorder = InMemoryRecorder::new();
        let err =
            PracticeSession::new(&[], Arc::new(recorder), fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::EmptySelection));
    }

    #[test]
    fn pool_spans_all_modules_without_repeats() {
        let (mut session, _recorder) =
            session_with(&[module("A", &[1, 2]), module("B", &[1, 2, 3])]);
        assert_eq!(session.total_questions(), 5);

        let mut seen = Vec::new();
        while let Some(entry) = session.current() {
            seen.push((entry.module().to_owned(), entry.question().number()));
            session.submit("right", fixed_now()).unwrap();
        }

        assert_eq!(seen.len(), 5);
        let mut deduped = seen.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), 5);
    }

    #[test]
    fn wrong_answer_keeps_cursor_and_increments_attempts() {
        let (mut session, recorder) = session_with(&[module("A", &[1, 2])]);
        let before = session.current().unwrap().question().number();

        let outcome = session.submit("wrong", fixed_now()).unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.attempt_index, 1);
        assert_eq!(session.current().unwrap().question().number(), before);

        let outcome = session.submit("right", fixed_now()).unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.attempt_index, 2);
        assert_eq!(session.completed_count(), 1);

        let attempts = recorder.answers();
        assert_eq!(attempts.len(), 2);
        assert!(!attempts[0].correct);
        assert_eq!(attempts[0].attempt_index, 1);
        assert!(attempts[1].correct);
        assert_eq!(attempts[1].attempt_index, 2);
    }

    #[test]
    fn unlisted_option_is_an_error_and_records_nothing() {
        let (mut session, recorder) = session_with(&[module("A", &[1])]);

        let err = session.submit("no-such-option", fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::InvalidOption { .. }));
        assert!(recorder.answers().is_empty());

        // The invalid call did not burn an attempt.
        let outcome = session.submit("right", fixed_now()).unwrap();
        assert_eq!(outcome.attempt_index, 1);
    }

    #[test]
    fn skip_and_reveal_require_untouched_question() {
        let (mut session, _recorder) = session_with(&[module("A", &[1, 2])]);

        session.submit("wrong", fixed_now()).unwrap();
        assert!(matches!(session.skip(), Err(SessionError::InvalidState)));
        assert!(matches!(session.reveal(), Err(SessionError::InvalidState)));

        session.submit("right", fixed_now()).unwrap();
        assert_eq!(session.reveal().unwrap(), "right");
        assert!(session.is_exhausted());
    }

    #[test]
    fn wrong_then_right_skip_reveal_scenario() {
        let (mut session, recorder) = session_with(&[module("A", &[1, 2, 3])]);

        session.submit("wrong", fixed_now()).unwrap();
        session.submit("right", fixed_now()).unwrap();
        session.skip().unwrap();
        session.reveal().unwrap();

        let report = session.finish(fixed_now()).unwrap().clone();
        assert_eq!(report.presented, 3);
        assert_eq!(report.correct_at(AttemptBucket::First), 0);
        assert_eq!(report.correct_at(AttemptBucket::Second), 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.revealed, 1);
        assert_eq!(
            report.total_correct() + report.skipped + report.revealed,
            report.presented
        );

        let stats = &report.modules["A"];
        assert_eq!(stats.attempted, 3);
        assert_eq!(stats.correct_after_retry, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.revealed, 1);

        assert_eq!(recorder.summaries().len(), 1);
    }

    #[test]
    fn many_retries_land_in_five_plus_bucket() {
        let (mut session, _recorder) = session_with(&[module("A", &[1])]);
        for _ in 0..6 {
            session.submit("wrong", fixed_now()).unwrap();
        }
        session.submit("right", fixed_now()).unwrap();

        let report = session.finish(fixed_now()).unwrap();
        assert_eq!(report.correct_at(AttemptBucket::FivePlus), 1);
    }

    #[test]
    fn terminate_excludes_unvisited_questions() {
        let (mut session, _recorder) = session_with(&[module("A", &[1, 2, 3, 4])]);

        session.submit("right", fixed_now()).unwrap();
        session.terminate();
        assert!(session.current().is_none());
        assert!(matches!(
            session.submit("right", fixed_now()),
            Err(SessionError::InvalidState)
        ));

        let report = session.finish(fixed_now()).unwrap();
        assert_eq!(report.pool_size, 4);
        assert_eq!(report.presented, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.total_correct(), 1);
    }

    #[test]
    fn finish_before_terminal_state_is_invalid() {
        let (mut session, recorder) = session_with(&[module("A", &[1, 2])]);
        assert!(matches!(
            session.finish(fixed_now()),
            Err(SessionError::InvalidState)
        ));
        assert!(recorder.summaries().is_empty());
    }

    #[test]
    fn finish_is_idempotent_and_emits_one_summary() {
        let (mut session, recorder) = session_with(&[module("A", &[1])]);
        session.submit("right", fixed_now()).unwrap();

        let first = session.finish(fixed_now()).unwrap().clone();
        let second = session
            .finish(fixed_now() + chrono::Duration::minutes(5))
            .unwrap()
            .clone();
        assert_eq!(first, second);
        assert_eq!(session.ended_at(), Some(fixed_now()));
        assert_eq!(recorder.summaries().len(), 1);
    }
}
