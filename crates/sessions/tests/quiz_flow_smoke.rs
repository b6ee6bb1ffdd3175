use std::sync::Arc;

use chrono::Duration;

use quiz_core::Clock;
use quiz_core::model::{ExamConfig, Module, ModuleBudget, Question, QuizMode, SessionReport};
use quiz_core::time::fixed_now;
use recorder::{InMemoryRecorder, RecordedEvent};
use sessions::{ExamSession, FullTestSession, PracticeSession};

fn module(name: &str, count: u32) -> Module {
    let questions = (1..=count)
        .map(|n| {
            Question::new(
                n,
                format!("Question {n}"),
                vec!["right".to_owned(), "wrong".to_owned()],
                "right",
            )
            .unwrap()
        })
        .collect();
    Module::new(name, questions).unwrap()
}

#[test]
fn practice_session_emits_ordered_attempts_then_one_summary() {
    let recorder = InMemoryRecorder::new();
    let modules = [module("Anatomy", 2), module("Pharmacology", 1)];
    let mut session =
        PracticeSession::new(&modules, Arc::new(recorder.clone()), fixed_now()).unwrap();

    let mut clock = Clock::fixed(fixed_now());
    while session.current().is_some() {
        clock.advance(Duration::seconds(10));
        session.submit("right", clock.now()).unwrap();
    }
    let report = session.finish(clock.now()).unwrap().clone();

    assert_eq!(report.presented, 3);
    assert_eq!(report.total_correct(), 3);

    let events = recorder.events();
    assert_eq!(events.len(), 4);
    let mut timestamps = Vec::new();
    for event in &events[..3] {
        match event {
            RecordedEvent::Answer(attempt) => timestamps.push(attempt.submitted_at),
            RecordedEvent::Summary(_) => panic!("summary before attempts"),
        }
    }
    assert!(timestamps.windows(2).all(|pair| pair[0] <= pair[1]));

    let summaries = recorder.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].mode, QuizMode::Practice);
    assert_eq!(summaries[0].started_at, fixed_now());
    assert!(matches!(summaries[0].report, SessionReport::Practice(_)));
}

#[test]
fn full_test_grades_atomically_and_summarizes() {
    let recorder = InMemoryRecorder::new();
    let mut session = FullTestSession::new(
        vec![module("Anatomy", 3)],
        Arc::new(recorder.clone()),
        fixed_now(),
    )
    .unwrap();

    for question in session.questions().to_vec() {
        session.set_answer(question.number(), "right").unwrap();
    }
    let submitted_at = fixed_now() + Duration::minutes(3);
    let report = session.submit_all(submitted_at).unwrap().clone();

    assert_eq!(report.total, 3);
    assert_eq!(report.correct, 3);
    assert_eq!(report.score_percent, 100.0);

    assert_eq!(recorder.answers().len(), 3);
    let summaries = recorder.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].mode, QuizMode::FullTest);
    assert_eq!(summaries[0].ended_at, submitted_at);
}

#[test]
fn exam_runs_modules_sequentially_and_aggregates() {
    let recorder = InMemoryRecorder::new();
    let config = ExamConfig::new(ModuleBudget::new(3, 120).unwrap());
    let mut session = ExamSession::new(
        vec![module("Anatomy", 5), module("Pharmacology", 5)],
        &config,
        Arc::new(recorder.clone()),
        fixed_now(),
    )
    .unwrap();

    // First module: full marks, submitted in time.
    for question in session.questions().to_vec() {
        session
            .set_answer(question.number(), "right", fixed_now())
            .unwrap();
    }
    let first_done = fixed_now() + Duration::seconds(90);
    session.submit_module(first_done).unwrap();

    // Second module: let the clock run out with one stored answer.
    let number = session.questions()[0].number();
    session.set_answer(number, "right", first_done).unwrap();
    let late = first_done + Duration::seconds(121);
    let result = session.submit_module(late).unwrap().clone();
    assert_eq!(result.correct, 1);
    assert_eq!(result.time_spent_secs, 120);

    let report = session.finish(late).unwrap().clone();
    assert_eq!(report.total_questions, 6);
    assert_eq!(report.total_correct, 4);

    let summaries = recorder.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].mode, QuizMode::Exam);
    assert_eq!(
        summaries[0].modules,
        vec!["Anatomy".to_owned(), "Pharmacology".to_owned()]
    );
    assert_eq!(recorder.answers().len(), 4);
}
