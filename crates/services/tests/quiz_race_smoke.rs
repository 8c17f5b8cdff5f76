use std::sync::Arc;
use std::time::Duration;

use backend::InMemoryBackend;
use course_core::attempt::{QuizSessionError, SubmitTrigger, Tick};
use course_core::model::{Question, QuestionId, Quiz, QuizId};
use course_core::time::fixed_now;
use services::{AppServices, Clock, Countdown, QuizPhase, QuizRunner, QuizServiceError};
use tokio::sync::Mutex;

fn one_minute_quiz() -> Quiz {
    Quiz {
        id: QuizId::new(11),
        title: "Final exam".into(),
        description: None,
        course_id: None,
        chapter_id: None,
        questions: vec![
            Question {
                id: QuestionId::new(1),
                text: "Which keyword moves a closure's captures?".into(),
                options: vec!["ref".into(), "move".into()],
                correct_option_index: 1,
                quiz_id: Some(QuizId::new(11)),
            },
            Question {
                id: QuestionId::new(2),
                text: "Is Rc Send?".into(),
                options: vec!["yes".into(), "no".into()],
                correct_option_index: 1,
                quiz_id: Some(QuizId::new(11)),
            },
        ],
        time_limit: Some(1),
        is_completed: false,
    }
}

async fn start() -> (InMemoryBackend, AppServices, Arc<Mutex<QuizRunner>>) {
    let backend = InMemoryBackend::new();
    backend.insert_quiz(one_minute_quiz()).unwrap();
    let services = AppServices::in_memory(backend.clone(), Clock::fixed(fixed_now()));
    let mut runner = services.quizzes().start(QuizId::new(11)).await;
    runner
        .session_mut()
        .unwrap()
        .select_answer(QuestionId::new(1), 1)
        .unwrap();
    (backend, services, Arc::new(Mutex::new(runner)))
}

fn spawn_timer(
    services: &AppServices,
    runner: &Arc<Mutex<QuizRunner>>,
) -> tokio::task::JoinHandle<Tick> {
    let quizzes = services.quizzes();
    let runner = Arc::clone(runner);
    tokio::spawn(async move {
        let mut countdown = Countdown::new();
        loop {
            countdown.beat().await;
            let mut guard = runner.lock().await;
            let tick = quizzes.tick(&mut guard).await.unwrap();
            if !matches!(tick, Tick::Running { .. }) {
                return tick;
            }
        }
    })
}

#[tokio::test(start_paused = true)]
async fn timer_expiry_wins_over_late_manual_submit() {
    let (backend, services, runner) = start().await;
    let timer = spawn_timer(&services, &runner);

    tokio::time::sleep(Duration::from_millis(60_500)).await;
    let manual = services.quizzes().submit(&mut *runner.lock().await).await;

    let Tick::Expired(outcome) = timer.await.unwrap() else {
        panic!("the countdown should have expired the attempt");
    };
    assert_eq!(outcome.trigger, SubmitTrigger::Timer);
    assert_eq!(outcome.score, 50);
    assert!(matches!(
        manual,
        Err(QuizServiceError::Session(QuizSessionError::AlreadySubmitted))
    ));

    let results = backend.results().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].time_taken_in_seconds, 60);
    assert_eq!(runner.lock().await.phase(), QuizPhase::Submitted);
}

#[tokio::test(start_paused = true)]
async fn manual_submit_stops_the_timer() {
    let (backend, services, runner) = start().await;
    let timer = spawn_timer(&services, &runner);

    tokio::time::sleep(Duration::from_millis(30_500)).await;
    let outcome = services
        .quizzes()
        .submit(&mut *runner.lock().await)
        .await
        .unwrap();

    assert_eq!(timer.await.unwrap(), Tick::Idle);
    assert_eq!(outcome.trigger, SubmitTrigger::Manual);
    assert_eq!(outcome.time_used_secs, 30);

    let results = backend.results().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 50);
}

#[tokio::test]
async fn review_is_available_after_submission() {
    let (_, services, runner) = start().await;
    let mut guard = runner.lock().await;
    services.quizzes().submit(&mut guard).await.unwrap();

    let session = guard.session_mut().unwrap();
    session.set_review_mode(true).unwrap();
    let review = session.review().unwrap();

    assert!(review[0].is_correct());
    assert!(!review[1].is_correct());
    assert_eq!(review[1].selected, None);
    let marked: Vec<_> = review[1]
        .options
        .iter()
        .filter_map(|option| option.mark)
        .collect();
    assert_eq!(marked.len(), 1);
}
