//! Interactive terminal loop for one quiz attempt.

use anyhow::Context;
use course_core::attempt::Tick;
use course_core::time::format_countdown;
use services::{Countdown, QuizPhase, QuizRunner, QuizService};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::render;

const HELP: &str = "\
Commands:
  1..9     select an option on the current question
  n / p    next / previous question
  g <i>    go to question i
  f        flag or unflag the current question
  s        submit your answers
  q        leave without submitting
  h        show this help";

/// One line of learner input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Select(usize),
    Next,
    Previous,
    GoTo(usize),
    Flag,
    Submit,
    Quit,
    Help,
    Unknown,
}

impl Input {
    fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (Some("n"), None) => Self::Next,
            (Some("p"), None) => Self::Previous,
            (Some("f"), None) => Self::Flag,
            (Some("s"), None) => Self::Submit,
            (Some("q"), None) => Self::Quit,
            (Some("h" | "?"), None) => Self::Help,
            (Some("g"), Some(raw)) => match raw.parse::<usize>() {
                Ok(position) if position > 0 => Self::GoTo(position - 1),
                _ => Self::Unknown,
            },
            (Some(raw), None) => match raw.parse::<usize>() {
                Ok(option) if option > 0 => Self::Select(option - 1),
                _ => Self::Unknown,
            },
            _ => Self::Unknown,
        }
    }
}

type InputLines = Lines<BufReader<Stdin>>;

/// Run the attempt until it is submitted or abandoned.
///
/// The countdown keeps running while waiting for input; when it reaches zero
/// the attempt is submitted with the answers recorded so far.
pub async fn run(quizzes: &QuizService, runner: &mut QuizRunner) -> anyhow::Result<()> {
    let Some(session) = runner.session() else {
        anyhow::bail!(
            "quiz {} could not be loaded: {}",
            runner.quiz_id(),
            runner.failure().unwrap_or("unknown error")
        );
    };
    println!(
        "{} ({} questions, {} to answer)",
        session.quiz().title,
        session.total_questions(),
        format_countdown(session.remaining_secs())
    );
    println!("{HELP}");
    print!("{}", render::question(session));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut countdown = Countdown::new();

    while runner.phase() == QuizPhase::InProgress {
        tokio::select! {
            () = countdown.beat() => {
                match quizzes.tick(runner).await? {
                    Tick::Running { remaining_secs } => {
                        if remaining_secs % 60 == 0 || remaining_secs <= 10 {
                            println!("{} left", format_countdown(remaining_secs));
                        }
                    }
                    Tick::Expired(outcome) => {
                        println!("\nTime is up, your answers were submitted.");
                        print!("{}", render::outcome(&outcome));
                    }
                    Tick::Idle => {}
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    println!("Input closed, leaving the quiz without submitting.");
                    return Ok(());
                };
                if !handle(quizzes, runner, Input::parse(&line)).await? {
                    println!("Left the quiz without submitting.");
                    return Ok(());
                }
            }
        }
    }

    report_persistence(runner);
    offer_review(runner, &mut lines).await
}

/// Apply one input. Returns false when the learner quits.
async fn handle(
    quizzes: &QuizService,
    runner: &mut QuizRunner,
    input: Input,
) -> anyhow::Result<bool> {
    if input == Input::Submit {
        let outcome = quizzes.submit(runner).await?;
        print!("{}", render::outcome(&outcome));
        return Ok(true);
    }

    let Some(session) = runner.session_mut() else {
        return Ok(false);
    };
    match input {
        Input::Select(option) => {
            if let Err(err) = session.select_current(option) {
                println!("{err}");
            }
        }
        Input::Next => {
            session.go_next();
        }
        Input::Previous => {
            session.go_previous();
        }
        Input::GoTo(index) => {
            session.go_to(index);
        }
        Input::Flag => {
            if let Some(id) = session.current_question().map(|q| q.id) {
                session.toggle_flag(id)?;
            }
        }
        Input::Quit => return Ok(false),
        Input::Help => println!("{HELP}"),
        Input::Unknown => println!("Unknown command, type h for help."),
        Input::Submit => {}
    }
    print!("{}", render::question(session));
    Ok(true)
}

fn report_persistence(runner: &QuizRunner) {
    if runner.persistence().is_failed() {
        println!("Your score could not be saved; it is shown here only.");
    }
}

async fn offer_review(runner: &mut QuizRunner, lines: &mut InputLines) -> anyhow::Result<()> {
    println!("Type r to review your answers, or press Enter to finish.");
    let Some(line) = lines.next_line().await.context("failed to read input")? else {
        return Ok(());
    };
    if line.trim() != "r" {
        return Ok(());
    }
    let Some(session) = runner.session_mut() else {
        return Ok(());
    };
    session.set_review_mode(true)?;
    print!("{}", render::review(&session.review()?));
    Ok(())
}
