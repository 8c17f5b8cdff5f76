use anyhow::Context;
use clap::Parser;
use services::{AppServices, ClientConfig, Clock, MarkOutcome};
use tracing_subscriber::EnvFilter;

mod cli;
mod quiz_loop;
mod render;

use cli::{Cli, Command};

/// Logs go to stderr so they never interleave with quiz text on stdout.
fn init_log() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_log();
    let args = Cli::parse();

    let mut config = ClientConfig::load(args.config.as_deref()).context("failed to load config")?;
    config.apply_overrides(&args.overrides());
    tracing::debug!(?config, "configuration resolved");

    let services = AppServices::from_config(&config, Clock::default())
        .context("failed to set up backend client")?;
    let courses = services.courses();

    match args.command {
        Command::Progress { course } => {
            let view = courses.load(course).await?;
            print!("{}", render::course(&view));
        }
        Command::Complete {
            course,
            chapter,
            content,
        } => {
            let mut view = courses.load(course).await?;
            match courses
                .mark_content_complete(&mut view, chapter, content)
                .await?
            {
                MarkOutcome::Completed | MarkOutcome::Stale => {
                    println!("Marked content {content} as done.");
                }
                MarkOutcome::AlreadyCompleted => {
                    println!("Content {content} was already done.");
                }
            }
            courses.reload(&mut view).await?;
            print!("{}", render::course(&view));
        }
        Command::Rate { course, stars } => {
            let mut view = courses.load(course).await?;
            courses.rate(&mut view, stars).await?;
            println!("Thanks, you rated \"{}\" {stars}/5.", view.course().title);
        }
        Command::Certificate { course, out } => {
            let view = courses.load(course).await?;
            let pdf = courses.download_certificate(&view).await?;
            tokio::fs::write(&out, &pdf)
                .await
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Certificate saved to {}.", out.display());
        }
        Command::Quiz { course, quiz } => {
            let view = courses.load(course).await?;
            let quiz_id = view.open_quiz(quiz)?.id;
            let quizzes = services.quizzes();
            let mut runner = quizzes.start(quiz_id).await;
            quiz_loop::run(&quizzes, &mut runner).await?;
        }
        Command::Whoami => match services.current_user() {
            Some(user) => println!("{} ({:?}, id {})", user.name, user.role, user.id),
            None => println!("No valid token configured."),
        },
    }
    Ok(())
}
