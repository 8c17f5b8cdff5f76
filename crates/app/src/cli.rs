use std::path::PathBuf;

use clap::{Parser, Subcommand};
use course_core::model::{ChapterId, ContentId, CourseId, QuizId};
use services::ConfigOverrides;

/// Follow course progress and take timed quizzes from the terminal.
#[derive(Debug, Parser)]
#[command(name = "campus", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file (defaults to <config dir>/campus/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Root of the REST API
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token for user-scoped requests
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show overall progress and the chapter outline of a course
    Progress { course: CourseId },

    /// Mark one content item as done
    Complete {
        course: CourseId,
        chapter: ChapterId,
        content: ContentId,
    },

    /// Rate a course once, from 1 to 5 stars
    Rate {
        course: CourseId,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        stars: u8,
    },

    /// Download the completion certificate as a PDF
    Certificate {
        course: CourseId,
        /// Where to write the PDF
        #[arg(short, long, default_value = "certificate.pdf")]
        out: PathBuf,
    },

    /// Take a timed quiz interactively
    Quiz { course: CourseId, quiz: QuizId },

    /// Show who the configured token belongs to
    Whoami,
}

impl Cli {
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.api_url.clone(),
            token: self.token.clone(),
            timeout_secs: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_ids_and_global_flags() {
        let cli = Cli::try_parse_from([
            "campus", "complete", "7", "2", "15", "--api-url", "http://h/api",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Command::Complete { course, chapter, content }
                if course == CourseId::new(7)
                    && chapter == ChapterId::new(2)
                    && content == ContentId::new(15)
        ));
        assert_eq!(cli.overrides().base_url.as_deref(), Some("http://h/api"));
    }

    #[test]
    fn rejects_out_of_range_stars() {
        assert!(Cli::try_parse_from(["campus", "rate", "7", "6"]).is_err());
        assert!(Cli::try_parse_from(["campus", "rate", "7", "5"]).is_ok());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
