use crate::dashboard::{self, AssessmentCommand, CandidateCommand, JobCommand};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use talentflow::config::AppConfig;
use talentflow::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "talentflow",
    about = "Run the TalentFlow hiring API or drive its dashboard views from the terminal",
    version
)]
struct Cli {
    /// Directory for the JSON file store (defaults to APP_DATA_DIR, else memory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Talk to a running server instead of an in-process backend
    #[arg(long, global = true)]
    remote: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// List, create, edit, archive and reorder jobs
    Jobs {
        #[command(subcommand)]
        command: JobCommand,
    },
    /// Browse candidates, move them through stages, export CSV
    Candidates {
        #[command(subcommand)]
        command: CandidateCommand,
    },
    /// Build assessments and fill them out
    Assessments {
        #[command(subcommand)]
        command: AssessmentCommand,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }
    let remote = cli.remote;
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(config, args).await,
        Command::Jobs { command } => {
            dashboard::run(config, remote, dashboard::View::Jobs(command)).await
        }
        Command::Candidates { command } => {
            dashboard::run(config, remote, dashboard::View::Candidates(command)).await
        }
        Command::Assessments { command } => {
            dashboard::run(config, remote, dashboard::View::Assessments(command)).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use talentflow::hiring::{QuestionKind, Stage};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["talentflow"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn global_flags_reach_nested_commands() {
        let cli = Cli::try_parse_from([
            "talentflow",
            "candidates",
            "stage",
            "c-1",
            "offer",
            "--remote",
            "http://127.0.0.1:3000",
        ])
        .expect("parses");
        assert_eq!(cli.remote.as_deref(), Some("http://127.0.0.1:3000"));
        match cli.command {
            Some(Command::Candidates {
                command: CandidateCommand::Stage { id, stage },
            }) => {
                assert_eq!(id, "c-1");
                assert_eq!(stage, Stage::Offer);
            }
            other => panic!("expected candidate stage command, got {other:?}"),
        }
    }

    #[test]
    fn question_kinds_parse_from_kebab_case() {
        let cli = Cli::try_parse_from([
            "talentflow",
            "assessments",
            "retype",
            "1",
            "s",
            "q",
            "multi-choice",
        ])
        .expect("parses");
        assert!(matches!(
            cli.command,
            Some(Command::Assessments {
                command: AssessmentCommand::Retype {
                    kind: QuestionKind::MultiChoice,
                    ..
                }
            })
        ));
    }

    #[test]
    fn unknown_stages_are_rejected() {
        assert!(Cli::try_parse_from(["talentflow", "candidates", "stage", "c-1", "lunch"]).is_err());
    }
}
