use crate::report::{run_reset, run_score, ResetArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credit_quiz::config::{AppConfig, StorageConfig};
use credit_quiz::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Credit Quiz",
    about = "Score the credit risk questionnaire and serve its gamified dashboard",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a JSON file of answers and print the breakdown
    Score(ScoreArgs),
    /// Restore the initial dashboard snapshot and clear the history log
    Reset(ResetArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) data: DataDirArg,
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct DataDirArg {
    /// Directory holding the quiz documents (overrides QUIZ_DATA_DIR and per-file paths)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

impl DataDirArg {
    pub(crate) fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.data_dir {
            config.storage = StorageConfig::in_dir(dir);
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Reset(args) => run_reset(args),
    }
}
