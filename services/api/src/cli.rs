use crate::demo::{run_demo, run_discrepancy_report, run_ratings_summary, DiscrepancyArgs, SummaryArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use faculty_eval::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Faculty Evaluation Service",
    about = "Serve, inspect, and reconcile student reviews of faculty from the command line",
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
    /// Offline reports over an exported review collection
    Ratings {
        #[command(subcommand)]
        command: RatingsCommand,
    },
    /// Run an end-to-end CLI demo covering intake, summaries, and reconciliation
    Demo,
}

#[derive(Subcommand, Debug)]
enum RatingsCommand {
    /// Print per-faculty rating summaries and optionally export them as CSV
    Summary(SummaryArgs),
    /// List reviews whose stored overall score drifted from the recomputed value
    Discrepancies(DiscrepancyArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON array of stored reviews to load at startup
    #[arg(long)]
    pub(crate) reviews: Option<PathBuf>,
    /// Faculty roster CSV to load at startup
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Ratings {
            command: RatingsCommand::Summary(args),
        } => run_ratings_summary(args),
        Command::Ratings {
            command: RatingsCommand::Discrepancies(args),
        } => run_discrepancy_report(args),
        Command::Demo => run_demo(),
    }
}
