use crate::demo::{run_classify, run_demo, run_export, ClassifyArgs, ExportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use potability::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Water Potability Screener",
    about = "Validate, score, and export drinking water quality readings",
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
    /// Validate and score one sample from form fields or a dataset
    Classify(ClassifyArgs),
    /// Write a dataset out as a labelled CSV file
    Export(ExportArgs),
    /// Run both input modes end to end on built-in data
    Demo,
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
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Classify(args) => run_classify(args).await,
        Command::Export(args) => run_export(args).await,
        Command::Demo => run_demo().await,
    }
}
