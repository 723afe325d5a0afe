use crate::server;
use clap::{Args, Parser, Subcommand};
use scholarship_portal::api_client::ApiClient;
use scholarship_portal::diagnostics::{check_database_status, classify, HttpDiagnosticsClient};
use scholarship_portal::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Scholarship Portal API",
    about = "Run the scholarship review API and its database diagnostics",
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
    /// Check database connectivity through a running API
    Status(StatusArgs),
    /// Explain a database driver error message
    Classify(ClassifyArgs),
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

#[derive(Args, Debug)]
pub(crate) struct StatusArgs {
    /// Base URL of the portal API
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    pub(crate) url: String,
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Error message reported by the database driver
    pub(crate) message: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Status(args) => run_status(args).await,
        Command::Classify(args) => {
            for line in classification_lines(&args.message) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

async fn run_status(args: StatusArgs) -> Result<(), AppError> {
    let client = HttpDiagnosticsClient::new(ApiClient::new(args.url)?);
    let status = check_database_status(&client).await;
    for line in status.lines() {
        println!("{line}");
    }
    Ok(())
}

fn classification_lines(message: &str) -> Vec<String> {
    let diagnosis = classify(message);
    vec![
        format!("Kind: {}", diagnosis.kind.label()),
        format!("Reason: {}", diagnosis.reason),
        format!("Action: {}", diagnosis.action),
    ]
}
