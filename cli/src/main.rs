//! outline-gcp — provision and track Outline servers on Google Compute Engine

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use outline_gcp::cli::Cli;
use outline_gcp::output::json::format_error;

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics go to stderr so stdout stays clean for --json.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            match format_error(&format!("{e:#}"), "ERROR") {
                Ok(doc) if json => eprintln!("{doc}"),
                _ => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
