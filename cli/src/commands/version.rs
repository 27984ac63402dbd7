//! Version command

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;

/// Run the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    let version = env!("CARGO_PKG_VERSION");
    if app.is_json() {
        app.output
            .print_json(&serde_json::json!({ "version": version }))?;
    } else {
        println!("outline-gcp {version}");
    }
    Ok(ExitCode::SUCCESS)
}
