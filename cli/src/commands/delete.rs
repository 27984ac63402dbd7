//! `outline-gcp delete <name>` — delete a server and its static IP.

use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::services::provision;
use crate::output::progress;

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Server (instance) name
    pub name: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Run `outline-gcp delete <name>`.
///
/// # Errors
///
/// Returns an error if the server cannot be found or a provider call fails.
pub async fn run(app: &AppContext, args: &DeleteArgs) -> Result<ExitCode> {
    let config = app.config()?;
    let project_id = AppContext::project_id(&config)?;
    let client = Rc::new(app.compute_client()?);
    let Some(server) = provision::find_server(
        client,
        &project_id,
        &args.name,
        config.install.poll_interval(),
    )
    .await
    .with_context(|| format!("cannot list servers in project {project_id}"))?
    else {
        anyhow::bail!("no Outline server named {} in project {project_id}", args.name);
    };

    if !app.output.quiet {
        println!();
        println!("This will delete {} ({}) and release its static IP.", server.name(), server.zone());
        println!("Access keys on this server stop working immediately.");
        println!();
    }
    if !app.confirm("Continue?", false)? {
        app.output.info("Cancelled.");
        return Ok(ExitCode::SUCCESS);
    }

    let spinner = app
        .output
        .show_progress()
        .then(|| progress::spinner(&format!("Deleting {}...", server.name())));
    let result = server.delete().await;
    if let Some(pb) = &spinner {
        match &result {
            Ok(()) => progress::finish_ok(pb, &format!("Deleted {}", server.name())),
            Err(_) => progress::finish_error(pb, &format!("Could not delete {}", server.name())),
        }
    }
    result.with_context(|| format!("failed to delete {}", server.name()))?;

    if let Err(err) = app.trust_store().and_then(|store| store.forget(server.id())) {
        app.output
            .warn(&format!("Could not forget the server certificate: {err:#}"));
    }

    if app.is_json() {
        app.output.print_json(&serde_json::json!({
            "deleted": true,
            "id": server.id(),
            "name": server.name(),
        }))?;
    } else if spinner.is_none() {
        app.output.success(&format!("Deleted {}", server.name()));
    }
    Ok(ExitCode::SUCCESS)
}
