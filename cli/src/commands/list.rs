//! `outline-gcp list` — list Outline servers with their install state.

use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{Context, Result};
use owo_colors::OwoColorize as _;

use crate::app::AppContext;
use crate::application::services::provision;
use crate::commands::server_view;

/// Run `outline-gcp list`.
///
/// # Errors
///
/// Returns an error if the project cannot be listed.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.config()?;
    let project_id = AppContext::project_id(&config)?;
    let client = Rc::new(app.compute_client()?);
    let servers = provision::list_servers(client, &project_id, config.install.poll_interval())
        .await
        .with_context(|| format!("cannot list servers in project {project_id}"))?;

    for server in &servers {
        if let Err(err) = server.refresh_install_state().await {
            tracing::warn!(instance = %server.name(), error = %err, "cannot read install state");
        }
    }

    if app.is_json() {
        let views: Vec<_> = servers.iter().map(server_view).collect();
        app.output.print_json(&views)?;
        return Ok(ExitCode::SUCCESS);
    }

    if servers.is_empty() {
        app.output
            .info(&format!("No Outline servers in project {project_id}."));
        return Ok(ExitCode::SUCCESS);
    }

    app.output.header(&format!("Outline servers in {project_id}"));
    if !app.output.quiet {
        for server in &servers {
            let state = server.install_state();
            println!(
                "  {:<24} {:<20} {:<16} {}",
                server.name(),
                server.id().style(app.output.styles.dim),
                server.zone(),
                state.to_string().style(app.output.styles.state(state)),
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}
