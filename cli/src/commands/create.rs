//! `outline-gcp create <name>` — provision a server and wait for Outline.

use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::services::provision::{self, CreateServerRequest};
use crate::assets::STARTUP_SCRIPT;
use crate::commands::{server_view, wait::track_install};
use crate::output::{TerminalReporter, progress};

/// Arguments for the create command.
#[derive(Args)]
pub struct CreateArgs {
    /// Server (instance) name: lowercase letters, digits and hyphens
    pub name: String,

    /// Machine type (overrides gcp.machine_type)
    #[arg(long)]
    pub machine_type: Option<String>,

    /// Return once the instance runs with a static IP instead of waiting for install
    #[arg(long)]
    pub no_wait: bool,
}

/// Run `outline-gcp create <name>`.
///
/// # Errors
///
/// Returns an error if configuration is incomplete or the provider rejects
/// the request.
pub async fn run(app: &AppContext, args: &CreateArgs) -> Result<ExitCode> {
    let config = app.config()?;
    let project_id = AppContext::project_id(&config)?;
    let client = Rc::new(app.compute_client()?);
    let trust = app.trust_store()?;

    let request = CreateServerRequest {
        project_id,
        zone_id: config.gcp.zone.clone(),
        name: args.name.clone(),
        machine_type: args
            .machine_type
            .clone()
            .unwrap_or_else(|| config.gcp.machine_type.clone()),
        startup_script: STARTUP_SCRIPT.to_string(),
        poll_interval: config.install.poll_interval(),
    };
    let reporter = TerminalReporter::new(&app.output);
    let server = provision::create_server(client, &request, &reporter).await?;
    tracing::info!(instance = %server.name(), id = %server.id(), "server requested");

    if args.no_wait {
        let spinner = app
            .output
            .show_progress()
            .then(|| progress::spinner(&format!("Waiting for {} to start...", server.name())));
        let ready = server.await_ready().await;
        if let Some(pb) = &spinner {
            match &ready {
                Ok(()) => progress::finish_ok(pb, &format!("{} is running", server.name())),
                Err(_) => progress::finish_error(pb, &format!("{} did not start", server.name())),
            }
        }
        ready.with_context(|| format!("failed to create instance {}", server.name()))?;
        if app.is_json() {
            app.output.print_json(&server_view(&server))?;
        } else {
            app.output
                .success(&format!("Requested {} ({})", server.name(), server.id()));
            app.output
                .info(&format!("Follow progress with: outline-gcp wait {}", server.name()));
        }
        return Ok(ExitCode::SUCCESS);
    }

    track_install(app, &server, &trust).await
}
