//! `outline-gcp wait <name>` — follow an existing server's installation.

use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::{CertificateTrust, ComputeApi};
use crate::application::services::lifecycle::GcpServer;
use crate::application::services::provision;
use crate::commands::server_view;
use crate::output::progress;

/// Arguments for the wait command.
#[derive(Args)]
pub struct WaitArgs {
    /// Server (instance) name
    pub name: String,
}

/// Run `outline-gcp wait <name>`.
///
/// # Errors
///
/// Returns an error if the server cannot be found or the provider fails.
pub async fn run(app: &AppContext, args: &WaitArgs) -> Result<ExitCode> {
    let config = app.config()?;
    let project_id = AppContext::project_id(&config)?;
    let client = Rc::new(app.compute_client()?);
    let server = provision::find_server(
        client,
        &project_id,
        &args.name,
        config.install.poll_interval(),
    )
    .await
    .with_context(|| format!("cannot list servers in project {project_id}"))?
    .with_context(|| format!("no Outline server named {} in project {project_id}", args.name))?;

    // Creation may have been interrupted before the address was promoted.
    if let Err(err) = server.ensure_static_ip().await {
        tracing::warn!(instance = %server.name(), error = %err, "cannot reserve static IP");
        app.output
            .warn(&format!("Could not reserve a static IP for {}: {err}", server.name()));
    }

    let trust = app.trust_store()?;
    track_install(app, &server, &trust).await
}

/// Show install progress until `server` completes, fails, or Ctrl-C.
///
/// # Errors
///
/// Returns an error if the result cannot be printed.
pub async fn track_install<C: ComputeApi>(
    app: &AppContext,
    server: &GcpServer<C>,
    trust: &impl CertificateTrust,
) -> Result<ExitCode> {
    let bar = app
        .output
        .show_progress()
        .then(|| progress::install_bar(&format!("Installing Outline on {}", server.name())));
    if let Some(pb) = &bar {
        let pb = pb.clone();
        server.set_progress_listener(move |fraction| progress::set_fraction(&pb, fraction));
    }

    let outcome = tokio::select! {
        result = server.wait_on_install(trust) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    match outcome {
        Some(Ok(())) => {
            if let Some(pb) = &bar {
                progress::finish_ok(pb, &format!("Outline installed on {}", server.name()));
            }
            render_installed(app, server)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Err(err)) => {
            if let Some(pb) = &bar {
                progress::finish_error(pb, &format!("{} did not install", server.name()));
            }
            tracing::debug!(instance = %server.name(), state = %server.install_state(), "install wait ended");
            let code = if err.is_install_failed() { "INSTALL_FAILED" } else { "SERVER_DELETED" };
            app.output.error(&err.to_string(), code);
            if err.is_install_failed() {
                app.output
                    .info(&format!("Remove it with: outline-gcp delete {}", server.name()));
            }
            Ok(ExitCode::FAILURE)
        }
        None => {
            if let Some(pb) = &bar {
                progress::finish_error(pb, "interrupted");
            }
            app.output
                .warn("Stopped waiting. The server keeps installing in the cloud.");
            app.output.info(&format!(
                "Resume with: outline-gcp wait {0}\n    Remove with: outline-gcp delete {0}",
                server.name()
            ));
            Ok(ExitCode::from(130))
        }
    }
}

fn render_installed<C: ComputeApi>(app: &AppContext, server: &GcpServer<C>) -> Result<()> {
    if app.is_json() {
        return app.output.print_json(&server_view(server));
    }
    app.output.success(&format!("{} is ready", server.name()));
    app.output.kv("Id:", server.id());
    app.output.kv("Zone:", server.zone());
    if let Some(url) = server.management_api_url() {
        app.output.kv("Management API:", &url);
    }
    if let Some(fp) = server.cert_fingerprint() {
        app.output.kv("Certificate SHA-256:", fp.as_str());
    }
    if let (Some(url), Some(fp), false) = (
        server.management_api_url(),
        server.cert_fingerprint(),
        app.output.quiet,
    ) {
        app.output
            .info("Paste this into Outline Manager to manage the server:");
        println!("    {}", serde_json::json!({ "apiUrl": url, "certSha256": fp.as_str() }));
    }
    Ok(())
}
