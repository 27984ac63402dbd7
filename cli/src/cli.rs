//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, GcpFlags, OutputFlags};
use crate::commands;

/// Provision and track Outline servers on Google Compute Engine
#[derive(Parser)]
#[command(
    name = "outline-gcp",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Google Cloud project id (overrides gcp.project)
    #[arg(long, global = true, env = "GCP_PROJECT")]
    pub project: Option<String>,

    /// Compute Engine zone for new servers (overrides gcp.zone)
    #[arg(long, global = true, env = "GCP_ZONE")]
    pub zone: Option<String>,

    /// OAuth2 access token, e.g. from `gcloud auth print-access-token`
    #[arg(long, global = true, env = "GCP_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a server and wait for Outline to install
    Create(commands::create::CreateArgs),

    /// List Outline servers in the project
    List,

    /// Wait for an existing server to finish installing
    Wait(commands::wait::WaitArgs),

    /// Delete a server and its static IP
    Delete(commands::delete::DeleteArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            project,
            zone,
            access_token,
            command,
        } = self;
        let yes = matches!(&command, Command::Delete(args) if args.yes);
        let app = AppContext::new(AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            gcp: GcpFlags {
                project,
                zone,
                access_token,
            },
            yes,
        });
        match command {
            Command::Create(args) => commands::create::run(&app, &args).await,
            Command::List => commands::list::run(&app).await,
            Command::Wait(args) => commands::wait::run(&app, &args).await,
            Command::Delete(args) => commands::delete::run(&app, &args).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
