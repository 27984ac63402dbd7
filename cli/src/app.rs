//! Application context — unified state passed to every command handler.
//!
//! Built once in `Cli::run()` from the global flags. Command handlers get
//! their config, compute client, and trust store from here.

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::OutlineConfig;
use crate::infra::compute::{COMPUTE_BASE_URL, GceComputeClient};
use crate::infra::config::YamlConfigStore;
use crate::infra::trust::YamlTrustStore;
use crate::output::OutputContext;

/// Environment variable overriding the Compute Engine endpoint.
pub const COMPUTE_URL_ENV: &str = "OUTLINE_GCP_COMPUTE_URL";

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Command-line overrides for Google Cloud settings.
#[derive(Default)]
pub struct GcpFlags {
    pub project: Option<String>,
    pub zone: Option<String>,
    pub access_token: Option<String>,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    pub gcp: GcpFlags,
    /// Skip interactive prompts (also set by `CI` / `OUTLINE_GCP_YES`).
    pub yes: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode, JSON).
    pub output: OutputContext,
    /// Configuration file store.
    pub config_store: YamlConfigStore,
    /// When `true`, skip interactive prompts and use defaults.
    pub non_interactive: bool,
    gcp: GcpFlags,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: AppFlags) -> Self {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("OUTLINE_GCP_YES").is_ok();
        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet, flags.output.json),
            config_store: YamlConfigStore,
            non_interactive: flags.yes || ci_env,
            gcp: flags.gcp,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.output.json
    }

    /// Stored configuration with `--project` / `--zone` applied on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or an override is
    /// invalid.
    pub fn config(&self) -> Result<OutlineConfig> {
        let mut config = self.config_store.load()?;
        if let Some(project) = &self.gcp.project {
            config.set("gcp.project", project).context("invalid --project")?;
        }
        if let Some(zone) = &self.gcp.zone {
            config.set("gcp.zone", zone).context("invalid --zone")?;
        }
        Ok(config)
    }

    /// Project id to operate on.
    ///
    /// # Errors
    ///
    /// Returns an error if no project is configured.
    pub fn project_id(config: &OutlineConfig) -> Result<String> {
        if config.gcp.project.is_empty() {
            anyhow::bail!(
                "no Google Cloud project configured.\n\nPass --project, set GCP_PROJECT, or run: outline-gcp config set gcp.project <id>"
            );
        }
        Ok(config.gcp.project.clone())
    }

    /// Compute Engine client authenticated with the access token.
    ///
    /// # Errors
    ///
    /// Returns an error if no access token was supplied.
    pub fn compute_client(&self) -> Result<GceComputeClient> {
        let token = self
            .gcp
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .context(
                "no access token.\n\nPass --access-token or set GCP_ACCESS_TOKEN, e.g.\n  export GCP_ACCESS_TOKEN=$(gcloud auth print-access-token)",
            )?;
        let base_url =
            std::env::var(COMPUTE_URL_ENV).unwrap_or_else(|_| COMPUTE_BASE_URL.to_string());
        GceComputeClient::with_base_url(&base_url, token.trim())
    }

    /// Certificate trust store at its default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn trust_store(&self) -> Result<YamlTrustStore> {
        YamlTrustStore::new()
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true`, returns `default` immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}
