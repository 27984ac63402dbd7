//! Domain types and validators for outline-gcp configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::instance::region_of;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "gcp.project",
    "gcp.zone",
    "gcp.machine_type",
    "install.poll_interval_secs",
];

const DEFAULT_ZONE: &str = "us-central1-b";
const DEFAULT_MACHINE_TYPE: &str = "e2-small";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.outline-gcp/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutlineConfig {
    /// Google Cloud placement.
    #[serde(default)]
    pub gcp: GcpConfig,
    /// Install tracking.
    #[serde(default)]
    pub install: InstallConfig,
}

/// Google Cloud placement settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GcpConfig {
    /// Project id. Empty means "must be given on the command line".
    pub project: String,
    /// Zone new servers are created in.
    pub zone: String,
    /// Machine type for new servers.
    pub machine_type: String,
}

impl Default for GcpConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            zone: DEFAULT_ZONE.to_string(),
            machine_type: DEFAULT_MACHINE_TYPE.to_string(),
        }
    }
}

/// Install tracking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Seconds between guest attribute polls.
    pub poll_interval_secs: u64,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl InstallConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl OutlineConfig {
    /// Current value of `key` rendered as a string, or `None` for unknown keys.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "gcp.project" => Some(self.gcp.project.clone()),
            "gcp.zone" => Some(self.gcp.zone.clone()),
            "gcp.machine_type" => Some(self.gcp.machine_type.clone()),
            "install.poll_interval_secs" => Some(self.install.poll_interval_secs.to_string()),
            _ => None,
        }
    }

    /// Validate and apply `key = value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "gcp.project" => self.gcp.project = value.to_string(),
            "gcp.zone" => self.gcp.zone = value.to_string(),
            "gcp.machine_type" => self.gcp.machine_type = value.to_string(),
            "install.poll_interval_secs" => {
                self.install.poll_interval_secs = value.parse()?;
            }
            _ => anyhow::bail!("Unknown setting: {key}"),
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let hint = match key {
        "gcp.project" if !is_project_id(value) => {
            "Project ids are 6-30 lowercase letters, digits or hyphens, starting with a letter."
        }
        "gcp.zone" if !is_zone_id(value) => "Zones look like us-central1-b.",
        "gcp.machine_type" if value.is_empty() || value.contains(char::is_whitespace) => {
            "Machine types look like e2-small."
        }
        "install.poll_interval_secs" if value.parse::<u64>().map_or(true, |v| v == 0) => {
            "Poll interval must be a positive number of seconds."
        }
        _ => return Ok(()),
    };
    Err(ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        hint: hint.to_string(),
    }
    .into())
}

fn is_project_id(value: &str) -> bool {
    (6..=30).contains(&value.len())
        && value.starts_with(|c: char| c.is_ascii_lowercase())
        && !value.ends_with('-')
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn is_zone_id(value: &str) -> bool {
    let region = region_of(value);
    region != value
        && region.contains('-')
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

// ── Unit tests ───────────────────────────────────────────────────────────────
