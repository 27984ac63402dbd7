//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, or `reqwest`. All error types implement
//! `thiserror::Error` and convert to `anyhow::Error` via the `?` operator.

use thiserror::Error;

// ── Cloud errors ──────────────────────────────────────────────────────────────

/// Failures reported by the compute API port.
///
/// `Clone` so a single failure can be observed by every flow awaiting a
/// shared readiness future.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloudError {
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("compute API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("operation {operation} failed: {message}")]
    Operation { operation: String, message: String },

    #[error("cannot reach compute API: {0}")]
    Transport(String),

    #[error("unexpected compute API response: {0}")]
    Decode(String),
}

impl CloudError {
    /// Shorthand for a [`CloudError::NotFound`] naming `resource`.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// `true` when the resource does not exist (HTTP 404).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ── Install errors ────────────────────────────────────────────────────────────

/// Reasons `wait_on_install` gives up on a server.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("server installation failed: instance was not created")]
    CreationFailed(#[source] CloudError),

    #[error("server installation failed: {reason}")]
    Failed { reason: String },

    #[error("server was deleted before installation completed")]
    Deleted,
}

impl InstallError {
    /// `true` for the installation-failed kinds, `false` for a deleted server.
    #[must_use]
    pub fn is_install_failed(&self) -> bool {
        matches!(self, Self::CreationFailed(_) | Self::Failed { .. })
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{hint}")]
    InvalidValue {
        key: String,
        value: String,
        hint: String,
    },
}
