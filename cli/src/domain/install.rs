//! Installation state machine: states, progress table, and the per-poll
//! decision rule.
//!
//! Pure functions only — no I/O, no async.

use std::fmt;

use serde::Serialize;

use crate::domain::attributes::{GuestAttributes, keys};

/// Installation progress of one server.
///
/// Ordered only along the happy path
/// (`Unknown → InstanceCreated → IpAllocated → Booted → HasCertificate → Success`).
/// `Error`, `Deleting` and `Deleted` are reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallState {
    Unknown,
    InstanceCreated,
    IpAllocated,
    Booted,
    HasCertificate,
    Success,
    Error,
    Deleting,
    Deleted,
}

impl InstallState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Unknown,
        Self::InstanceCreated,
        Self::IpAllocated,
        Self::Booted,
        Self::HasCertificate,
        Self::Success,
        Self::Error,
        Self::Deleting,
        Self::Deleted,
    ];

    /// The happy path, in order.
    pub const HAPPY_PATH: [Self; 6] = [
        Self::Unknown,
        Self::InstanceCreated,
        Self::IpAllocated,
        Self::Booted,
        Self::HasCertificate,
        Self::Success,
    ];

    /// `true` for `Success`, `Error` and `Deleted`.
    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Success | Self::Error | Self::Deleted)
    }

    /// `true` once a deletion has been requested.
    #[must_use]
    pub fn is_deletion(self) -> bool {
        matches!(self, Self::Deleting | Self::Deleted)
    }

    /// Fraction in `[0, 1]` shown to the user.
    ///
    /// A calibrated estimate, not a measurement. Must stay non-decreasing
    /// along [`Self::HAPPY_PATH`] so a progress bar never moves backwards.
    #[must_use]
    pub fn progress(self) -> f64 {
        match self {
            Self::Unknown => 0.005,
            Self::InstanceCreated => 0.03,
            Self::IpAllocated => 0.04,
            Self::Booted => 0.2,
            Self::HasCertificate => 0.8,
            Self::Success => 1.0,
            Self::Error | Self::Deleting | Self::Deleted => 0.0,
        }
    }
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::InstanceCreated => "instance created",
            Self::IpAllocated => "IP allocated",
            Self::Booted => "booted",
            Self::HasCertificate => "certificate generated",
            Self::Success => "installed",
            Self::Error => "error",
            Self::Deleting => "deleting",
            Self::Deleted => "deleted",
        })
    }
}

/// What one guest-attribute snapshot says about the install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallDecision {
    /// `apiUrl` and `certSha256` are both published.
    Installed { api_url: String, cert_sha256: String },
    /// The startup script reported `install-error`.
    Failed { reason: String },
    /// Only the certificate has been generated so far.
    HasCertificate,
    /// The VM booted and the startup script is running.
    Booted,
    /// Nothing published yet.
    Pending,
}

impl InstallDecision {
    /// State the tracker moves to, or `None` when no transition applies.
    #[must_use]
    pub fn target_state(&self) -> Option<InstallState> {
        match self {
            Self::Installed { .. } => Some(InstallState::Success),
            Self::Failed { .. } => Some(InstallState::Error),
            Self::HasCertificate => Some(InstallState::HasCertificate),
            Self::Booted => Some(InstallState::Booted),
            Self::Pending => None,
        }
    }
}

/// Apply the decision rule to one snapshot. First match wins:
///
/// 1. `apiUrl` + `certSha256` → installed
/// 2. `install-error` → failed
/// 3. `certSha256` → certificate generated
/// 4. `outline` → booted
/// 5. otherwise pending
#[must_use]
pub fn decide(attributes: &GuestAttributes) -> InstallDecision {
    if let (Some(api_url), Some(cert_sha256)) = (
        attributes.get(keys::API_URL),
        attributes.get(keys::CERT_SHA256),
    ) {
        return InstallDecision::Installed {
            api_url: api_url.to_string(),
            cert_sha256: cert_sha256.to_string(),
        };
    }
    if let Some(reason) = attributes.get(keys::INSTALL_ERROR) {
        return InstallDecision::Failed {
            reason: reason.to_string(),
        };
    }
    if attributes.contains(keys::CERT_SHA256) {
        return InstallDecision::HasCertificate;
    }
    if attributes.contains(keys::OUTLINE) {
        return InstallDecision::Booted;
    }
    InstallDecision::Pending
}
