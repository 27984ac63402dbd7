//! YAML-file certificate trust store implementing the `CertificateTrust` port.
//!
//! Maps server ids to the SHA-256 fingerprint of their management API
//! certificate, recorded when installation completes.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::ports::CertificateTrust;
use crate::domain::CertFingerprint;

/// One trusted certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedCertificate {
    pub sha256: String,
    pub trusted_at: DateTime<Utc>,
}

/// Trust store backed by `~/.outline-gcp/trusted_certificates.yaml`.
pub struct YamlTrustStore {
    path: PathBuf,
}

impl YamlTrustStore {
    /// Trust store at the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(
            super::fs::data_dir()?.join("trusted_certificates.yaml"),
        ))
    }

    /// Trust store with an explicit path (used in tests).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// All trusted certificates keyed by server id.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<BTreeMap<String, TrustedCertificate>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))
    }

    /// Fingerprint trusted for `server_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn fingerprint(&self, server_id: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(server_id).map(|cert| cert.sha256))
    }

    /// Drop the entry for a deleted server. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn forget(&self, server_id: &str) -> Result<bool> {
        let mut entries = self.load()?;
        if entries.remove(server_id).is_none() {
            return Ok(false);
        }
        self.save(&entries)?;
        Ok(true)
    }

    fn save(&self, entries: &BTreeMap<String, TrustedCertificate>) -> Result<()> {
        let content = serde_yaml::to_string(entries).context("cannot serialize trust store")?;
        super::fs::write_private(&self.path, &content)
    }
}

impl CertificateTrust for YamlTrustStore {
    fn trust_certificate(&self, server_id: &str, fingerprint: &CertFingerprint) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(
            server_id.to_string(),
            TrustedCertificate {
                sha256: fingerprint.as_str().to_string(),
                trusted_at: Utc::now(),
            },
        );
        self.save(&entries)?;
        tracing::debug!(server = server_id, path = %self.path.display(), "certificate trusted");
        Ok(())
    }
}
