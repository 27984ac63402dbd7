//! Guest attributes published by the server VM.
//!
//! The startup script writes these under the `outline/` namespace; the
//! management plane reads them back through the compute API without any
//! network access to the guest.

use std::collections::BTreeMap;
use std::fmt;

/// Guest attribute namespace queried on every poll.
pub const NAMESPACE: &str = "outline/";

/// Attribute keys the install tracker reacts to.
pub mod keys {
    /// Present once the VM has booted and the startup script is running.
    pub const OUTLINE: &str = "outline";
    /// SHA-256 fingerprint of the management API's self-signed certificate.
    pub const CERT_SHA256: &str = "certSha256";
    /// Management API URL, published after installation.
    pub const API_URL: &str = "apiUrl";
    /// Installation failure message.
    pub const INSTALL_ERROR: &str = "install-error";
}

/// One snapshot of the guest attribute bag. Never cached or merged across polls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestAttributes(BTreeMap<String, String>);

impl GuestAttributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GuestAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Certificate fingerprint as published in `certSha256`.
///
/// Hex digests are normalised to lowercase with separators removed; any other
/// non-empty value is kept verbatim for the trust store to interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertFingerprint(String);

impl CertFingerprint {
    /// Parse a `certSha256` attribute value. Returns `None` when blank.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let hex: String = raw.chars().filter(|c| *c != ':').collect();
        if !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Some(Self(hex.to_ascii_lowercase()));
        }
        Some(Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CertFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
