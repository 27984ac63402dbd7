//! Instance locators and naming rules.
//!
//! Pure functions only — no I/O, no async.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Compute Engine resource name rule (RFC 1035 label, max 63 chars).
pub static INSTANCE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z]([-a-z0-9]{0,61}[a-z0-9])?$").expect("valid regex")
});

/// Identifies one VM. Used as the key for every provider call; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceLocator {
    pub project_id: String,
    pub zone_id: String,
    pub instance_name: String,
}

impl InstanceLocator {
    #[must_use]
    pub fn new(
        project_id: impl Into<String>,
        zone_id: impl Into<String>,
        instance_name: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            zone_id: zone_id.into(),
            instance_name: instance_name.into(),
        }
    }

    /// Region hosting this instance's zone.
    #[must_use]
    pub fn region(&self) -> RegionLocator {
        RegionLocator {
            project_id: self.project_id.clone(),
            region_id: region_of(&self.zone_id).to_string(),
        }
    }

    /// Static IPs are reserved under the instance's own name.
    #[must_use]
    pub fn static_ip_name(&self) -> &str {
        &self.instance_name
    }
}

/// Scope for regional resources such as static IPs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionLocator {
    pub project_id: String,
    pub region_id: String,
}

/// Derive the region from a zone id: `us-central1-b` → `us-central1`.
///
/// Zone ids without a suffix are returned unchanged.
#[must_use]
pub fn region_of(zone_id: &str) -> &str {
    zone_id.rsplit_once('-').map_or(zone_id, |(region, _)| region)
}

/// Last path segment of a resource URL
/// (`.../projects/p/zones/us-east1-b` → `us-east1-b`).
#[must_use]
pub fn resource_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Validates an instance name before it is sent to the provider.
///
/// # Errors
///
/// Returns an error if the name is not a valid Compute Engine resource name.
pub fn validate_instance_name(name: &str) -> Result<()> {
    if !INSTANCE_NAME_RE.is_match(name) {
        anyhow::bail!(
            "Invalid server name '{name}': must match ^[a-z]([-a-z0-9]{{0,61}}[a-z0-9])?$"
        );
    }
    Ok(())
}
