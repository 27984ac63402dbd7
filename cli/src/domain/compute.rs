//! Provider value types exchanged with the compute API port.
//!
//! Field names follow the Compute Engine v1 JSON schema (camelCase on the
//! wire). Only the fields this crate reads are modelled.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::domain::error::CloudError;
use crate::domain::instance::resource_name;

/// Label and network tag carried by every Outline server VM.
pub const OUTLINE_LABEL: &str = "outline";

/// Name of the project-wide firewall rule opening the server's ports.
pub const FIREWALL_NAME: &str = "outline";

// ── Instances ─────────────────────────────────────────────────────────────────

/// A Compute Engine VM instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    /// Provider-assigned numeric id, serialised as a string.
    pub id: String,
    pub name: String,
    /// Zone URL.
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
    #[serde(default)]
    pub creation_timestamp: Option<DateTime<FixedOffset>>,
}

impl Instance {
    /// Zone id (`us-central1-b`) extracted from the zone URL.
    #[must_use]
    pub fn zone_id(&self) -> &str {
        resource_name(&self.zone)
    }

    /// First external (NAT) address, if the instance has one.
    #[must_use]
    pub fn nat_ip(&self) -> Option<&str> {
        self.network_interfaces
            .iter()
            .flat_map(|nic| nic.access_configs.iter())
            .find_map(|ac| ac.nat_ip.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    #[serde(default)]
    pub access_configs: Vec<AccessConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfig {
    #[serde(default, rename = "natIP")]
    pub nat_ip: Option<String>,
}

/// Launch parameters for a new server VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSpec {
    /// Machine type name, e.g. `"e2-small"`.
    pub machine_type: String,
    /// Boot image URL.
    pub source_image: String,
    /// Network tags (firewall targets).
    pub tags: Vec<String>,
    pub labels: BTreeMap<String, String>,
    /// Instance metadata items (`startup-script`, `enable-guest-attributes`).
    pub metadata: BTreeMap<String, String>,
    pub description: String,
}

// ── Static IPs ────────────────────────────────────────────────────────────────

/// A reserved regional address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticIp {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: Option<String>,
}

// ── Firewalls ─────────────────────────────────────────────────────────────────

/// An existing firewall rule. Only its presence matters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Firewall {
    pub name: String,
}

/// Ingress rule allowing all TCP/UDP ports to tagged instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallSpec {
    pub name: String,
    pub target_tag: String,
    pub source_range: String,
}

impl FirewallSpec {
    /// The rule every Outline server depends on.
    #[must_use]
    pub fn outline() -> Self {
        Self {
            name: FIREWALL_NAME.to_string(),
            target_tag: OUTLINE_LABEL.to_string(),
            source_range: "0.0.0.0/0".to_string(),
        }
    }
}

// ── Operations ────────────────────────────────────────────────────────────────

/// A long-running provider operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub status: String,
    /// Id of the resource the operation acts on.
    #[serde(default)]
    pub target_id: Option<String>,
    /// Zone URL, for zonal operations.
    #[serde(default)]
    pub zone: Option<String>,
    /// Region URL, for regional operations.
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub error: Option<OperationErrors>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationErrors {
    #[serde(default)]
    pub errors: Vec<OperationErrorItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationErrorItem {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Where an operation lives, which decides its `wait` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationScope {
    Zone(String),
    Region(String),
    Global,
}

impl Operation {
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == "DONE"
    }

    #[must_use]
    pub fn scope(&self) -> OperationScope {
        if let Some(zone) = &self.zone {
            OperationScope::Zone(resource_name(zone).to_string())
        } else if let Some(region) = &self.region {
            OperationScope::Region(resource_name(region).to_string())
        } else {
            OperationScope::Global
        }
    }

    /// Turn an error payload into [`CloudError::Operation`].
    ///
    /// # Errors
    ///
    /// Returns an error if the finished operation carries any error items.
    pub fn into_result(self) -> Result<Self, CloudError> {
        match &self.error {
            Some(errors) if !errors.errors.is_empty() => Err(CloudError::Operation {
                operation: self.name.clone(),
                message: errors
                    .errors
                    .iter()
                    .map(|e| format!("{}: {}", e.code, e.message))
                    .collect::<Vec<_>>()
                    .join("; "),
            }),
            _ => Ok(self),
        }
    }
}

// ── Billing ───────────────────────────────────────────────────────────────────

/// Estimated monthly cost. Never populated for this provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyCost {
    pub usd: f64,
}

/// Monthly data-transfer allowance. Never populated for this provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataAmount {
    pub terabytes: f64,
}
