//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::PathBuf;

use anyhow::Result;

use crate::domain::compute::{Firewall, FirewallSpec, Instance, InstanceSpec, Operation, StaticIp};
use crate::domain::config::OutlineConfig;
use crate::domain::{CertFingerprint, CloudError, GuestAttributes, InstanceLocator, RegionLocator};

// ── Compute Port ──────────────────────────────────────────────────────────────

/// Compute Engine operations the lifecycle needs.
///
/// A missing resource must surface as [`CloudError::NotFound`] so callers can
/// tell absence apart from every other failure.
#[allow(async_fn_in_trait)]
pub trait ComputeApi {
    /// Fetch one instance.
    async fn get_instance(&self, locator: &InstanceLocator) -> Result<Instance, CloudError>;
    /// Start creating an instance; completion is tracked through the operation.
    async fn insert_instance(
        &self,
        locator: &InstanceLocator,
        spec: &InstanceSpec,
    ) -> Result<Operation, CloudError>;
    /// Start deleting an instance.
    async fn delete_instance(&self, locator: &InstanceLocator) -> Result<Operation, CloudError>;
    /// All instances in the project carrying `label=true`, across zones.
    async fn list_instances(&self, project_id: &str, label: &str)
    -> Result<Vec<Instance>, CloudError>;

    /// Fetch a reserved address by name.
    async fn get_static_ip(&self, region: &RegionLocator, name: &str)
    -> Result<StaticIp, CloudError>;
    /// Reserve `address` under `name`.
    async fn insert_static_ip(
        &self,
        region: &RegionLocator,
        name: &str,
        address: &str,
    ) -> Result<Operation, CloudError>;
    /// Release a reserved address.
    async fn delete_static_ip(
        &self,
        region: &RegionLocator,
        name: &str,
    ) -> Result<Operation, CloudError>;

    /// Fetch a firewall rule by name.
    async fn get_firewall(&self, project_id: &str, name: &str) -> Result<Firewall, CloudError>;
    /// Create a firewall rule.
    async fn insert_firewall(
        &self,
        project_id: &str,
        spec: &FirewallSpec,
    ) -> Result<Operation, CloudError>;

    /// Guest attributes published under `namespace` (e.g. `"outline/"`).
    async fn guest_attributes(
        &self,
        locator: &InstanceLocator,
        namespace: &str,
    ) -> Result<GuestAttributes, CloudError>;

    /// Block (server-side) until `operation` finishes or the provider's wait
    /// deadline passes; returns the latest operation status.
    async fn wait_operation(
        &self,
        project_id: &str,
        operation: &Operation,
    ) -> Result<Operation, CloudError>;
}

/// Fetches the current guest attribute bag of one server.
#[allow(async_fn_in_trait)]
pub trait GuestAttributeSource {
    async fn fetch_guest_attributes(&self) -> Result<GuestAttributes, CloudError>;
}

// ── Trust Port ────────────────────────────────────────────────────────────────

/// Records a server's certificate fingerprint as trusted for later
/// connections to its management API.
pub trait CertificateTrust {
    /// # Errors
    ///
    /// Returns an error if the fingerprint cannot be recorded.
    fn trust_certificate(&self, server_id: &str, fingerprint: &CertFingerprint) -> Result<()>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load configuration, returning defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<OutlineConfig>;
    /// Persist configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, config: &OutlineConfig) -> Result<()>;
    /// Location of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}
