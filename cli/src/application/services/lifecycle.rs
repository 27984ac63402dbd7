//! Lifecycle controller: one provisioned server and its install tracker.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::rc::Rc;

use crate::application::ports::{CertificateTrust, ComputeApi, GuestAttributeSource};
use crate::application::services::install_tracker::InstallTracker;
use crate::application::services::operations::complete_operation;
use crate::application::services::provision;
use crate::domain::attributes::NAMESPACE;
use crate::domain::compute::{DataAmount, MonthlyCost};
use crate::domain::{
    CertFingerprint, CloudError, GuestAttributes, InstallError, InstallState, InstanceLocator,
};

/// An Outline server hosted on a Compute Engine instance.
pub struct GcpServer<C> {
    id: String,
    locator: InstanceLocator,
    client: Rc<C>,
    tracker: InstallTracker,
}

impl<C: ComputeApi> GcpServer<C> {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        locator: InstanceLocator,
        client: Rc<C>,
        tracker: InstallTracker,
    ) -> Self {
        Self {
            id: id.into(),
            locator,
            client,
            tracker,
        }
    }

    /// Provider-assigned instance id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.locator.instance_name
    }

    /// Zone hosting the instance, e.g. `us-central1-b`.
    #[must_use]
    pub fn zone(&self) -> &str {
        &self.locator.zone_id
    }

    #[must_use]
    pub fn locator(&self) -> &InstanceLocator {
        &self.locator
    }

    /// Always `None`: the provider exposes no billing data for the instance.
    #[must_use]
    pub fn monthly_cost(&self) -> Option<MonthlyCost> {
        None
    }

    /// Always `None`: the provider meters egress without a fixed allowance.
    #[must_use]
    pub fn data_transfer_limit(&self) -> Option<DataAmount> {
        None
    }

    /// Management API URL published by the server once installed.
    #[must_use]
    pub fn management_api_url(&self) -> Option<String> {
        self.tracker.api_url()
    }

    #[must_use]
    pub fn cert_fingerprint(&self) -> Option<CertFingerprint> {
        self.tracker.cert_fingerprint()
    }

    #[must_use]
    pub fn install_state(&self) -> InstallState {
        self.tracker.install_state()
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.tracker.progress()
    }

    #[must_use]
    pub fn is_install_completed(&self) -> bool {
        self.tracker.is_install_completed()
    }

    pub fn set_progress_listener(&self, listener: impl Fn(f64) + 'static) {
        self.tracker.set_progress_listener(listener);
    }

    #[must_use]
    pub fn tracker(&self) -> &InstallTracker {
        &self.tracker
    }

    /// Wait for the server to finish installing, trusting its certificate
    /// through `trust` on success.
    ///
    /// # Errors
    ///
    /// See [`InstallTracker::wait_on_install`].
    pub async fn wait_on_install(&self, trust: &impl CertificateTrust) -> Result<(), InstallError> {
        let source = InstanceAttributes {
            client: self.client.as_ref(),
            locator: &self.locator,
        };
        self.tracker.wait_on_install(&self.id, &source, trust).await
    }

    /// Drive creation and static IP promotion to completion without polling
    /// the install. Readiness only makes progress while awaited, so callers
    /// that do not wait on the install must await this instead.
    ///
    /// # Errors
    ///
    /// Returns the creation or promotion failure.
    pub async fn await_ready(&self) -> Result<(), CloudError> {
        self.tracker.readiness().settled().await
    }

    /// Reserve the server's address as a static IP if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns the provider failure of the lookup or the promotion.
    pub async fn ensure_static_ip(&self) -> Result<(), CloudError> {
        provision::ensure_static_ip(self.client.as_ref(), &self.locator).await
    }

    /// Poll the server's guest attributes once and return the implied state.
    ///
    /// # Errors
    ///
    /// Returns the provider failure of the poll.
    pub async fn refresh_install_state(&self) -> Result<InstallState, CloudError> {
        let source = InstanceAttributes {
            client: self.client.as_ref(),
            locator: &self.locator,
        };
        self.tracker.refresh(&source).await
    }

    /// Delete the static IP and then the instance.
    ///
    /// The state becomes `Deleting` before anything else so a concurrent
    /// `wait_on_install` stops at its next check. Resources that are already
    /// gone are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first provider failure other than not-found; the state is
    /// then `Error`.
    pub async fn delete(&self) -> Result<(), CloudError> {
        self.tracker.set_install_state(InstallState::Deleting);
        if let Err(err) = self.tracker.readiness().settled().await {
            tracing::warn!(instance = %self.name(), error = %err, "instance never became ready, deleting anyway");
        }
        match self.delete_resources().await {
            Ok(()) => {
                tracing::info!(instance = %self.name(), "server deleted");
                self.tracker.set_install_state(InstallState::Deleted);
                Ok(())
            }
            Err(err) => {
                self.tracker.set_install_state(InstallState::Error);
                Err(err)
            }
        }
    }

    async fn delete_resources(&self) -> Result<(), CloudError> {
        let project_id = &self.locator.project_id;
        let region = self.locator.region();
        let static_ip = async {
            let op = self
                .client
                .delete_static_ip(&region, self.locator.static_ip_name())
                .await?;
            complete_operation(self.client.as_ref(), project_id, op).await
        };
        tolerate_not_found(self.name(), "static IP", static_ip.await)?;

        let instance = async {
            let op = self.client.delete_instance(&self.locator).await?;
            complete_operation(self.client.as_ref(), project_id, op).await
        };
        tolerate_not_found(self.name(), "instance", instance.await)
    }
}

fn tolerate_not_found<T>(
    instance: &str,
    resource: &str,
    result: Result<T, CloudError>,
) -> Result<(), CloudError> {
    match result {
        Ok(_) => Ok(()),
        Err(err) if err.is_not_found() => {
            tracing::info!(instance, resource, "already deleted");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Guest attributes of one instance, read through the compute port.
struct InstanceAttributes<'a, C> {
    client: &'a C,
    locator: &'a InstanceLocator,
}

impl<C: ComputeApi> GuestAttributeSource for InstanceAttributes<'_, C> {
    async fn fetch_guest_attributes(&self) -> Result<GuestAttributes, CloudError> {
        self.client.guest_attributes(self.locator, NAMESPACE).await
    }
}
