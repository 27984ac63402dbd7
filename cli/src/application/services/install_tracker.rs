//! Install tracker: drives one server's [`InstallState`] from instance
//! readiness and guest-attribute polling to a terminal state.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//!
//! All state lives on a single task. `wait_on_install` and the lifecycle's
//! `delete` both take `&self` and may be raced on that task; the tracker
//! re-reads the state after every suspension point so a concurrent deletion
//! is never overwritten.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::time::Duration;

use futures_util::future::{self, FutureExt, LocalBoxFuture, Shared};

use crate::application::ports::{CertificateTrust, GuestAttributeSource};
use crate::domain::{
    CertFingerprint, CloudError, GuestAttributes, InstallDecision, InstallError, InstallState,
    decide,
};

/// Single-assignment result of one readiness stage, observable by every clone.
pub type ReadinessFuture = Shared<LocalBoxFuture<'static, Result<(), CloudError>>>;

/// Callback receiving progress in `[0, 1]`.
pub type ProgressListener = Box<dyn Fn(f64)>;

/// Wrap a readiness stage so it can be awaited from several flows.
pub fn shared_stage(stage: impl Future<Output = Result<(), CloudError>> + 'static) -> ReadinessFuture {
    stage.boxed_local().shared()
}

/// The two stages an instance passes before its guest attributes matter.
#[derive(Clone)]
pub struct InstanceReadiness {
    created: ReadinessFuture,
    ip_allocated: ReadinessFuture,
}

impl InstanceReadiness {
    /// `ip_allocated` is expected to await `created` itself.
    #[must_use]
    pub fn new(created: ReadinessFuture, ip_allocated: ReadinessFuture) -> Self {
        Self {
            created,
            ip_allocated,
        }
    }

    /// Readiness of an instance that already exists.
    #[must_use]
    pub fn ready() -> Self {
        Self::new(
            shared_stage(future::ready(Ok(()))),
            shared_stage(future::ready(Ok(()))),
        )
    }

    /// Resolves once the instance exists.
    ///
    /// # Errors
    ///
    /// Returns the creation failure.
    pub async fn created(&self) -> Result<(), CloudError> {
        self.created.clone().await
    }

    /// Resolves once the instance exists and holds a static IP.
    ///
    /// Both stages are polled together so work in the IP stage that does not
    /// depend on creation starts straight away.
    ///
    /// # Errors
    ///
    /// Returns the first failure of either stage.
    pub async fn settled(&self) -> Result<(), CloudError> {
        let (created, ip_allocated) =
            futures_util::join!(self.created.clone(), self.ip_allocated.clone());
        created?;
        ip_allocated
    }
}

/// Installation state machine for one server.
pub struct InstallTracker {
    state: Cell<InstallState>,
    listener: RefCell<Option<ProgressListener>>,
    readiness: InstanceReadiness,
    poll_interval: Duration,
    api_url: RefCell<Option<String>>,
    fingerprint: RefCell<Option<CertFingerprint>>,
    install_error: RefCell<Option<String>>,
}

impl InstallTracker {
    /// Interval between guest attribute polls unless configured otherwise.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

    #[must_use]
    pub fn new(readiness: InstanceReadiness, poll_interval: Duration) -> Self {
        Self {
            state: Cell::new(InstallState::Unknown),
            listener: RefCell::new(None),
            readiness,
            poll_interval,
            api_url: RefCell::new(None),
            fingerprint: RefCell::new(None),
            install_error: RefCell::new(None),
        }
    }

    /// Register the progress listener, replacing any previous one, and call
    /// it immediately with the current progress.
    pub fn set_progress_listener(&self, listener: impl Fn(f64) + 'static) {
        *self.listener.borrow_mut() = Some(Box::new(listener));
        self.emit_progress();
    }

    #[must_use]
    pub fn install_state(&self) -> InstallState {
        self.state.get()
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.state.get().progress()
    }

    /// `true` once the state is `Success`, `Error` or `Deleted`.
    #[must_use]
    pub fn is_install_completed(&self) -> bool {
        self.state.get().is_completed()
    }

    /// Store `state` and report the new progress.
    pub fn set_install_state(&self, state: InstallState) {
        tracing::debug!(from = %self.state.get(), to = %state, "install state changed");
        self.state.set(state);
        self.emit_progress();
    }

    #[must_use]
    pub fn readiness(&self) -> &InstanceReadiness {
        &self.readiness
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Management API URL, once installation succeeded.
    #[must_use]
    pub fn api_url(&self) -> Option<String> {
        self.api_url.borrow().clone()
    }

    /// Trusted certificate fingerprint, once installation succeeded.
    #[must_use]
    pub fn cert_fingerprint(&self) -> Option<CertFingerprint> {
        self.fingerprint.borrow().clone()
    }

    /// Wait until installation reaches a terminal state.
    ///
    /// Awaits instance readiness first, then polls `source` every
    /// `poll_interval` with no upper bound; wrap the call in a timeout to
    /// impose a deadline.
    ///
    /// # Errors
    ///
    /// - [`InstallError::CreationFailed`] if instance creation or static IP
    ///   promotion failed;
    /// - [`InstallError::Failed`] if the server reported an install error;
    /// - [`InstallError::Deleted`] if the server was deleted meanwhile.
    pub async fn wait_on_install(
        &self,
        server_id: &str,
        source: &impl GuestAttributeSource,
        trust: &impl CertificateTrust,
    ) -> Result<(), InstallError> {
        self.await_readiness().await?;

        loop {
            if self.state.get().is_deletion() {
                break;
            }
            let attributes = match source.fetch_guest_attributes().await {
                Ok(attributes) => attributes,
                // Nothing has been published yet.
                Err(err) if err.is_not_found() => GuestAttributes::new(),
                Err(err) => {
                    tracing::warn!(server = server_id, error = %err, "guest attribute poll failed");
                    GuestAttributes::new()
                }
            };
            if self.state.get().is_deletion() {
                break;
            }
            self.apply(server_id, decide(&attributes), trust)?;
            if self.is_install_completed() {
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        match self.state.get() {
            InstallState::Error => Err(InstallError::Failed {
                reason: self
                    .install_error
                    .borrow()
                    .clone()
                    .unwrap_or_else(|| "server reported an installation error".to_string()),
            }),
            InstallState::Deleting | InstallState::Deleted => Err(InstallError::Deleted),
            _ => Ok(()),
        }
    }

    /// Poll `source` once and move to the state it implies, without trusting
    /// any certificate. Used to report the state of servers nobody waits on.
    ///
    /// # Errors
    ///
    /// Returns the poll failure; not-found counts as nothing published.
    pub async fn refresh(&self, source: &impl GuestAttributeSource) -> Result<InstallState, CloudError> {
        let attributes = match source.fetch_guest_attributes().await {
            Ok(attributes) => attributes,
            Err(err) if err.is_not_found() => GuestAttributes::new(),
            Err(err) => return Err(err),
        };
        if self.state.get().is_deletion() {
            return Ok(self.state.get());
        }
        match decide(&attributes) {
            InstallDecision::Installed {
                api_url,
                cert_sha256,
            } => {
                *self.api_url.borrow_mut() = Some(api_url);
                *self.fingerprint.borrow_mut() = CertFingerprint::parse(&cert_sha256);
                self.set_install_state(InstallState::Success);
            }
            InstallDecision::Failed { reason } => {
                *self.install_error.borrow_mut() = Some(reason);
                self.set_install_state(InstallState::Error);
            }
            decision => {
                if let Some(state) = decision.target_state() {
                    self.set_install_state(state);
                }
            }
        }
        Ok(self.state.get())
    }

    /// Reason reported by the server's startup script, if it failed.
    #[must_use]
    pub fn install_error(&self) -> Option<String> {
        self.install_error.borrow().clone()
    }

    async fn await_readiness(&self) -> Result<(), InstallError> {
        let created = async {
            let result = self.readiness.created().await;
            if result.is_ok() {
                self.advance(InstallState::InstanceCreated);
            }
            result
        };
        let (created, ip_allocated) =
            futures_util::join!(created, self.readiness.ip_allocated.clone());
        match created.and(ip_allocated) {
            Ok(()) => {
                self.advance(InstallState::IpAllocated);
                Ok(())
            }
            Err(_) if self.state.get().is_deletion() => Err(InstallError::Deleted),
            Err(err) => {
                tracing::warn!(error = %err, "instance creation failed");
                self.set_install_state(InstallState::Error);
                Err(InstallError::CreationFailed(err))
            }
        }
    }

    /// Move forward unless a deletion has taken over.
    fn advance(&self, state: InstallState) {
        if !self.state.get().is_deletion() {
            self.set_install_state(state);
        }
    }

    fn apply(
        &self,
        server_id: &str,
        decision: InstallDecision,
        trust: &impl CertificateTrust,
    ) -> Result<(), InstallError> {
        match decision {
            InstallDecision::Installed {
                api_url,
                cert_sha256,
            } => {
                let fingerprint = CertFingerprint::parse(&cert_sha256)
                    .ok_or_else(|| self.fail("server published an empty certificate fingerprint"))?;
                trust
                    .trust_certificate(server_id, &fingerprint)
                    .map_err(|err| self.fail(&format!("cannot trust server certificate: {err:#}")))?;
                tracing::info!(server = server_id, api_url = %api_url, "server installed");
                *self.api_url.borrow_mut() = Some(api_url);
                *self.fingerprint.borrow_mut() = Some(fingerprint);
                self.set_install_state(InstallState::Success);
            }
            InstallDecision::Failed { reason } => {
                tracing::warn!(server = server_id, reason = %reason, "server reported install error");
                *self.install_error.borrow_mut() = Some(reason);
                self.set_install_state(InstallState::Error);
            }
            InstallDecision::HasCertificate | InstallDecision::Booted | InstallDecision::Pending => {
                // Re-applied on every poll so the listener hears from each one.
                if let Some(state) = decision.target_state() {
                    self.set_install_state(state);
                }
            }
        }
        Ok(())
    }

    fn fail(&self, reason: &str) -> InstallError {
        self.set_install_state(InstallState::Error);
        InstallError::Failed {
            reason: reason.to_string(),
        }
    }

    fn emit_progress(&self) {
        let progress = self.progress();
        if let Some(listener) = self.listener.borrow().as_ref() {
            listener(progress);
        }
    }
}
