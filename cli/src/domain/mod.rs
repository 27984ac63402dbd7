//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod attributes;
pub mod compute;
pub mod config;
pub mod error;
pub mod install;
pub mod instance;

pub use attributes::{CertFingerprint, GuestAttributes};
pub use config::{OutlineConfig, validate_config_key, validate_config_value};
pub use error::{CloudError, ConfigError, InstallError};
pub use install::{InstallDecision, InstallState, decide};
pub use instance::{InstanceLocator, RegionLocator};
