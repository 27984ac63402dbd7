//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: Compute Engine HTTP calls
//! and the YAML files under `~/.outline-gcp`.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod compute;
pub mod config;
pub mod fs;
pub mod trust;
