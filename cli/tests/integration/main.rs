//! Integration tests for the outline-gcp CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior that
//! needs no network: argument parsing, configuration, and input checks.

mod cli_tests;
mod config_command;
