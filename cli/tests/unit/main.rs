//! Unit tests for outline-gcp
//!
//! These tests use scripted fakes of the provider ports and run without
//! network or filesystem access.

mod architecture;
mod property_tests;
