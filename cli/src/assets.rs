//! Embedded assets compiled into the CLI binary.

/// Startup script attached to every server VM as `startup-script` metadata.
///
/// Publishes install progress through guest attributes in the `outline/`
/// namespace.
pub const STARTUP_SCRIPT: &str = include_str!("../assets/startup-script.sh");
