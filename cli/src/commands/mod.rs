//! Command implementations

pub mod config;
pub mod create;
pub mod delete;
pub mod list;
pub mod version;
pub mod wait;

use crate::application::ports::ComputeApi;
use crate::application::services::lifecycle::GcpServer;
use crate::output::json::ServerView;

/// Machine-readable snapshot of `server`.
#[must_use]
pub fn server_view<C: ComputeApi>(server: &GcpServer<C>) -> ServerView {
    ServerView {
        id: server.id().to_string(),
        name: server.name().to_string(),
        zone: server.zone().to_string(),
        state: server.install_state(),
        progress: server.progress(),
        api_url: server.management_api_url(),
        cert_sha256: server.cert_fingerprint().map(|fp| fp.to_string()),
    }
}
