//! Management server connection settings.

use serde::{Deserialize, Serialize};

/// Where the management REST API lives and how long a single call may take.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the management server, without the `/rest/v1` suffix.
    #[serde(default = "default_mgmt_url")]
    pub mgmt_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            mgmt_url: default_mgmt_url(),
            request_timeout_ms: default_request_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl ServerConfig {
    /// Base URL with trailing slashes removed.
    pub fn base_url(&self) -> &str {
        self.mgmt_url.trim_end_matches('/')
    }
}

fn default_mgmt_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    concat!("hawkbit-mcp/", env!("CARGO_PKG_VERSION")).to_string()
}
