//! Configuration types for hawkbit-mcp.
//!
//! Configuration is loaded from a single YAML file (`hawkbit-mcp.yaml` by
//! default). Every section is optional and falls back to defaults suitable
//! for a local management server on `http://localhost:8080`.
//!
//! ```yaml
//! server:
//!   mgmt_url: https://hawkbit.example.com
//! auth:
//!   kind: client_credentials
//!   token_url: https://idp.example.com/realms/hawkbit/protocol/openid-connect/token
//!   client_id: hawkbit-mcp-server
//!   client_secret_env: HAWKBIT_CLIENT_SECRET
//! mcp:
//!   transport: stdio
//! pagination:
//!   enforce_max_limit: false
//! ```

pub mod auth;
pub mod mcp;
pub mod pagination;
pub mod server;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use auth::AuthConfig;
pub use mcp::{McpConfig, Transport};
pub use pagination::PaginationConfig;
pub use server::ServerConfig;

/// Complete hawkbit-mcp configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HawkbitMcpConfig {
    /// Management server connection.
    #[serde(default)]
    pub server: ServerConfig,

    /// Authorization for outbound calls.
    #[serde(default)]
    pub auth: AuthConfig,

    /// MCP transport settings.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Pagination policy for list tools.
    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HawkbitMcpConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content and validate it.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.server.mgmt_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Config(format!(
                "server.mgmt_url must be an http(s) URL, got '{}'",
                self.server.mgmt_url
            )));
        }
        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::Config(
                "server.request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.pagination.default_limit == 0 || self.pagination.max_limit == 0 {
            return Err(ConfigError::Config(
                "pagination limits must be greater than zero".to_string(),
            ));
        }
        if self.pagination.default_limit > self.pagination.max_limit {
            return Err(ConfigError::Config(format!(
                "pagination.default_limit ({}) exceeds pagination.max_limit ({})",
                self.pagination.default_limit, self.pagination.max_limit
            )));
        }
        Ok(())
    }
}
