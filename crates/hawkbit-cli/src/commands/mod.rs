//! CLI command implementations for the hawkbit MCP server.

pub mod check;
pub mod fields;
pub mod serve;
pub mod tools;

use anyhow::{Context, Result};
use hawkbit_core::HawkbitMcpConfig;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "hawkbit-mcp.yaml";

/// Load the configuration.
///
/// An explicit path must exist. Without one, `hawkbit-mcp.yaml` is used when
/// present and built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<(HawkbitMcpConfig, Option<PathBuf>)> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                tracing::info!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                return Ok((HawkbitMcpConfig::default(), None));
            }
            default
        }
    };

    let config = HawkbitMcpConfig::from_file(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    Ok((config, Some(path)))
}
