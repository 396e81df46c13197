//! `hawkbit serve`: run the MCP server against a management server.

use anyhow::{Context, Result};
use hawkbit_client::HttpManagementClient;
use hawkbit_core::{HawkbitMcpConfig, Pagination, Transport};
use hawkbit_mcp::{McpServer, Toolbox};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Command line overrides for `serve`.
#[derive(Debug, Default)]
pub struct ServeArgs {
    pub config: Option<PathBuf>,
    pub transport: Option<String>,
    pub port: Option<u16>,
    pub mgmt_url: Option<String>,
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let (config, source) = super::load_config(args.config.as_deref())?;
    let config = apply_overrides(config, &args)?;

    info!(
        config = %source.as_deref().map(|p| p.display().to_string()).unwrap_or_else(|| "defaults".to_string()),
        mgmt_url = %config.server.mgmt_url,
        auth = config.auth.kind(),
        transport = ?config.mcp.transport,
        "Starting hawkbit MCP server"
    );

    let client = HttpManagementClient::from_config(&config)
        .context("Failed to create management API client")?;
    let toolbox = Toolbox::new(Arc::new(client), Pagination::new(config.pagination));

    McpServer::new(config.mcp, Arc::new(toolbox))
        .run()
        .await
        .context("MCP server failed")?;
    Ok(())
}

/// CLI flags win over the config file.
fn apply_overrides(mut config: HawkbitMcpConfig, args: &ServeArgs) -> Result<HawkbitMcpConfig> {
    if let Some(transport) = &args.transport {
        config.mcp.transport = transport
            .parse::<Transport>()
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    if let Some(port) = args.port {
        config.mcp.port = port;
    }
    if let Some(url) = &args.mgmt_url {
        config.server.mgmt_url = url.clone();
    }
    config.validate().context("Invalid configuration after applying CLI flags")?;
    Ok(config)
}
