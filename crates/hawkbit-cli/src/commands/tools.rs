//! Tools introspection commands.
//!
//! `hawkbit tools list` - List every tool the server exposes (offline).
//! `hawkbit tools describe` - Show the full definition of one tool.
//!
//! The toolbox is built over a client that is never called, so neither
//! command needs a reachable management server.

use anyhow::{Context, Result};
use hawkbit_client::{HttpManagementClient, NoAuth};
use hawkbit_core::{Pagination, ServerConfig};
use hawkbit_mcp::{ToolDefinition, Toolbox};
use std::sync::Arc;

fn offline_toolbox() -> Result<Toolbox> {
    let client = HttpManagementClient::new(&ServerConfig::default(), Arc::new(NoAuth))
        .context("Failed to create management API client")?;
    Ok(Toolbox::new(Arc::new(client), Pagination::default()))
}

fn badges(tool: &ToolDefinition) -> Vec<String> {
    let Some(annotations) = tool.annotations.as_ref() else {
        return vec!["read".to_string()];
    };
    let mut badges = Vec::new();
    if annotations.read_only_hint == Some(true) {
        badges.push("read".to_string());
    } else {
        badges.push("write".to_string());
    }
    if annotations.destructive_hint == Some(true) {
        badges.push("destructive".to_string());
    }
    if let Some(actions) = &annotations.confirmation_actions {
        badges.push(format!("confirm: {}", actions.join("/")));
    }
    badges
}

/// List every tool.
pub fn list(verbose: bool) -> Result<()> {
    let toolbox = offline_toolbox()?;
    let tools = toolbox.definitions();

    println!("\n🔧 Available Tools ({}):", tools.len());
    for tool in tools {
        println!("   • {} ({})", tool.name, badges(tool).join(", "));
        if let Some(desc) = &tool.description {
            println!("     {}", desc);
        }
        if verbose {
            println!(
                "     Schema: {}",
                serde_json::to_string_pretty(&tool.input_schema)?
            );
        }
    }
    println!();

    Ok(())
}

/// Show the definition of one tool.
pub fn describe(name: &str) -> Result<()> {
    let toolbox = offline_toolbox()?;
    let tool = toolbox
        .definition(name)
        .ok_or_else(|| anyhow::anyhow!("Tool '{}' not found. Run `hawkbit tools list`.", name))?;

    println!("\nTool: {}", tool.name);
    if let Some(desc) = &tool.description {
        println!("\nDescription: {}", desc);
    }

    println!("\nInput Schema:");
    println!("{}", serde_json::to_string_pretty(&tool.input_schema)?);

    if let Some(annotations) = &tool.annotations {
        println!("\nAnnotations:");
        println!("{}", serde_json::to_string_pretty(annotations)?);
    }
    println!();

    Ok(())
}
