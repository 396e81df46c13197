//! `hawkbit check` command implementation.
//!
//! Validates the configuration the way `serve` would use it:
//! - YAML parsing and value checks
//! - Secret resolution from inline values or environment variables
//! - Client construction (URL parsing, authorizer setup)
//!
//! The management server is never contacted.

use anyhow::Result;
use hawkbit_client::HttpManagementClient;
use hawkbit_core::HawkbitMcpConfig;
use std::path::Path;

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFinding {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl CheckFinding {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            detail: detail.into(),
        }
    }
}

/// Checks that need a loaded configuration.
pub fn check_config(config: &HawkbitMcpConfig) -> Vec<CheckFinding> {
    let mut findings = Vec::new();

    findings.push(match config.auth.resolve_secret() {
        Ok(Some(_)) => CheckFinding::pass("auth", format!("{} credentials resolved", config.auth.kind())),
        Ok(None) => CheckFinding::pass("auth", "no authorization configured"),
        Err(e) => CheckFinding::fail("auth", e.to_string()),
    });

    findings.push(match HttpManagementClient::from_config(config) {
        Ok(client) => CheckFinding::pass("client", format!("management API at {}", client.base_url())),
        Err(e) => CheckFinding::fail("client", e.to_string()),
    });

    let pagination = &config.pagination;
    findings.push(CheckFinding::pass(
        "pagination",
        format!(
            "default limit {}, max {} ({})",
            pagination.default_limit,
            pagination.max_limit,
            if pagination.enforce_max_limit {
                "clamped locally"
            } else {
                "enforced by server"
            }
        ),
    ));

    findings.push(CheckFinding::pass(
        "transport",
        if config.mcp.is_http() {
            format!("http on {}", config.mcp.bind_addr())
        } else {
            "stdio".to_string()
        },
    ));

    findings
}

pub fn run(config_path: Option<&Path>) -> Result<()> {
    println!("\n🔍 Checking hawkbit-mcp configuration\n");

    let (config, source) = match super::load_config(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            println!("   ❌ config: {e:#}");
            anyhow::bail!("Configuration check failed");
        }
    };
    match &source {
        Some(path) => println!("   ✅ config: loaded {}", path.display()),
        None => println!("   ✅ config: using built-in defaults"),
    }

    let findings = check_config(&config);
    for finding in &findings {
        let mark = if finding.passed { "✅" } else { "❌" };
        println!("   {} {}: {}", mark, finding.name, finding.detail);
    }

    let failed = findings.iter().filter(|f| !f.passed).count();
    println!();
    if failed > 0 {
        anyhow::bail!("Configuration check failed with {failed} error(s)");
    }
    println!("✅ Configuration is valid\n");
    Ok(())
}
