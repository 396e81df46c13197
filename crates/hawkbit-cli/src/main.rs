use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::fields::FamilyArg;

#[derive(Parser, Debug)]
#[command(name = "hawkbit", version, about = "MCP server for hawkBit device fleet management")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the MCP server.
    Serve {
        /// Configuration file. Defaults to hawkbit-mcp.yaml when present.
        #[arg(short, long, env = "HAWKBIT_MCP_CONFIG")]
        config: Option<PathBuf>,

        /// Transport (stdio or http). Overrides the config file.
        #[arg(long)]
        transport: Option<String>,

        /// HTTP port (http transport only). Overrides the config file.
        #[arg(long)]
        port: Option<u16>,

        /// Management server URL. Overrides the config file.
        #[arg(long = "mgmt-url", env = "HAWKBIT_MGMT_URL")]
        mgmt_url: Option<String>,
    },

    /// Inspect the tools the server exposes (offline).
    Tools {
        #[command(subcommand)]
        cmd: ToolsCommand,
    },

    /// Print the searchable fields of a resource family.
    Fields {
        #[arg(value_enum)]
        family: FamilyArg,
    },

    /// Validate the configuration without contacting the management server.
    Check {
        #[arg(short, long, env = "HAWKBIT_MCP_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ToolsCommand {
    /// List every tool with its confirmation badges.
    List {
        /// Print input schemas too.
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },

    /// Show the definition of one tool.
    Describe { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the stdio transport, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve {
            config,
            transport,
            port,
            mgmt_url,
        } => {
            commands::serve::run(commands::serve::ServeArgs {
                config,
                transport,
                port,
                mgmt_url,
            })
            .await?
        }
        Command::Tools { cmd } => match cmd {
            ToolsCommand::List { verbose } => commands::tools::list(verbose)?,
            ToolsCommand::Describe { name } => commands::tools::describe(&name)?,
        },
        Command::Fields { family } => commands::fields::print(family),
        Command::Check { config } => commands::check::run(config.as_deref())?,
    }

    Ok(())
}
