//! # hawkbit-mcp
//!
//! MCP (Model Context Protocol) server exposing hawkBit device fleet
//! management as typed tools for AI agents.
//!
//! - **Guarded dispatch**: every mutating action previews by default and only
//!   executes with `confirm: true`
//! - **Action spaces**: each `manage*` tool declares its actions, their
//!   required fields and whether they mutate; schemas are generated from it
//! - **Composite reads**: `getTargetDetails` stitches a target together with
//!   its sub-resources and reports the parts that failed
//! - **Multiple transports**: stdio and HTTP
//!
//! ## Architecture
//!
//! ```text
//! AI Agent
//!       │
//!       │ MCP protocol (list tools / call tool)
//!       ▼
//! ┌──────────────────────┐
//! │  McpServer           │
//! │  Toolbox → service   │
//! │  1. validate fields  │
//! │  2. decode command   │
//! │  3. preview or run   │
//! └──────────┬───────────┘
//!            │ one call per command
//!            ▼
//!   hawkBit Management API
//! ```
//!
//! ## Example Usage
//!
//! ```ignore
//! use hawkbit_client::HttpManagementClient;
//! use hawkbit_core::{HawkbitMcpConfig, Pagination};
//! use hawkbit_mcp::{McpServer, Toolbox};
//! use std::sync::Arc;
//!
//! let config = HawkbitMcpConfig::from_file("hawkbit-mcp.yaml")?;
//! let client = Arc::new(HttpManagementClient::from_config(&config)?);
//! let toolbox = Arc::new(Toolbox::new(client, Pagination::new(config.pagination)));
//! McpServer::new(config.mcp.clone(), toolbox).run().await?;
//! ```

pub mod arguments;
pub mod composite;
pub mod dispatch;
pub mod error;
pub mod http_transport;
pub mod output;
pub mod protocol;
pub mod server;
pub mod services;
pub mod toolbox;
pub mod tools;

pub use composite::{CompositeReport, target_details};
pub use dispatch::{ActionDescriptor, ActionSpace, Command, Gate, PreviewEnvelope, ToolInvocation, admit};
pub use error::{DispatchError, McpError};
pub use output::ToolOutput;
pub use protocol::{
    CallToolParams, CallToolResponse, JsonRpcRequest, JsonRpcResponse, ToolAnnotations,
    ToolContent, ToolDefinition,
};
pub use server::McpServer;
pub use services::ResourceService;
pub use toolbox::Toolbox;
pub use tools::ToolRegistry;
