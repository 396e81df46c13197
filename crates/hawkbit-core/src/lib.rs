//! # hawkbit-core
//!
//! Shared, backend-independent pieces of hawkbit-mcp:
//!
//! - **config**: YAML configuration for the management server, authorization,
//!   MCP transport and pagination policy
//! - **catalog**: static description of the RSQL/FIQL fields each resource
//!   family can be filtered and sorted by
//! - **pagination**: offset/limit normalization
//! - **lifecycle**: rollout lifecycle states as reported by the backend

pub mod catalog;
pub mod config;
pub mod lifecycle;
pub mod pagination;

pub use catalog::{QueryField, ResourceFamily, SearchCatalog, describe_searchable_fields};
pub use config::{
    AuthConfig, ConfigError, HawkbitMcpConfig, McpConfig, PaginationConfig, ServerConfig,
    Transport,
};
pub use lifecycle::{LifecycleVerb, RolloutLifecycleState};
pub use pagination::{PageQuery, PageWindow, Pagination, PaginationError};
