//! Pagination policy configuration.

use serde::{Deserialize, Serialize};

/// Defaults and ceiling applied to paged list tools.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Limit used when the caller omits one.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Declared maximum page size, advertised in tool descriptions.
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,

    /// Clamp larger caller-supplied limits to `max_limit` locally.
    ///
    /// Off by default: the ceiling is enforced by the management server.
    #[serde(default)]
    pub enforce_max_limit: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            enforce_max_limit: false,
        }
    }
}

fn default_limit() -> u32 {
    50
}

fn default_max_limit() -> u32 {
    50
}
