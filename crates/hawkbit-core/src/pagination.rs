//! Pagination normalization for list tools.
//!
//! Agents frequently omit paging arguments or send them as the wrong type.
//! `Pagination::normalize` turns the optional pair into a concrete window:
//! offset defaults to 0, limit to the configured default (50).
//!
//! The declared ceiling (`max_limit`) is only enforced locally when
//! `enforce_max_limit` is set; otherwise larger limits are forwarded and the
//! management server applies its own ceiling.

use crate::catalog::ResourceFamily;
use crate::config::PaginationConfig;
use serde::Serialize;
use thiserror::Error;

/// Rejected paging arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("offset must not be negative, got {0}")]
    NegativeOffset(i64),

    #[error("limit must be at least 1, got {0}")]
    NonPositiveLimit(i64),
}

/// A concrete page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

/// Applies defaults (and optionally the ceiling) to paging arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pagination {
    config: PaginationConfig,
}

impl Pagination {
    pub fn new(config: PaginationConfig) -> Self {
        Self { config }
    }

    /// Declared maximum page size.
    pub fn max_limit(&self) -> u32 {
        self.config.max_limit
    }

    /// Resolve optional offset/limit into a window.
    pub fn normalize(
        &self,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> Result<PageWindow, PaginationError> {
        let offset = match offset {
            None => 0,
            Some(value) if value < 0 => return Err(PaginationError::NegativeOffset(value)),
            Some(value) => value as u64,
        };

        let limit = match limit {
            None => u64::from(self.config.default_limit),
            Some(value) if value < 1 => return Err(PaginationError::NonPositiveLimit(value)),
            Some(value) => value as u64,
        };

        let max = u64::from(self.config.max_limit);
        let limit = if self.config.enforce_max_limit && limit > max {
            tracing::warn!(requested = limit, max, "Clamping page limit to configured maximum");
            max
        } else {
            limit
        };

        Ok(PageWindow { offset, limit })
    }
}

/// Parameters of one paged list call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageQuery {
    /// RSQL/FIQL filter (`q=`), if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub offset: u64,
    pub limit: u64,
    /// Sort expression (`sort=`).
    pub sort: String,
}

impl PageQuery {
    /// Build a query; blank filters are dropped and a missing sort falls back
    /// to the family's default sort.
    pub fn new(
        family: ResourceFamily,
        window: PageWindow,
        filter: Option<String>,
        sort: Option<String>,
    ) -> Self {
        let filter = filter.filter(|f| !f.trim().is_empty());
        let sort = sort
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| family.catalog().default_sort.to_string());
        Self {
            filter,
            offset: window.offset,
            limit: window.limit,
            sort,
        }
    }

    /// Query-string pairs in the management API's parameter names.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(filter) = &self.filter {
            pairs.push(("q", filter.clone()));
        }
        pairs.push(("offset", self.offset.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("sort", self.sort.clone()));
        pairs
    }
}
