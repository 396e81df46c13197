//! Tool services, one per resource family.
//!
//! A service owns the tool definitions of its family and executes calls to
//! them: list tools read paging arguments directly, action tools go through
//! [`admit`](crate::dispatch::admit) and issue exactly one management API
//! call per admitted command.

pub mod action;
pub mod rollout;
pub mod schema;
pub mod target;
pub mod target_filter;
pub mod target_tag;
pub mod target_type;

use async_trait::async_trait;
use hawkbit_core::{PageQuery, Pagination, PaginationError, ResourceFamily};
use serde_json::Value;

use crate::arguments::Arguments;
use crate::dispatch::{Command, Gate, ToolInvocation, admit};
use crate::error::DispatchError;
use crate::output::ToolOutput;
use crate::protocol::ToolDefinition;

pub use action::ActionService;
pub use rollout::RolloutService;
pub use target::TargetService;
pub use target_filter::TargetFilterService;
pub use target_tag::TargetTagService;
pub use target_type::TargetTypeService;

/// A family of tools backed by the management API.
#[async_trait]
pub trait ResourceService: Send + Sync {
    /// Family name for logs.
    fn name(&self) -> &'static str;

    /// Definitions of every tool this service answers.
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Execute one call to a tool returned by [`definitions`](Self::definitions).
    async fn call(&self, tool: &str, arguments: Value) -> Result<ToolOutput, DispatchError>;
}

/// Admit an invocation of `C`'s action space.
///
/// `Ok(Err(preview))` means the call stopped at the gate.
pub(crate) fn gate<C: Command>(arguments: Value) -> Result<Result<C, ToolOutput>, DispatchError> {
    let invocation = ToolInvocation::new(C::space(), arguments)?;
    Ok(match admit::<C>(&invocation)? {
        Gate::Proceed(command) => Ok(command),
        Gate::Preview(envelope) => Err(ToolOutput::Preview(envelope)),
    })
}

/// Paging arguments of a list call.
pub(crate) fn page_query(
    args: Arguments<'_>,
    family: ResourceFamily,
    pagination: &Pagination,
) -> Result<PageQuery, DispatchError> {
    let window = pagination
        .normalize(args.opt_i64("offset")?, args.opt_i64("limit")?)
        .map_err(|e| match e {
            PaginationError::NegativeOffset(_) => DispatchError::invalid("offset", e.to_string()),
            PaginationError::NonPositiveLimit(_) => DispatchError::invalid("limit", e.to_string()),
        })?;
    Ok(PageQuery::new(
        family,
        window,
        args.opt_string("rsqlParam")?,
        args.opt_string("sortParam")?,
    ))
}

/// Argument object of a plain (non action) tool.
pub(crate) fn object_arguments(arguments: Value) -> Result<serde_json::Map<String, Value>, DispatchError> {
    match arguments {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(serde_json::Map::new()),
        _ => Err(DispatchError::invalid(
            "arguments",
            "tool arguments must be a JSON object",
        )),
    }
}

/// Required-field check for plain tools, same rule as action tools.
pub(crate) fn require(
    tool: &str,
    args: Arguments<'_>,
    fields: &[&str],
) -> Result<(), DispatchError> {
    let missing = args.missing(fields);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DispatchError::MissingRequiredField {
            tool: tool.to_string(),
            action: String::new(),
            fields: missing,
        })
    }
}

pub(crate) fn not_served(service: &str, tool: &str) -> DispatchError {
    DispatchError::invalid("name", format!("tool {tool} is not served by the {service} service"))
}
