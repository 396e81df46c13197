//! Target filter queries and their auto-assignment.

use async_trait::async_trait;
use hawkbit_client::TargetFilterApi;
use hawkbit_client::models::{AutoAssignment, TargetFilterCreate, TargetFilterUpdate};
use hawkbit_core::{Pagination, ResourceFamily, describe_searchable_fields};
use serde_json::Value;
use std::sync::Arc;

use super::schema::{SchemaBuilder, action_tool, read_tool, search_fields_tool};
use super::{ResourceService, gate, not_served, object_arguments, page_query};
use crate::arguments::Arguments;
use crate::dispatch::{ActionDescriptor, ActionSpace, Command};
use crate::error::DispatchError;
use crate::output::ToolOutput;
use crate::protocol::ToolDefinition;

pub const GET_TARGET_FILTERS: &str = "getTargetFilters";
pub const GET_TARGET_FILTER_SEARCH_FIELDS: &str = "getTargetFilterSearchFields";

pub static MANAGE_TARGET_FILTER: ActionSpace = ActionSpace {
    tool: "manageTargetFilter",
    discriminator: "action",
    actions: &[
        ActionDescriptor::read("GET", &["filterId"]),
        ActionDescriptor::write("CREATE", &["filterBody"]),
        ActionDescriptor::write("UPDATE", &["filterId", "filterBody"]),
        ActionDescriptor::delete("DELETE", &["filterId"]),
    ],
};

pub static MANAGE_AUTO_ASSIGNMENT: ActionSpace = ActionSpace {
    tool: "manageTargetFilterAutoAssignment",
    discriminator: "action",
    actions: &[
        ActionDescriptor::read("GET", &["filterId"]),
        ActionDescriptor::write("ASSIGN", &["filterId", "assignmentBody"]),
        ActionDescriptor::delete("UNASSIGN", &["filterId"]),
    ],
};

#[derive(Debug, Clone, PartialEq)]
pub enum TargetFilterCommand {
    Get { filter_id: i64 },
    Create { body: TargetFilterCreate },
    Update { filter_id: i64, body: TargetFilterUpdate },
    Delete { filter_id: i64 },
}

impl Command for TargetFilterCommand {
    fn space() -> &'static ActionSpace {
        &MANAGE_TARGET_FILTER
    }

    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError> {
        Ok(match descriptor.action {
            "GET" => TargetFilterCommand::Get {
                filter_id: args.id("filterId")?,
            },
            "CREATE" => TargetFilterCommand::Create {
                body: args.body("filterBody")?,
            },
            "UPDATE" => TargetFilterCommand::Update {
                filter_id: args.id("filterId")?,
                body: args.body("filterBody")?,
            },
            _ => TargetFilterCommand::Delete {
                filter_id: args.id("filterId")?,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AutoAssignmentCommand {
    Get { filter_id: i64 },
    Assign { filter_id: i64, body: AutoAssignment },
    Unassign { filter_id: i64 },
}

impl Command for AutoAssignmentCommand {
    fn space() -> &'static ActionSpace {
        &MANAGE_AUTO_ASSIGNMENT
    }

    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError> {
        let filter_id = args.id("filterId")?;
        Ok(match descriptor.action {
            "GET" => AutoAssignmentCommand::Get { filter_id },
            "ASSIGN" => AutoAssignmentCommand::Assign {
                filter_id,
                body: args.body("assignmentBody")?,
            },
            _ => AutoAssignmentCommand::Unassign { filter_id },
        })
    }
}

pub struct TargetFilterService {
    api: Arc<dyn TargetFilterApi>,
    pagination: Pagination,
}

impl TargetFilterService {
    pub fn new(api: Arc<dyn TargetFilterApi>, pagination: Pagination) -> Self {
        Self { api, pagination }
    }

    async fn list(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let map = object_arguments(arguments)?;
        let query = page_query(
            Arguments::new(&map),
            ResourceFamily::TargetFilterQuery,
            &self.pagination,
        )?;
        Ok(ToolOutput::Json(self.api.list_filters(&query).await?))
    }

    async fn manage(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let command = match gate::<TargetFilterCommand>(arguments)? {
            Ok(command) => command,
            Err(preview) => return Ok(preview),
        };
        match command {
            TargetFilterCommand::Get { filter_id } => {
                Ok(ToolOutput::Json(self.api.get_filter(filter_id).await?))
            }
            TargetFilterCommand::Create { body } => {
                Ok(ToolOutput::Json(self.api.create_filter(&body).await?))
            }
            TargetFilterCommand::Update { filter_id, body } => Ok(ToolOutput::Json(
                self.api.update_filter(filter_id, &body).await?,
            )),
            TargetFilterCommand::Delete { filter_id } => {
                self.api.delete_filter(filter_id).await?;
                Ok(ToolOutput::message(format!(
                    "Target Filter {filter_id} deleted successfully."
                )))
            }
        }
    }

    async fn manage_auto_assignment(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let command = match gate::<AutoAssignmentCommand>(arguments)? {
            Ok(command) => command,
            Err(preview) => return Ok(preview),
        };
        match command {
            AutoAssignmentCommand::Get { filter_id } => {
                Ok(ToolOutput::Json(self.api.get_auto_assignment(filter_id).await?))
            }
            AutoAssignmentCommand::Assign { filter_id, body } => Ok(ToolOutput::Json(
                self.api.set_auto_assignment(filter_id, &body).await?,
            )),
            AutoAssignmentCommand::Unassign { filter_id } => {
                self.api.delete_auto_assignment(filter_id).await?;
                Ok(ToolOutput::message(format!(
                    "Auto-assignment removed successfully from filter {filter_id}"
                )))
            }
        }
    }
}

#[async_trait]
impl ResourceService for TargetFilterService {
    fn name(&self) -> &'static str {
        "target_filter"
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            read_tool(
                GET_TARGET_FILTERS,
                "Get all target filter queries, paged and optionally filtered",
                SchemaBuilder::new()
                    .paging(ResourceFamily::TargetFilterQuery, GET_TARGET_FILTER_SEARCH_FIELDS)
                    .build(),
            ),
            action_tool(
                &MANAGE_TARGET_FILTER,
                "Manages target filter queries (Get single, Create, Update, Delete)",
                SchemaBuilder::new()
                    .actions(&MANAGE_TARGET_FILTER, "The action to perform (GET, CREATE, UPDATE, DELETE)")
                    .integer("filterId", "The target filter ID. Required for GET, UPDATE and DELETE")
                    .object(
                        "filterBody",
                        "{name, query} for CREATE; the fields to change for UPDATE. Required for CREATE and UPDATE",
                    )
                    .confirm()
                    .build(),
            ),
            action_tool(
                &MANAGE_AUTO_ASSIGNMENT,
                "Reads, sets or removes the distribution set automatically assigned to targets matching a filter",
                SchemaBuilder::new()
                    .actions(&MANAGE_AUTO_ASSIGNMENT, "The action to perform (GET, ASSIGN, UNASSIGN)")
                    .integer("filterId", "The target filter ID")
                    .required("filterId")
                    .object(
                        "assignmentBody",
                        "{id (distribution set ID), type (forced|soft|downloadonly), weight, confirmationRequired}. Required for ASSIGN",
                    )
                    .confirm()
                    .build(),
            ),
            search_fields_tool(GET_TARGET_FILTER_SEARCH_FIELDS, ResourceFamily::TargetFilterQuery),
        ]
    }

    async fn call(&self, tool: &str, arguments: Value) -> Result<ToolOutput, DispatchError> {
        match tool {
            GET_TARGET_FILTERS => self.list(arguments).await,
            GET_TARGET_FILTER_SEARCH_FIELDS => Ok(ToolOutput::message(
                describe_searchable_fields(ResourceFamily::TargetFilterQuery),
            )),
            t if t == MANAGE_TARGET_FILTER.tool => self.manage(arguments).await,
            t if t == MANAGE_AUTO_ASSIGNMENT.tool => self.manage_auto_assignment(arguments).await,
            other => Err(not_served(self.name(), other)),
        }
    }
}
