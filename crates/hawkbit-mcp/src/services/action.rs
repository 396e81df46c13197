//! Fleet-wide action history.

use async_trait::async_trait;
use hawkbit_client::ActionApi;
use hawkbit_core::{Pagination, ResourceFamily, describe_searchable_fields};
use serde_json::Value;
use std::sync::Arc;

use super::schema::{SchemaBuilder, action_tool, search_fields_tool};
use super::{ResourceService, gate, not_served, object_arguments, page_query};
use crate::arguments::Arguments;
use crate::dispatch::{ActionDescriptor, ActionSpace, Command};
use crate::error::DispatchError;
use crate::output::ToolOutput;
use crate::protocol::ToolDefinition;

pub const GET_ACTION_SEARCH_FIELDS: &str = "getActionSearchFields";

pub static QUERY_ACTIONS: ActionSpace = ActionSpace {
    tool: "queryActions",
    discriminator: "queryType",
    actions: &[
        ActionDescriptor::read("SEARCH", &[]),
        ActionDescriptor::read("GET_DETAILS", &["actionId"]),
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionQuery {
    Search,
    Details { action_id: i64 },
}

impl Command for ActionQuery {
    fn space() -> &'static ActionSpace {
        &QUERY_ACTIONS
    }

    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError> {
        Ok(match descriptor.action {
            "SEARCH" => ActionQuery::Search,
            _ => ActionQuery::Details {
                action_id: args.id("actionId")?,
            },
        })
    }
}

pub struct ActionService {
    api: Arc<dyn ActionApi>,
    pagination: Pagination,
}

impl ActionService {
    pub fn new(api: Arc<dyn ActionApi>, pagination: Pagination) -> Self {
        Self { api, pagination }
    }

    async fn query(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let paging = object_arguments(arguments.clone())?;
        let query = match gate::<ActionQuery>(arguments)? {
            Ok(query) => query,
            Err(preview) => return Ok(preview),
        };
        match query {
            ActionQuery::Search => {
                let page = page_query(Arguments::new(&paging), ResourceFamily::Action, &self.pagination)?;
                Ok(ToolOutput::Json(self.api.list_actions(&page).await?))
            }
            ActionQuery::Details { action_id } => {
                Ok(ToolOutput::Json(self.api.get_action(action_id).await?))
            }
        }
    }
}

#[async_trait]
impl ResourceService for ActionService {
    fn name(&self) -> &'static str {
        "action"
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            action_tool(
                &QUERY_ACTIONS,
                "Searches actions across all targets (SEARCH) or reads a single action (GET_DETAILS). Sorted newest first unless sortParam is given.",
                SchemaBuilder::new()
                    .actions(&QUERY_ACTIONS, "The query to run (SEARCH, GET_DETAILS)")
                    .integer("actionId", "The action ID. Required for GET_DETAILS")
                    .paging(ResourceFamily::Action, GET_ACTION_SEARCH_FIELDS)
                    .build(),
            ),
            search_fields_tool(GET_ACTION_SEARCH_FIELDS, ResourceFamily::Action),
        ]
    }

    async fn call(&self, tool: &str, arguments: Value) -> Result<ToolOutput, DispatchError> {
        match tool {
            GET_ACTION_SEARCH_FIELDS => Ok(ToolOutput::message(describe_searchable_fields(
                ResourceFamily::Action,
            ))),
            t if t == QUERY_ACTIONS.tool => self.query(arguments).await,
            other => Err(not_served(self.name(), other)),
        }
    }
}
