//! Target tags and tag membership.

use async_trait::async_trait;
use hawkbit_client::TargetTagApi;
use hawkbit_client::models::{OnNotFoundPolicy, TagCreate, TagUpdate};
use hawkbit_core::{Pagination, ResourceFamily, describe_searchable_fields};
use serde_json::Value;
use std::sync::Arc;

use super::schema::{SchemaBuilder, action_tool, read_tool, search_fields_tool};
use super::{ResourceService, gate, not_served, object_arguments, page_query, require};
use crate::arguments::Arguments;
use crate::dispatch::{ActionDescriptor, ActionSpace, Command};
use crate::error::DispatchError;
use crate::output::ToolOutput;
use crate::protocol::ToolDefinition;

pub const GET_TARGET_TAGS: &str = "getTargetTags";
pub const GET_TARGET_TAG_ASSIGNED_TARGETS: &str = "getTargetTagAssignedTargets";
pub const GET_TARGET_TAG_SEARCH_FIELDS: &str = "getTargetTagSearchFields";

const TARGET_SEARCH_FIELDS: &str = "getTargetSearchFields";

const POLICIES: [OnNotFoundPolicy; 3] = [
    OnNotFoundPolicy::Fail,
    OnNotFoundPolicy::OnWhatFoundAndFail,
    OnNotFoundPolicy::OnWhatFoundAndSuccess,
];

pub static MANAGE_TARGET_TAG: ActionSpace = ActionSpace {
    tool: "manageTargetTag",
    discriminator: "action",
    actions: &[
        ActionDescriptor::read("GET", &["tagId"]),
        ActionDescriptor::write("CREATE", &["createBody"]),
        ActionDescriptor::write("UPDATE", &["tagId", "updateBody"]),
        ActionDescriptor::delete("DELETE", &["tagId"]),
    ],
};

pub static MANAGE_TAG_ASSIGNMENTS: ActionSpace = ActionSpace {
    tool: "manageTargetTagAssignments",
    discriminator: "action",
    actions: &[
        ActionDescriptor::write("ASSIGN", &["tagId", "controllerIds"])
            .with_optional(&["onNotFoundPolicy"]),
        ActionDescriptor::delete("UNASSIGN", &["tagId", "controllerIds"])
            .with_optional(&["onNotFoundPolicy"]),
    ],
};

#[derive(Debug, Clone, PartialEq)]
pub enum TargetTagCommand {
    Get { tag_id: i64 },
    Create { tags: Vec<TagCreate> },
    Update { tag_id: i64, body: TagUpdate },
    Delete { tag_id: i64 },
}

impl Command for TargetTagCommand {
    fn space() -> &'static ActionSpace {
        &MANAGE_TARGET_TAG
    }

    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError> {
        Ok(match descriptor.action {
            "GET" => TargetTagCommand::Get {
                tag_id: args.id("tagId")?,
            },
            "CREATE" => TargetTagCommand::Create {
                tags: args.list("createBody")?,
            },
            "UPDATE" => TargetTagCommand::Update {
                tag_id: args.id("tagId")?,
                body: args.body("updateBody")?,
            },
            _ => TargetTagCommand::Delete {
                tag_id: args.id("tagId")?,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAssignmentCommand {
    pub tag_id: i64,
    pub assign: bool,
    pub controller_ids: Vec<String>,
    /// Forwarded only when given; the server defaults to FAIL.
    pub on_not_found: Option<OnNotFoundPolicy>,
}

impl Command for TagAssignmentCommand {
    fn space() -> &'static ActionSpace {
        &MANAGE_TAG_ASSIGNMENTS
    }

    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError> {
        Ok(TagAssignmentCommand {
            tag_id: args.id("tagId")?,
            assign: descriptor.action == "ASSIGN",
            controller_ids: args.string_list("controllerIds")?,
            on_not_found: parse_policy(args.opt_string("onNotFoundPolicy")?)?,
        })
    }
}

fn parse_policy(raw: Option<String>) -> Result<Option<OnNotFoundPolicy>, DispatchError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    POLICIES
        .into_iter()
        .find(|p| p.as_str().eq_ignore_ascii_case(raw.trim()))
        .map(Some)
        .ok_or_else(|| {
            let expected: Vec<&str> = POLICIES.iter().map(|p| p.as_str()).collect();
            DispatchError::invalid(
                "onNotFoundPolicy",
                format!("expected one of {}, got '{raw}'", expected.join(", ")),
            )
        })
}

pub struct TargetTagService {
    api: Arc<dyn TargetTagApi>,
    pagination: Pagination,
}

impl TargetTagService {
    pub fn new(api: Arc<dyn TargetTagApi>, pagination: Pagination) -> Self {
        Self { api, pagination }
    }

    async fn list(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let map = object_arguments(arguments)?;
        let query = page_query(Arguments::new(&map), ResourceFamily::TargetTag, &self.pagination)?;
        Ok(ToolOutput::Json(self.api.list_tags(&query).await?))
    }

    async fn assigned_targets(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let map = object_arguments(arguments)?;
        let args = Arguments::new(&map);
        require(GET_TARGET_TAG_ASSIGNED_TARGETS, args, &["tagId"])?;
        let tag_id = args.id("tagId")?;
        let query = page_query(args, ResourceFamily::Target, &self.pagination)?;
        Ok(ToolOutput::Json(
            self.api.list_assigned_targets(tag_id, &query).await?,
        ))
    }

    async fn manage(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let command = match gate::<TargetTagCommand>(arguments)? {
            Ok(command) => command,
            Err(preview) => return Ok(preview),
        };
        match command {
            TargetTagCommand::Get { tag_id } => Ok(ToolOutput::Json(self.api.get_tag(tag_id).await?)),
            TargetTagCommand::Create { tags } => {
                Ok(ToolOutput::Json(self.api.create_tags(&tags).await?))
            }
            TargetTagCommand::Update { tag_id, body } => {
                Ok(ToolOutput::Json(self.api.update_tag(tag_id, &body).await?))
            }
            TargetTagCommand::Delete { tag_id } => {
                self.api.delete_tag(tag_id).await?;
                Ok(ToolOutput::message(format!(
                    "Target Tag {tag_id} deleted successfully."
                )))
            }
        }
    }

    async fn manage_assignments(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let command = match gate::<TagAssignmentCommand>(arguments)? {
            Ok(command) => command,
            Err(preview) => return Ok(preview),
        };
        let count = command.controller_ids.len();
        if command.assign {
            self.api
                .assign_targets(command.tag_id, &command.controller_ids, command.on_not_found)
                .await?;
            Ok(ToolOutput::message(format!(
                "{count} target(s) assigned to tag {}.",
                command.tag_id
            )))
        } else {
            self.api
                .unassign_targets(command.tag_id, &command.controller_ids, command.on_not_found)
                .await?;
            Ok(ToolOutput::message(format!(
                "{count} target(s) unassigned from tag {}.",
                command.tag_id
            )))
        }
    }
}

#[async_trait]
impl ResourceService for TargetTagService {
    fn name(&self) -> &'static str {
        "target_tag"
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        let policies: Vec<&str> = POLICIES.iter().map(|p| p.as_str()).collect();
        vec![
            read_tool(
                GET_TARGET_TAGS,
                "Get all target tags, paged and optionally filtered",
                SchemaBuilder::new()
                    .paging(ResourceFamily::TargetTag, GET_TARGET_TAG_SEARCH_FIELDS)
                    .build(),
            ),
            action_tool(
                &MANAGE_TARGET_TAG,
                "Manages target tags (Get single, Create, Update, Delete). Create takes a list.",
                SchemaBuilder::new()
                    .actions(&MANAGE_TARGET_TAG, "The action to perform (GET, CREATE, UPDATE, DELETE)")
                    .integer("tagId", "The tag ID. Required for GET, UPDATE and DELETE")
                    .object_list("createBody", "Tags to create ({name, description, colour}). Required for CREATE")
                    .object("updateBody", "Fields to update. Required for UPDATE")
                    .confirm()
                    .build(),
            ),
            action_tool(
                &MANAGE_TAG_ASSIGNMENTS,
                "Assigns targets to a tag or removes them from it",
                SchemaBuilder::new()
                    .actions(&MANAGE_TAG_ASSIGNMENTS, "The action to perform (ASSIGN, UNASSIGN)")
                    .integer("tagId", "The tag ID")
                    .required("tagId")
                    .string_list("controllerIds", "Controller IDs of the targets")
                    .required("controllerIds")
                    .enumeration(
                        "onNotFoundPolicy",
                        "What the server does when some controller IDs are unknown. Default FAIL.",
                        &policies,
                    )
                    .confirm()
                    .build(),
            ),
            read_tool(
                GET_TARGET_TAG_ASSIGNED_TARGETS,
                "Get the targets carrying a tag, paged and optionally filtered",
                SchemaBuilder::new()
                    .integer("tagId", "The tag ID")
                    .required("tagId")
                    .paging(ResourceFamily::Target, TARGET_SEARCH_FIELDS)
                    .build(),
            ),
            search_fields_tool(GET_TARGET_TAG_SEARCH_FIELDS, ResourceFamily::TargetTag),
        ]
    }

    async fn call(&self, tool: &str, arguments: Value) -> Result<ToolOutput, DispatchError> {
        match tool {
            GET_TARGET_TAGS => self.list(arguments).await,
            GET_TARGET_TAG_ASSIGNED_TARGETS => self.assigned_targets(arguments).await,
            GET_TARGET_TAG_SEARCH_FIELDS => Ok(ToolOutput::message(describe_searchable_fields(
                ResourceFamily::TargetTag,
            ))),
            t if t == MANAGE_TARGET_TAG.tool => self.manage(arguments).await,
            t if t == MANAGE_TAG_ASSIGNMENTS.tool => self.manage_assignments(arguments).await,
            other => Err(not_served(self.name(), other)),
        }
    }
}
