//! Rollout tools: CRUD, lifecycle control and group inspection.
//!
//! Lifecycle verbs are sent to the server without reading the rollout's
//! current state first. The server is the authority on whether a transition
//! is legal; a rejection comes back as a remote error carrying a hint that
//! names the states the verb is accepted from.

use async_trait::async_trait;
use hawkbit_client::RolloutApi;
use hawkbit_client::models::{RolloutCreate, RolloutUpdate};
use hawkbit_core::{LifecycleVerb, Pagination, ResourceFamily, describe_searchable_fields};
use serde_json::{Value, json};
use std::sync::Arc;

use super::schema::{SchemaBuilder, action_tool, read_tool, search_fields_tool};
use super::{ResourceService, gate, not_served, object_arguments, page_query};
use crate::arguments::Arguments;
use crate::dispatch::{ActionDescriptor, ActionSpace, Command};
use crate::error::DispatchError;
use crate::output::ToolOutput;
use crate::protocol::ToolDefinition;

pub const GET_ROLLOUTS: &str = "getRollouts";
pub const GET_ROLLOUT_SEARCH_FIELDS: &str = "getRolloutSearchFields";
pub const GET_ROLLOUT_GROUP_SEARCH_FIELDS: &str = "getRolloutGroupSearchFields";

pub static MANAGE_ROLLOUT: ActionSpace = ActionSpace {
    tool: "manageRollout",
    discriminator: "action",
    actions: &[
        ActionDescriptor::read("GET", &["rolloutId"]),
        ActionDescriptor::write("CREATE", &["createBody"]),
        ActionDescriptor::write("UPDATE", &["rolloutId", "updateBody"]),
        ActionDescriptor::delete("DELETE", &["rolloutId"]),
    ],
};

pub static MANAGE_ROLLOUT_STATE: ActionSpace = ActionSpace {
    tool: "manageRolloutState",
    discriminator: "action",
    actions: &[
        ActionDescriptor::write("START", &["rolloutId"]),
        ActionDescriptor::write("PAUSE", &["rolloutId"]),
        ActionDescriptor::write("RESUME", &["rolloutId"]),
        ActionDescriptor::write("TRIGGER_NEXT_GROUP", &["rolloutId"]),
        ActionDescriptor::write("APPROVE", &["rolloutId"]).with_optional(&["remark"]),
        ActionDescriptor::write("DENY", &["rolloutId"]).with_optional(&["remark"]),
        ActionDescriptor::write("RETRY", &["rolloutId"]),
    ],
};

pub static MANAGE_ROLLOUT_GROUPS: ActionSpace = ActionSpace {
    tool: "manageRolloutGroups",
    discriminator: "view",
    actions: &[
        ActionDescriptor::read("LIST_GROUPS", &["rolloutId"]),
        ActionDescriptor::read("GET_GROUP", &["rolloutId", "groupId"]),
        ActionDescriptor::read("LIST_GROUP_TARGETS", &["rolloutId", "groupId"]),
    ],
};

#[derive(Debug, Clone, PartialEq)]
pub enum RolloutCommand {
    Get { rollout_id: i64 },
    Create { body: RolloutCreate },
    Update { rollout_id: i64, body: RolloutUpdate },
    Delete { rollout_id: i64 },
}

impl Command for RolloutCommand {
    fn space() -> &'static ActionSpace {
        &MANAGE_ROLLOUT
    }

    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError> {
        Ok(match descriptor.action {
            "GET" => RolloutCommand::Get {
                rollout_id: args.id("rolloutId")?,
            },
            "CREATE" => RolloutCommand::Create {
                body: args.body("createBody")?,
            },
            "UPDATE" => RolloutCommand::Update {
                rollout_id: args.id("rolloutId")?,
                body: args.body("updateBody")?,
            },
            _ => RolloutCommand::Delete {
                rollout_id: args.id("rolloutId")?,
            },
        })
    }
}

/// One lifecycle transition request.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleCommand {
    pub rollout_id: i64,
    pub verb: LifecycleVerb,
    /// Sent with APPROVE and DENY; empty when not given.
    pub remark: String,
}

impl LifecycleCommand {
    /// Hint attached to a rejected transition.
    pub fn rejection_hint(&self) -> String {
        let states: Vec<&str> = self.verb.valid_from().iter().map(|s| s.as_str()).collect();
        format!(
            "{} is only accepted while the rollout is {}",
            self.verb,
            states.join(" or ")
        )
    }
}

impl Command for LifecycleCommand {
    fn space() -> &'static ActionSpace {
        &MANAGE_ROLLOUT_STATE
    }

    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError> {
        let verb = LifecycleVerb::parse(descriptor.action)
            .ok_or_else(|| DispatchError::invalid("action", "not a lifecycle verb"))?;
        let remark = if verb.takes_remark() {
            args.raw_string("remark")?.unwrap_or_default()
        } else {
            String::new()
        };
        Ok(LifecycleCommand {
            rollout_id: args.id("rolloutId")?,
            verb,
            remark,
        })
    }

    fn preview_details(&self) -> Vec<(&'static str, Value)> {
        let valid_from: Vec<&str> = self.verb.valid_from().iter().map(|s| s.as_str()).collect();
        let mut details = vec![("validFrom", json!(valid_from))];
        if let Some(target) = self.verb.expected_target() {
            details.push(("expectedState", json!(target.as_str())));
        }
        details
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutGroupView {
    ListGroups { rollout_id: i64 },
    GetGroup { rollout_id: i64, group_id: i64 },
    ListGroupTargets { rollout_id: i64, group_id: i64 },
}

impl Command for RolloutGroupView {
    fn space() -> &'static ActionSpace {
        &MANAGE_ROLLOUT_GROUPS
    }

    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError> {
        let rollout_id = args.id("rolloutId")?;
        Ok(match descriptor.action {
            "LIST_GROUPS" => RolloutGroupView::ListGroups { rollout_id },
            "GET_GROUP" => RolloutGroupView::GetGroup {
                rollout_id,
                group_id: args.id("groupId")?,
            },
            _ => RolloutGroupView::ListGroupTargets {
                rollout_id,
                group_id: args.id("groupId")?,
            },
        })
    }
}

pub struct RolloutService {
    api: Arc<dyn RolloutApi>,
    pagination: Pagination,
}

impl RolloutService {
    pub fn new(api: Arc<dyn RolloutApi>, pagination: Pagination) -> Self {
        Self { api, pagination }
    }

    async fn list(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let map = object_arguments(arguments)?;
        let query = page_query(Arguments::new(&map), ResourceFamily::Rollout, &self.pagination)?;
        Ok(ToolOutput::Json(self.api.list_rollouts(&query).await?))
    }

    async fn manage(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let command = match gate::<RolloutCommand>(arguments)? {
            Ok(command) => command,
            Err(preview) => return Ok(preview),
        };
        match command {
            RolloutCommand::Get { rollout_id } => {
                Ok(ToolOutput::Json(self.api.get_rollout(rollout_id).await?))
            }
            RolloutCommand::Create { body } => {
                Ok(ToolOutput::Json(self.api.create_rollout(&body).await?))
            }
            RolloutCommand::Update { rollout_id, body } => Ok(ToolOutput::Json(
                self.api.update_rollout(rollout_id, &body).await?,
            )),
            RolloutCommand::Delete { rollout_id } => {
                self.api.delete_rollout(rollout_id).await?;
                Ok(ToolOutput::message(format!(
                    "Rollout {rollout_id} deleted successfully."
                )))
            }
        }
    }

    async fn manage_state(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let command = match gate::<LifecycleCommand>(arguments)? {
            Ok(command) => command,
            Err(preview) => return Ok(preview),
        };
        let id = command.rollout_id;
        let outcome = match command.verb {
            LifecycleVerb::Start => self
                .api
                .start_rollout(id)
                .await
                .map(|()| ToolOutput::message(format!("Rollout {id} started."))),
            LifecycleVerb::Pause => self
                .api
                .pause_rollout(id)
                .await
                .map(|()| ToolOutput::message(format!("Rollout {id} paused."))),
            LifecycleVerb::Resume => self
                .api
                .resume_rollout(id)
                .await
                .map(|()| ToolOutput::message(format!("Rollout {id} resumed."))),
            LifecycleVerb::TriggerNextGroup => self.api.trigger_next_group(id).await.map(|()| {
                ToolOutput::message(format!("Next group processing triggered for Rollout {id}"))
            }),
            LifecycleVerb::Approve => self
                .api
                .approve_rollout(id, &command.remark)
                .await
                .map(|()| ToolOutput::message(format!("Rollout {id} approved."))),
            LifecycleVerb::Deny => self
                .api
                .deny_rollout(id, &command.remark)
                .await
                .map(|()| ToolOutput::message(format!("Rollout {id} denied."))),
            // The server answers with the new rollout.
            LifecycleVerb::Retry => self.api.retry_rollout(id).await.map(ToolOutput::Json),
        };
        match outcome {
            Ok(output) => {
                tracing::info!(rollout_id = id, verb = %command.verb, "Rollout transition accepted");
                Ok(output)
            }
            Err(err) => {
                let hint = if err.status().is_some() {
                    Some(command.rejection_hint())
                } else {
                    None
                };
                let err = DispatchError::from(err);
                Err(match hint {
                    Some(hint) => err.with_hint(hint),
                    None => err,
                })
            }
        }
    }

    async fn groups(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let paging = object_arguments(arguments.clone())?;
        let view = match gate::<RolloutGroupView>(arguments)? {
            Ok(view) => view,
            Err(preview) => return Ok(preview),
        };
        let paging = Arguments::new(&paging);
        let result = match view {
            RolloutGroupView::ListGroups { rollout_id } => {
                let query = page_query(paging, ResourceFamily::RolloutGroup, &self.pagination)?;
                self.api.list_rollout_groups(rollout_id, &query).await?
            }
            RolloutGroupView::GetGroup {
                rollout_id,
                group_id,
            } => self.api.get_rollout_group(rollout_id, group_id).await?,
            RolloutGroupView::ListGroupTargets {
                rollout_id,
                group_id,
            } => {
                let query = page_query(paging, ResourceFamily::Target, &self.pagination)?;
                self.api
                    .list_rollout_group_targets(rollout_id, group_id, &query)
                    .await?
            }
        };
        Ok(ToolOutput::Json(result))
    }
}

#[async_trait]
impl ResourceService for RolloutService {
    fn name(&self) -> &'static str {
        "rollout"
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            read_tool(
                GET_ROLLOUTS,
                "Get all rollouts, paged and optionally filtered",
                SchemaBuilder::new()
                    .paging(ResourceFamily::Rollout, GET_ROLLOUT_SEARCH_FIELDS)
                    .build(),
            ),
            action_tool(
                &MANAGE_ROLLOUT,
                "Manages rollouts (Get single, Create, Update, Delete)",
                SchemaBuilder::new()
                    .actions(&MANAGE_ROLLOUT, "The action to perform (GET, CREATE, UPDATE, DELETE)")
                    .integer("rolloutId", "The rollout ID. Required for GET, UPDATE and DELETE")
                    .object(
                        "createBody",
                        "Rollout to create: name, distributionSetId and targetFilterQuery are mandatory; amountGroups, type, startAt, confirmationRequired are optional. Required for CREATE",
                    )
                    .object("updateBody", "Fields to update (name, description). Required for UPDATE")
                    .confirm()
                    .build(),
            ),
            action_tool(
                &MANAGE_ROLLOUT_STATE,
                "Drives the rollout lifecycle: START (from READY), PAUSE (RUNNING), RESUME (PAUSED), TRIGGER_NEXT_GROUP (RUNNING), APPROVE/DENY (WAITING_FOR_APPROVAL), RETRY (ERROR). The server decides whether the transition is legal.",
                SchemaBuilder::new()
                    .actions(&MANAGE_ROLLOUT_STATE, "The lifecycle verb to apply")
                    .integer("rolloutId", "The rollout ID")
                    .required("rolloutId")
                    .string("remark", "Remark for APPROVE and DENY")
                    .confirm()
                    .build(),
            ),
            action_tool(
                &MANAGE_ROLLOUT_GROUPS,
                "Reads the deployment groups of a rollout and the targets assigned to a group",
                SchemaBuilder::new()
                    .actions(&MANAGE_ROLLOUT_GROUPS, "What to read (LIST_GROUPS, GET_GROUP, LIST_GROUP_TARGETS)")
                    .integer("rolloutId", "The rollout ID")
                    .required("rolloutId")
                    .integer("groupId", "The group ID. Required for GET_GROUP and LIST_GROUP_TARGETS")
                    .paging(ResourceFamily::RolloutGroup, GET_ROLLOUT_GROUP_SEARCH_FIELDS)
                    .build(),
            ),
            search_fields_tool(GET_ROLLOUT_SEARCH_FIELDS, ResourceFamily::Rollout),
            search_fields_tool(GET_ROLLOUT_GROUP_SEARCH_FIELDS, ResourceFamily::RolloutGroup),
        ]
    }

    async fn call(&self, tool: &str, arguments: Value) -> Result<ToolOutput, DispatchError> {
        match tool {
            GET_ROLLOUTS => self.list(arguments).await,
            GET_ROLLOUT_SEARCH_FIELDS => Ok(ToolOutput::message(describe_searchable_fields(
                ResourceFamily::Rollout,
            ))),
            GET_ROLLOUT_GROUP_SEARCH_FIELDS => Ok(ToolOutput::message(
                describe_searchable_fields(ResourceFamily::RolloutGroup),
            )),
            t if t == MANAGE_ROLLOUT.tool => self.manage(arguments).await,
            t if t == MANAGE_ROLLOUT_STATE.tool => self.manage_state(arguments).await,
            t if t == MANAGE_ROLLOUT_GROUPS.tool => self.groups(arguments).await,
            other => Err(not_served(self.name(), other)),
        }
    }
}
