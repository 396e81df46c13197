//! Target (device) tools.

use async_trait::async_trait;
use hawkbit_client::TargetApi;
use hawkbit_client::models::{
    ActionConfirmation, ActionUpdate, AutoConfirmActivation, ConfirmationDecision,
    DistributionSetAssignment, MetadataEntry, MetadataValue, TargetCreate, TargetUpdate,
};
use hawkbit_core::{PageQuery, Pagination, ResourceFamily, describe_searchable_fields};
use serde_json::Value;
use std::sync::Arc;

use super::schema::{SchemaBuilder, action_tool, read_tool, search_fields_tool};
use super::{ResourceService, gate, not_served, object_arguments, page_query, require};
use crate::arguments::Arguments;
use crate::composite;
use crate::dispatch::{ActionDescriptor, ActionSpace, Command};
use crate::error::DispatchError;
use crate::output::ToolOutput;
use crate::protocol::ToolDefinition;

pub const GET_TARGETS: &str = "getTargets";
pub const GET_TARGET_DETAILS: &str = "getTargetDetails";
pub const GET_TARGET_SEARCH_FIELDS: &str = "getTargetSearchFields";

/// Discovery tool for action history filters; served by the action service.
const ACTION_SEARCH_FIELDS: &str = "getActionSearchFields";

pub static MANAGE_TARGET: ActionSpace = ActionSpace {
    tool: "manageTarget",
    discriminator: "action",
    actions: &[
        ActionDescriptor::read("GET", &["controllerId"]),
        ActionDescriptor::write("CREATE", &["createBody"]),
        ActionDescriptor::write("UPDATE", &["controllerId", "updateBody"]),
        ActionDescriptor::delete("DELETE", &["controllerId"]),
    ],
};

pub static MANAGE_TARGET_METADATA: ActionSpace = ActionSpace {
    tool: "manageTargetMetadata",
    discriminator: "action",
    actions: &[
        ActionDescriptor::read("LIST", &["controllerId"]),
        ActionDescriptor::read("GET", &["controllerId", "metadataKey"]),
        ActionDescriptor::write("CREATE", &["controllerId", "metadata"]),
        ActionDescriptor::write("UPDATE", &["controllerId", "metadataKey", "value"])
            .allow_empty(&["value"]),
        ActionDescriptor::delete("DELETE", &["controllerId", "metadataKey"]),
    ],
};

pub static MANAGE_TARGET_DISTRIBUTION_SET: ActionSpace = ActionSpace {
    tool: "manageTargetDistributionSet",
    discriminator: "action",
    actions: &[
        ActionDescriptor::read("GET_ASSIGNED", &["controllerId"]),
        ActionDescriptor::read("GET_INSTALLED", &["controllerId"]),
        ActionDescriptor::write("ASSIGN", &["controllerId", "assignments"])
            .with_optional(&["offline"]),
    ],
};

pub static MANAGE_TARGET_ACTIONS: ActionSpace = ActionSpace {
    tool: "manageTargetActions",
    discriminator: "action",
    actions: &[
        ActionDescriptor::read("LIST", &["controllerId"]),
        ActionDescriptor::read("GET", &["controllerId", "actionId"]),
        ActionDescriptor::read("GET_STATUS", &["controllerId", "actionId"]),
        ActionDescriptor::delete("CANCEL", &["controllerId", "actionId"]).with_optional(&["force"]),
        ActionDescriptor::write("UPDATE", &["controllerId", "actionId", "updateBody"]),
        ActionDescriptor::write(
            "UPDATE_CONFIRMATION",
            &["controllerId", "actionId", "confirmationBody"],
        ),
    ],
};

pub static MANAGE_TARGET_TYPE_ASSIGNMENT: ActionSpace = ActionSpace {
    tool: "manageTargetTypeAssignment",
    discriminator: "action",
    actions: &[
        ActionDescriptor::write("ASSIGN", &["controllerId", "targetTypeId"]),
        ActionDescriptor::delete("UNASSIGN", &["controllerId"]),
    ],
};

pub static MANAGE_TARGET_AUTO_CONFIRM: ActionSpace = ActionSpace {
    tool: "manageTargetAutoConfirm",
    discriminator: "action",
    actions: &[
        ActionDescriptor::write("ACTIVATE", &["controllerId"]).with_optional(&["initiator", "remark"]),
        ActionDescriptor::write("DEACTIVATE", &["controllerId"]),
    ],
};

/// Decoded `manageTarget` call.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetCommand {
    Get { controller_id: String },
    Create { targets: Vec<TargetCreate> },
    Update { controller_id: String, body: TargetUpdate },
    Delete { controller_id: String },
}

impl Command for TargetCommand {
    fn space() -> &'static ActionSpace {
        &MANAGE_TARGET
    }

    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError> {
        Ok(match descriptor.action {
            "GET" => TargetCommand::Get {
                controller_id: args.string("controllerId")?,
            },
            "CREATE" => TargetCommand::Create {
                targets: args.list("createBody")?,
            },
            "UPDATE" => TargetCommand::Update {
                controller_id: args.string("controllerId")?,
                body: args.body("updateBody")?,
            },
            _ => TargetCommand::Delete {
                controller_id: args.string("controllerId")?,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TargetMetadataCommand {
    List { controller_id: String },
    Get { controller_id: String, key: String },
    Create { controller_id: String, entries: Vec<MetadataEntry> },
    Update { controller_id: String, key: String, value: String },
    Delete { controller_id: String, key: String },
}

impl Command for TargetMetadataCommand {
    fn space() -> &'static ActionSpace {
        &MANAGE_TARGET_METADATA
    }

    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError> {
        let controller_id = args.string("controllerId")?;
        Ok(match descriptor.action {
            "LIST" => TargetMetadataCommand::List { controller_id },
            "GET" => TargetMetadataCommand::Get {
                controller_id,
                key: args.string("metadataKey")?,
            },
            "CREATE" => TargetMetadataCommand::Create {
                controller_id,
                entries: args.list("metadata")?,
            },
            "UPDATE" => TargetMetadataCommand::Update {
                controller_id,
                key: args.string("metadataKey")?,
                value: args
                    .raw_string("value")?
                    .ok_or_else(|| DispatchError::invalid("value", "a value is required"))?,
            },
            _ => TargetMetadataCommand::Delete {
                controller_id,
                key: args.string("metadataKey")?,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TargetDistributionSetCommand {
    GetAssigned { controller_id: String },
    GetInstalled { controller_id: String },
    Assign {
        controller_id: String,
        assignments: Vec<DistributionSetAssignment>,
        offline: Option<bool>,
    },
}

impl Command for TargetDistributionSetCommand {
    fn space() -> &'static ActionSpace {
        &MANAGE_TARGET_DISTRIBUTION_SET
    }

    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError> {
        let controller_id = args.string("controllerId")?;
        Ok(match descriptor.action {
            "GET_ASSIGNED" => TargetDistributionSetCommand::GetAssigned { controller_id },
            "GET_INSTALLED" => TargetDistributionSetCommand::GetInstalled { controller_id },
            _ => TargetDistributionSetCommand::Assign {
                controller_id,
                assignments: args.list("assignments")?,
                offline: args.opt_bool("offline")?,
            },
        })
    }
}

/// Decoded `manageTargetActions` call. Paging is resolved by the service.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetActionCommand {
    List { controller_id: String },
    Get { controller_id: String, action_id: i64 },
    GetStatus { controller_id: String, action_id: i64 },
    Cancel {
        controller_id: String,
        action_id: i64,
        force: Option<bool>,
    },
    Update {
        controller_id: String,
        action_id: i64,
        body: ActionUpdate,
    },
    UpdateConfirmation {
        controller_id: String,
        action_id: i64,
        body: ActionConfirmation,
    },
}

impl Command for TargetActionCommand {
    fn space() -> &'static ActionSpace {
        &MANAGE_TARGET_ACTIONS
    }

    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError> {
        let controller_id = args.string("controllerId")?;
        if descriptor.action == "LIST" {
            return Ok(TargetActionCommand::List { controller_id });
        }
        let action_id = args.id("actionId")?;
        Ok(match descriptor.action {
            "GET" => TargetActionCommand::Get {
                controller_id,
                action_id,
            },
            "GET_STATUS" => TargetActionCommand::GetStatus {
                controller_id,
                action_id,
            },
            "CANCEL" => TargetActionCommand::Cancel {
                controller_id,
                action_id,
                force: args.opt_bool("force")?,
            },
            "UPDATE" => TargetActionCommand::Update {
                controller_id,
                action_id,
                body: args.body("updateBody")?,
            },
            _ => TargetActionCommand::UpdateConfirmation {
                controller_id,
                action_id,
                body: args.body("confirmationBody")?,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TargetTypeAssignmentCommand {
    Assign {
        controller_id: String,
        target_type_id: i64,
    },
    Unassign { controller_id: String },
}

impl Command for TargetTypeAssignmentCommand {
    fn space() -> &'static ActionSpace {
        &MANAGE_TARGET_TYPE_ASSIGNMENT
    }

    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError> {
        let controller_id = args.string("controllerId")?;
        Ok(match descriptor.action {
            "ASSIGN" => TargetTypeAssignmentCommand::Assign {
                controller_id,
                target_type_id: args.id("targetTypeId")?,
            },
            _ => TargetTypeAssignmentCommand::Unassign { controller_id },
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AutoConfirmCommand {
    Activate {
        controller_id: String,
        activation: AutoConfirmActivation,
    },
    Deactivate { controller_id: String },
}

impl Command for AutoConfirmCommand {
    fn space() -> &'static ActionSpace {
        &MANAGE_TARGET_AUTO_CONFIRM
    }

    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError> {
        let controller_id = args.string("controllerId")?;
        Ok(match descriptor.action {
            "ACTIVATE" => AutoConfirmCommand::Activate {
                controller_id,
                activation: AutoConfirmActivation {
                    initiator: args.opt_string("initiator")?,
                    remark: args.opt_string("remark")?,
                },
            },
            _ => AutoConfirmCommand::Deactivate { controller_id },
        })
    }
}

/// Tools for targets and their sub-resources.
pub struct TargetService {
    api: Arc<dyn TargetApi>,
    pagination: Pagination,
}

impl TargetService {
    pub fn new(api: Arc<dyn TargetApi>, pagination: Pagination) -> Self {
        Self { api, pagination }
    }

    async fn list(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let map = object_arguments(arguments)?;
        let query = page_query(Arguments::new(&map), ResourceFamily::Target, &self.pagination)?;
        Ok(ToolOutput::Json(self.api.list_targets(&query).await?))
    }

    async fn details(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let map = object_arguments(arguments)?;
        let args = Arguments::new(&map);
        require(GET_TARGET_DETAILS, args, &["controllerId"])?;
        let controller_id = args.string("controllerId")?;
        let report = composite::target_details(self.api.as_ref(), &controller_id).await?;
        Ok(ToolOutput::Json(report))
    }

    async fn manage(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let command = match gate::<TargetCommand>(arguments)? {
            Ok(command) => command,
            Err(preview) => return Ok(preview),
        };
        match command {
            TargetCommand::Get { controller_id } => {
                Ok(ToolOutput::Json(self.api.get_target(&controller_id).await?))
            }
            TargetCommand::Create { targets } => {
                Ok(ToolOutput::Json(self.api.create_targets(&targets).await?))
            }
            TargetCommand::Update {
                controller_id,
                body,
            } => Ok(ToolOutput::Json(
                self.api.update_target(&controller_id, &body).await?,
            )),
            TargetCommand::Delete { controller_id } => {
                self.api.delete_target(&controller_id).await?;
                Ok(ToolOutput::message(format!(
                    "Target {controller_id} deleted successfully."
                )))
            }
        }
    }

    async fn manage_metadata(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let command = match gate::<TargetMetadataCommand>(arguments)? {
            Ok(command) => command,
            Err(preview) => return Ok(preview),
        };
        match command {
            TargetMetadataCommand::List { controller_id } => {
                Ok(ToolOutput::Json(self.api.list_metadata(&controller_id).await?))
            }
            TargetMetadataCommand::Get { controller_id, key } => Ok(ToolOutput::Json(
                self.api.get_metadata(&controller_id, &key).await?,
            )),
            TargetMetadataCommand::Create {
                controller_id,
                entries,
            } => Ok(ToolOutput::Json(
                self.api.create_metadata(&controller_id, &entries).await?,
            )),
            TargetMetadataCommand::Update {
                controller_id,
                key,
                value,
            } => Ok(ToolOutput::Json(
                self.api
                    .update_metadata(&controller_id, &key, &MetadataValue { value })
                    .await?,
            )),
            TargetMetadataCommand::Delete { controller_id, key } => {
                self.api.delete_metadata(&controller_id, &key).await?;
                Ok(ToolOutput::message(format!(
                    "Metadata {key} deleted successfully from target {controller_id}."
                )))
            }
        }
    }

    async fn manage_distribution_set(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let command = match gate::<TargetDistributionSetCommand>(arguments)? {
            Ok(command) => command,
            Err(preview) => return Ok(preview),
        };
        let result = match command {
            TargetDistributionSetCommand::GetAssigned { controller_id } => {
                self.api.get_assigned_distribution_set(&controller_id).await?
            }
            TargetDistributionSetCommand::GetInstalled { controller_id } => {
                self.api.get_installed_distribution_set(&controller_id).await?
            }
            TargetDistributionSetCommand::Assign {
                controller_id,
                assignments,
                offline,
            } => {
                self.api
                    .assign_distribution_set(&controller_id, &assignments, offline)
                    .await?
            }
        };
        Ok(ToolOutput::Json(result))
    }

    async fn manage_actions(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let paging = object_arguments(arguments.clone())?;
        let command = match gate::<TargetActionCommand>(arguments)? {
            Ok(command) => command,
            Err(preview) => return Ok(preview),
        };
        let paging = Arguments::new(&paging);
        match command {
            TargetActionCommand::List { controller_id } => {
                let query = page_query(paging, ResourceFamily::Action, &self.pagination)?;
                Ok(ToolOutput::Json(
                    self.api.list_target_actions(&controller_id, &query).await?,
                ))
            }
            TargetActionCommand::Get {
                controller_id,
                action_id,
            } => Ok(ToolOutput::Json(
                self.api.get_target_action(&controller_id, action_id).await?,
            )),
            TargetActionCommand::GetStatus {
                controller_id,
                action_id,
            } => {
                let query = status_query(paging, &self.pagination)?;
                Ok(ToolOutput::Json(
                    self.api
                        .get_action_status(&controller_id, action_id, &query)
                        .await?,
                ))
            }
            TargetActionCommand::Cancel {
                controller_id,
                action_id,
                force,
            } => {
                self.api.cancel_action(&controller_id, action_id, force).await?;
                Ok(ToolOutput::message(format!(
                    "Action {action_id} of target {controller_id} canceled successfully."
                )))
            }
            TargetActionCommand::Update {
                controller_id,
                action_id,
                body,
            } => Ok(ToolOutput::Json(
                self.api.update_action(&controller_id, action_id, &body).await?,
            )),
            TargetActionCommand::UpdateConfirmation {
                controller_id,
                action_id,
                body,
            } => {
                self.api
                    .update_action_confirmation(&controller_id, action_id, &body)
                    .await?;
                let decision = match body.confirmation {
                    ConfirmationDecision::Confirmed => "confirmed",
                    ConfirmationDecision::Denied => "denied",
                };
                Ok(ToolOutput::message(format!(
                    "Action {action_id} of target {controller_id} {decision}."
                )))
            }
        }
    }

    async fn manage_type_assignment(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let command = match gate::<TargetTypeAssignmentCommand>(arguments)? {
            Ok(command) => command,
            Err(preview) => return Ok(preview),
        };
        match command {
            TargetTypeAssignmentCommand::Assign {
                controller_id,
                target_type_id,
            } => {
                self.api
                    .assign_target_type(&controller_id, target_type_id)
                    .await?;
                Ok(ToolOutput::message(format!(
                    "Target type {target_type_id} assigned to target {controller_id}."
                )))
            }
            TargetTypeAssignmentCommand::Unassign { controller_id } => {
                self.api.unassign_target_type(&controller_id).await?;
                Ok(ToolOutput::message(format!(
                    "Target type unassigned from target {controller_id}."
                )))
            }
        }
    }

    async fn manage_auto_confirm(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let command = match gate::<AutoConfirmCommand>(arguments)? {
            Ok(command) => command,
            Err(preview) => return Ok(preview),
        };
        match command {
            AutoConfirmCommand::Activate {
                controller_id,
                activation,
            } => {
                self.api
                    .activate_auto_confirm(&controller_id, &activation)
                    .await?;
                Ok(ToolOutput::message(format!(
                    "Auto-confirmation activated for target {controller_id}."
                )))
            }
            AutoConfirmCommand::Deactivate { controller_id } => {
                self.api.deactivate_auto_confirm(&controller_id).await?;
                Ok(ToolOutput::message(format!(
                    "Auto-confirmation deactivated for target {controller_id}."
                )))
            }
        }
    }
}

/// Action status lists take offset, limit and sort but no filter.
fn status_query(args: Arguments<'_>, pagination: &Pagination) -> Result<PageQuery, DispatchError> {
    let mut query = page_query(args, ResourceFamily::Action, pagination)?;
    query.filter = None;
    Ok(query)
}

#[async_trait]
impl ResourceService for TargetService {
    fn name(&self) -> &'static str {
        "target"
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            read_tool(
                GET_TARGETS,
                "Get all targets (devices), paged and optionally filtered",
                SchemaBuilder::new()
                    .paging(ResourceFamily::Target, GET_TARGET_SEARCH_FIELDS)
                    .build(),
            ),
            action_tool(
                &MANAGE_TARGET,
                "Manages targets (Get single, Create, Update, Delete). Create takes a list; fill only mandatory fields.",
                SchemaBuilder::new()
                    .actions(&MANAGE_TARGET, "The action to perform (GET, CREATE, UPDATE, DELETE)")
                    .string("controllerId", "The controller ID of the target. Required for GET, UPDATE and DELETE")
                    .object_list("createBody", "List of targets to create (controllerId is mandatory). Required for CREATE")
                    .object("updateBody", "Fields to update. Required for UPDATE")
                    .confirm()
                    .build(),
            ),
            read_tool(
                GET_TARGET_DETAILS,
                "Get a target together with its attributes, tags, assigned and installed distribution sets and metadata. Parts that fail are reported as <part>_error.",
                SchemaBuilder::new()
                    .string("controllerId", "The controller ID of the target")
                    .required("controllerId")
                    .build(),
            ),
            action_tool(
                &MANAGE_TARGET_METADATA,
                "Manages metadata of a target (List, Get, Create, Update, Delete)",
                SchemaBuilder::new()
                    .actions(&MANAGE_TARGET_METADATA, "The action to perform (LIST, GET, CREATE, UPDATE, DELETE)")
                    .string("controllerId", "The controller ID of the target")
                    .required("controllerId")
                    .string("metadataKey", "The metadata key. Required for GET, UPDATE and DELETE")
                    .object_list("metadata", "List of {key, value} entries to create. Required for CREATE")
                    .string("value", "New metadata value. Required for UPDATE")
                    .confirm()
                    .build(),
            ),
            action_tool(
                &MANAGE_TARGET_DISTRIBUTION_SET,
                "Reads the assigned or installed distribution set of a target, or assigns distribution sets to it",
                SchemaBuilder::new()
                    .actions(&MANAGE_TARGET_DISTRIBUTION_SET, "The action to perform (GET_ASSIGNED, GET_INSTALLED, ASSIGN)")
                    .string("controllerId", "The controller ID of the target")
                    .required("controllerId")
                    .object_list("assignments", "Distribution set assignments ({id, type, forcetime, weight, confirmationRequired}). Required for ASSIGN")
                    .boolean("offline", "Offline update: the assigned and installed distribution set are set directly. Only executed if the target has currently no running update")
                    .confirm()
                    .build(),
            ),
            action_tool(
                &MANAGE_TARGET_ACTIONS,
                "Reads the action history of a target and cancels, updates or confirms single actions",
                SchemaBuilder::new()
                    .actions(&MANAGE_TARGET_ACTIONS, "The action to perform (LIST, GET, GET_STATUS, CANCEL, UPDATE, UPDATE_CONFIRMATION)")
                    .string("controllerId", "The controller ID of the target")
                    .required("controllerId")
                    .integer("actionId", "The action ID. Required for every action except LIST")
                    .boolean("force", "Force cancel. Only used by CANCEL")
                    .object("updateBody", "Action update, e.g. {\"forceType\": \"forced\"}. Required for UPDATE")
                    .object("confirmationBody", "{\"confirmation\": \"confirmed\"|\"denied\", \"code\", \"details\"}. Required for UPDATE_CONFIRMATION")
                    .paging(ResourceFamily::Action, ACTION_SEARCH_FIELDS)
                    .confirm()
                    .build(),
            ),
            action_tool(
                &MANAGE_TARGET_TYPE_ASSIGNMENT,
                "Assigns a target type to a target or removes it",
                SchemaBuilder::new()
                    .actions(&MANAGE_TARGET_TYPE_ASSIGNMENT, "The action to perform (ASSIGN, UNASSIGN)")
                    .string("controllerId", "The controller ID of the target")
                    .required("controllerId")
                    .integer("targetTypeId", "The target type ID. Required for ASSIGN")
                    .confirm()
                    .build(),
            ),
            action_tool(
                &MANAGE_TARGET_AUTO_CONFIRM,
                "Activates or deactivates auto-confirmation of a target. While active, all current and future actions are confirmed automatically on behalf of the initiator",
                SchemaBuilder::new()
                    .actions(&MANAGE_TARGET_AUTO_CONFIRM, "The action to perform (ACTIVATE, DEACTIVATE)")
                    .string("controllerId", "The controller ID of the target")
                    .required("controllerId")
                    .string("initiator", "Who activated auto-confirmation. Only used by ACTIVATE")
                    .string("remark", "Remark stored with the activation. Only used by ACTIVATE")
                    .confirm()
                    .build(),
            ),
            search_fields_tool(GET_TARGET_SEARCH_FIELDS, ResourceFamily::Target),
        ]
    }

    async fn call(&self, tool: &str, arguments: Value) -> Result<ToolOutput, DispatchError> {
        match tool {
            GET_TARGETS => self.list(arguments).await,
            GET_TARGET_DETAILS => self.details(arguments).await,
            GET_TARGET_SEARCH_FIELDS => Ok(ToolOutput::message(describe_searchable_fields(
                ResourceFamily::Target,
            ))),
            t if t == MANAGE_TARGET.tool => self.manage(arguments).await,
            t if t == MANAGE_TARGET_METADATA.tool => self.manage_metadata(arguments).await,
            t if t == MANAGE_TARGET_DISTRIBUTION_SET.tool => {
                self.manage_distribution_set(arguments).await
            }
            t if t == MANAGE_TARGET_ACTIONS.tool => self.manage_actions(arguments).await,
            t if t == MANAGE_TARGET_TYPE_ASSIGNMENT.tool => {
                self.manage_type_assignment(arguments).await
            }
            t if t == MANAGE_TARGET_AUTO_CONFIRM.tool => self.manage_auto_confirm(arguments).await,
            other => Err(not_served(self.name(), other)),
        }
    }
}
