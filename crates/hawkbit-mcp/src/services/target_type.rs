//! Target types and their compatible distribution set types.

use async_trait::async_trait;
use hawkbit_client::TargetTypeApi;
use hawkbit_client::models::{IdRef, TargetTypeCreate, TargetTypeUpdate};
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

pub const GET_TARGET_TYPES: &str = "getTargetTypes";
pub const GET_TARGET_TYPE_SEARCH_FIELDS: &str = "getTargetTypeSearchFields";

pub static MANAGE_TARGET_TYPE: ActionSpace = ActionSpace {
    tool: "manageTargetType",
    discriminator: "action",
    actions: &[
        ActionDescriptor::read("GET", &["targetTypeId"]),
        ActionDescriptor::write("CREATE", &["createBody"]),
        ActionDescriptor::write("UPDATE", &["targetTypeId", "updateBody"]),
        ActionDescriptor::delete("DELETE", &["targetTypeId"]),
    ],
};

pub static MANAGE_COMPATIBILITY: ActionSpace = ActionSpace {
    tool: "manageTargetTypeCompatibility",
    discriminator: "action",
    actions: &[
        ActionDescriptor::read("LIST", &["targetTypeId"]),
        ActionDescriptor::write("ADD", &["targetTypeId", "distributionSetTypeIds"]),
        ActionDescriptor::delete("REMOVE", &["targetTypeId", "distributionSetTypeIds"]),
    ],
};

#[derive(Debug, Clone, PartialEq)]
pub enum TargetTypeCommand {
    Get { target_type_id: i64 },
    Create { types: Vec<TargetTypeCreate> },
    Update { target_type_id: i64, body: TargetTypeUpdate },
    Delete { target_type_id: i64 },
}

impl Command for TargetTypeCommand {
    fn space() -> &'static ActionSpace {
        &MANAGE_TARGET_TYPE
    }

    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError> {
        Ok(match descriptor.action {
            "GET" => TargetTypeCommand::Get {
                target_type_id: args.id("targetTypeId")?,
            },
            "CREATE" => TargetTypeCommand::Create {
                types: args.list("createBody")?,
            },
            "UPDATE" => TargetTypeCommand::Update {
                target_type_id: args.id("targetTypeId")?,
                body: args.body("updateBody")?,
            },
            _ => TargetTypeCommand::Delete {
                target_type_id: args.id("targetTypeId")?,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompatibilityCommand {
    List { target_type_id: i64 },
    Add { target_type_id: i64, ds_type_ids: Vec<i64> },
    Remove { target_type_id: i64, ds_type_id: i64 },
}

impl Command for CompatibilityCommand {
    fn space() -> &'static ActionSpace {
        &MANAGE_COMPATIBILITY
    }

    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError> {
        let target_type_id = args.id("targetTypeId")?;
        Ok(match descriptor.action {
            "LIST" => CompatibilityCommand::List { target_type_id },
            "ADD" => CompatibilityCommand::Add {
                target_type_id,
                ds_type_ids: args.id_list("distributionSetTypeIds")?,
            },
            _ => {
                // The server removes one type per call.
                let ids = args.id_list("distributionSetTypeIds")?;
                let ds_type_id = match ids.as_slice() {
                    [id] => *id,
                    _ => {
                        return Err(DispatchError::invalid(
                            "distributionSetTypeIds",
                            format!("REMOVE takes exactly one id, got {}", ids.len()),
                        ));
                    }
                };
                CompatibilityCommand::Remove {
                    target_type_id,
                    ds_type_id,
                }
            }
        })
    }
}

pub struct TargetTypeService {
    api: Arc<dyn TargetTypeApi>,
    pagination: Pagination,
}

impl TargetTypeService {
    pub fn new(api: Arc<dyn TargetTypeApi>, pagination: Pagination) -> Self {
        Self { api, pagination }
    }

    async fn list(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let map = object_arguments(arguments)?;
        let query = page_query(Arguments::new(&map), ResourceFamily::TargetType, &self.pagination)?;
        Ok(ToolOutput::Json(self.api.list_target_types(&query).await?))
    }

    async fn manage(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let command = match gate::<TargetTypeCommand>(arguments)? {
            Ok(command) => command,
            Err(preview) => return Ok(preview),
        };
        match command {
            TargetTypeCommand::Get { target_type_id } => Ok(ToolOutput::Json(
                self.api.get_target_type(target_type_id).await?,
            )),
            TargetTypeCommand::Create { types } => {
                Ok(ToolOutput::Json(self.api.create_target_types(&types).await?))
            }
            TargetTypeCommand::Update {
                target_type_id,
                body,
            } => Ok(ToolOutput::Json(
                self.api.update_target_type(target_type_id, &body).await?,
            )),
            TargetTypeCommand::Delete { target_type_id } => {
                self.api.delete_target_type(target_type_id).await?;
                Ok(ToolOutput::message(format!(
                    "Target Type {target_type_id} deleted successfully."
                )))
            }
        }
    }

    async fn manage_compatibility(&self, arguments: Value) -> Result<ToolOutput, DispatchError> {
        let command = match gate::<CompatibilityCommand>(arguments)? {
            Ok(command) => command,
            Err(preview) => return Ok(preview),
        };
        match command {
            CompatibilityCommand::List { target_type_id } => Ok(ToolOutput::Json(
                self.api.list_compatible_ds_types(target_type_id).await?,
            )),
            CompatibilityCommand::Add {
                target_type_id,
                ds_type_ids,
            } => {
                let refs: Vec<IdRef> = ds_type_ids.iter().copied().map(IdRef::new).collect();
                self.api.add_compatible_ds_types(target_type_id, &refs).await?;
                Ok(ToolOutput::message(format!(
                    "{} distribution set type(s) added to target type {target_type_id}.",
                    refs.len()
                )))
            }
            CompatibilityCommand::Remove {
                target_type_id,
                ds_type_id,
            } => {
                self.api
                    .remove_compatible_ds_type(target_type_id, ds_type_id)
                    .await?;
                Ok(ToolOutput::message(format!(
                    "Distribution set type {ds_type_id} removed from target type {target_type_id}."
                )))
            }
        }
    }
}

#[async_trait]
impl ResourceService for TargetTypeService {
    fn name(&self) -> &'static str {
        "target_type"
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            read_tool(
                GET_TARGET_TYPES,
                "Get all target types, paged and optionally filtered",
                SchemaBuilder::new()
                    .paging(ResourceFamily::TargetType, GET_TARGET_TYPE_SEARCH_FIELDS)
                    .build(),
            ),
            action_tool(
                &MANAGE_TARGET_TYPE,
                "Manages target types (Get single, Create, Update, Delete). Create takes a list.",
                SchemaBuilder::new()
                    .actions(&MANAGE_TARGET_TYPE, "The action to perform (GET, CREATE, UPDATE, DELETE)")
                    .integer("targetTypeId", "The target type ID. Required for GET, UPDATE and DELETE")
                    .object_list(
                        "createBody",
                        "Target types to create ({name, key, description, colour, compatibledistributionsettypes: [{id}]}). Required for CREATE",
                    )
                    .object("updateBody", "Fields to update. Required for UPDATE")
                    .confirm()
                    .build(),
            ),
            action_tool(
                &MANAGE_COMPATIBILITY,
                "Lists, adds or removes the distribution set types a target type is compatible with",
                SchemaBuilder::new()
                    .actions(&MANAGE_COMPATIBILITY, "The action to perform (LIST, ADD, REMOVE)")
                    .integer("targetTypeId", "The target type ID")
                    .required("targetTypeId")
                    .integer_list(
                        "distributionSetTypeIds",
                        "Distribution set type IDs. Required for ADD; REMOVE takes exactly one",
                    )
                    .confirm()
                    .build(),
            ),
            search_fields_tool(GET_TARGET_TYPE_SEARCH_FIELDS, ResourceFamily::TargetType),
        ]
    }

    async fn call(&self, tool: &str, arguments: Value) -> Result<ToolOutput, DispatchError> {
        match tool {
            GET_TARGET_TYPES => self.list(arguments).await,
            GET_TARGET_TYPE_SEARCH_FIELDS => Ok(ToolOutput::message(describe_searchable_fields(
                ResourceFamily::TargetType,
            ))),
            t if t == MANAGE_TARGET_TYPE.tool => self.manage(arguments).await,
            t if t == MANAGE_COMPATIBILITY.tool => self.manage_compatibility(arguments).await,
            other => Err(not_served(self.name(), other)),
        }
    }
}
