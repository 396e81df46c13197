//! Shared test infrastructure for the tool integration tests.
//!
//! This module provides:
//! - A recording in-memory management API (`FakeBackend`)
//! - A `TestContext` wiring it into a full `Toolbox`
//! - Helpers to call tools and read their results

#![allow(dead_code)]

use async_trait::async_trait;
use hawkbit_client::api::ApiResult;
use hawkbit_client::models::{
    ActionConfirmation, ActionUpdate, AutoAssignment, AutoConfirmActivation,
    DistributionSetAssignment, IdRef, MetadataEntry, MetadataValue, OnNotFoundPolicy,
    RolloutCreate, RolloutUpdate, TagCreate, TagUpdate, TargetCreate, TargetFilterCreate,
    TargetFilterUpdate, TargetTypeCreate, TargetTypeUpdate, TargetUpdate,
};
use hawkbit_client::{
    ActionApi, ClientError, RolloutApi, TargetApi, TargetFilterApi, TargetTagApi, TargetTypeApi,
};
use hawkbit_core::{PageQuery, Pagination, PaginationConfig};
use hawkbit_mcp::services::{action, rollout, target, target_filter, target_tag, target_type};
use hawkbit_mcp::{ActionSpace, CallToolResponse, McpError, ToolContent, Toolbox};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// =============================================================================
// FAKE MANAGEMENT API
// =============================================================================

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub operation: &'static str,
    pub args: Value,
}

/// Failure injected for an operation.
#[derive(Debug, Clone)]
pub enum Failure {
    Remote { status: u16, detail: String },
    Auth(String),
    Decode(String),
    /// The request never reached the server.
    Transport,
}

impl Failure {
    fn to_error(&self, operation: &'static str) -> ClientError {
        match self {
            Failure::Remote { status, detail } => ClientError::Remote {
                operation,
                status: *status,
                detail: detail.clone(),
            },
            Failure::Auth(reason) => ClientError::Auth(reason.clone()),
            Failure::Decode(reason) => ClientError::Decode {
                operation,
                reason: reason.clone(),
            },
            Failure::Transport => ClientError::Transport {
                operation,
                source: reqwest::Client::new().get("not a url").build().unwrap_err(),
            },
        }
    }
}

/// In-memory management API that records every call.
///
/// Operations answer `{"operation": <name>, "args": <arguments>}` unless a
/// response or failure was configured for them.
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<HashMap<&'static str, Value>>,
    failures: Mutex<HashMap<&'static str, Failure>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, operation: &'static str, value: Value) {
        self.responses.lock().unwrap().insert(operation, value);
    }

    pub fn fail(&self, operation: &'static str, failure: Failure) {
        self.failures.lock().unwrap().insert(operation, failure);
    }

    pub fn fail_remote(&self, operation: &'static str, status: u16, detail: &str) {
        self.fail(
            operation,
            Failure::Remote {
                status,
                detail: detail.to_string(),
            },
        );
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn operations(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|c| c.operation).collect()
    }

    fn record(&self, operation: &'static str, args: Value) -> ApiResult<Value> {
        self.calls.lock().unwrap().push(Call {
            operation,
            args: args.clone(),
        });
        if let Some(failure) = self.failures.lock().unwrap().get(operation) {
            return Err(failure.to_error(operation));
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(operation)
            .cloned()
            .unwrap_or_else(|| json!({"operation": operation, "args": args})))
    }

    fn record_unit(&self, operation: &'static str, args: Value) -> ApiResult<()> {
        self.record(operation, args).map(|_| ())
    }
}

#[async_trait]
impl TargetApi for FakeBackend {
    async fn list_targets(&self, query: &PageQuery) -> ApiResult<Value> {
        self.record("getTargets", json!({"query": query}))
    }
    async fn get_target(&self, controller_id: &str) -> ApiResult<Value> {
        self.record("getTarget", json!({"controllerId": controller_id}))
    }
    async fn create_targets(&self, targets: &[TargetCreate]) -> ApiResult<Value> {
        self.record("createTargets", json!({"body": targets}))
    }
    async fn update_target(&self, controller_id: &str, update: &TargetUpdate) -> ApiResult<Value> {
        self.record("updateTarget", json!({"controllerId": controller_id, "body": update}))
    }
    async fn delete_target(&self, controller_id: &str) -> ApiResult<()> {
        self.record_unit("deleteTarget", json!({"controllerId": controller_id}))
    }
    async fn get_attributes(&self, controller_id: &str) -> ApiResult<Value> {
        self.record("getAttributes", json!({"controllerId": controller_id}))
    }
    async fn get_tags(&self, controller_id: &str) -> ApiResult<Value> {
        self.record("getTags", json!({"controllerId": controller_id}))
    }
    async fn get_assigned_distribution_set(&self, controller_id: &str) -> ApiResult<Value> {
        self.record("getAssignedDistributionSet", json!({"controllerId": controller_id}))
    }
    async fn get_installed_distribution_set(&self, controller_id: &str) -> ApiResult<Value> {
        self.record("getInstalledDistributionSet", json!({"controllerId": controller_id}))
    }
    async fn assign_distribution_set(
        &self,
        controller_id: &str,
        assignments: &[DistributionSetAssignment],
        offline: Option<bool>,
    ) -> ApiResult<Value> {
        self.record(
            "postAssignedDistributionSet",
            json!({"controllerId": controller_id, "body": assignments, "offline": offline}),
        )
    }
    async fn list_metadata(&self, controller_id: &str) -> ApiResult<Value> {
        self.record("getMetadata", json!({"controllerId": controller_id}))
    }
    async fn get_metadata(&self, controller_id: &str, key: &str) -> ApiResult<Value> {
        self.record("getMetadataValue", json!({"controllerId": controller_id, "key": key}))
    }
    async fn create_metadata(
        &self,
        controller_id: &str,
        entries: &[MetadataEntry],
    ) -> ApiResult<Value> {
        self.record("createMetadata", json!({"controllerId": controller_id, "body": entries}))
    }
    async fn update_metadata(
        &self,
        controller_id: &str,
        key: &str,
        value: &MetadataValue,
    ) -> ApiResult<Value> {
        self.record(
            "updateMetadata",
            json!({"controllerId": controller_id, "key": key, "body": value}),
        )
    }
    async fn delete_metadata(&self, controller_id: &str, key: &str) -> ApiResult<()> {
        self.record_unit("deleteMetadata", json!({"controllerId": controller_id, "key": key}))
    }
    async fn list_target_actions(
        &self,
        controller_id: &str,
        query: &PageQuery,
    ) -> ApiResult<Value> {
        self.record("getActionHistory", json!({"controllerId": controller_id, "query": query}))
    }
    async fn get_target_action(&self, controller_id: &str, action_id: i64) -> ApiResult<Value> {
        self.record("getAction", json!({"controllerId": controller_id, "actionId": action_id}))
    }
    async fn get_action_status(
        &self,
        controller_id: &str,
        action_id: i64,
        query: &PageQuery,
    ) -> ApiResult<Value> {
        self.record(
            "getActionStatusList",
            json!({"controllerId": controller_id, "actionId": action_id, "query": query}),
        )
    }
    async fn cancel_action(
        &self,
        controller_id: &str,
        action_id: i64,
        force: Option<bool>,
    ) -> ApiResult<()> {
        self.record_unit(
            "cancelAction",
            json!({"controllerId": controller_id, "actionId": action_id, "force": force}),
        )
    }
    async fn update_action(
        &self,
        controller_id: &str,
        action_id: i64,
        update: &ActionUpdate,
    ) -> ApiResult<Value> {
        self.record(
            "updateAction",
            json!({"controllerId": controller_id, "actionId": action_id, "body": update}),
        )
    }
    async fn update_action_confirmation(
        &self,
        controller_id: &str,
        action_id: i64,
        confirmation: &ActionConfirmation,
    ) -> ApiResult<()> {
        self.record_unit(
            "updateActionConfirmation",
            json!({"controllerId": controller_id, "actionId": action_id, "body": confirmation}),
        )
    }
    async fn assign_target_type(&self, controller_id: &str, target_type_id: i64) -> ApiResult<()> {
        self.record_unit(
            "assignTargetType",
            json!({"controllerId": controller_id, "targetTypeId": target_type_id}),
        )
    }
    async fn unassign_target_type(&self, controller_id: &str) -> ApiResult<()> {
        self.record_unit("unassignTargetType", json!({"controllerId": controller_id}))
    }
    async fn activate_auto_confirm(
        &self,
        controller_id: &str,
        activation: &AutoConfirmActivation,
    ) -> ApiResult<()> {
        self.record_unit(
            "activateAutoConfirm",
            json!({"controllerId": controller_id, "body": activation}),
        )
    }
    async fn deactivate_auto_confirm(&self, controller_id: &str) -> ApiResult<()> {
        self.record_unit("deactivateAutoConfirm", json!({"controllerId": controller_id}))
    }
}

#[async_trait]
impl ActionApi for FakeBackend {
    async fn list_actions(&self, query: &PageQuery) -> ApiResult<Value> {
        self.record("getActions", json!({"query": query}))
    }
    async fn get_action(&self, action_id: i64) -> ApiResult<Value> {
        self.record("getActionById", json!({"actionId": action_id}))
    }
}

#[async_trait]
impl RolloutApi for FakeBackend {
    async fn list_rollouts(&self, query: &PageQuery) -> ApiResult<Value> {
        self.record("getRollouts", json!({"query": query}))
    }
    async fn get_rollout(&self, rollout_id: i64) -> ApiResult<Value> {
        self.record("getRollout", json!({"rolloutId": rollout_id}))
    }
    async fn create_rollout(&self, rollout: &RolloutCreate) -> ApiResult<Value> {
        self.record("createRollout", json!({"body": rollout}))
    }
    async fn update_rollout(&self, rollout_id: i64, update: &RolloutUpdate) -> ApiResult<Value> {
        self.record("updateRollout", json!({"rolloutId": rollout_id, "body": update}))
    }
    async fn delete_rollout(&self, rollout_id: i64) -> ApiResult<()> {
        self.record_unit("deleteRollout", json!({"rolloutId": rollout_id}))
    }
    async fn start_rollout(&self, rollout_id: i64) -> ApiResult<()> {
        self.record_unit("startRollout", json!({"rolloutId": rollout_id}))
    }
    async fn pause_rollout(&self, rollout_id: i64) -> ApiResult<()> {
        self.record_unit("pauseRollout", json!({"rolloutId": rollout_id}))
    }
    async fn resume_rollout(&self, rollout_id: i64) -> ApiResult<()> {
        self.record_unit("resumeRollout", json!({"rolloutId": rollout_id}))
    }
    async fn trigger_next_group(&self, rollout_id: i64) -> ApiResult<()> {
        self.record_unit("triggerNextGroup", json!({"rolloutId": rollout_id}))
    }
    async fn approve_rollout(&self, rollout_id: i64, remark: &str) -> ApiResult<()> {
        self.record_unit("approveRollout", json!({"rolloutId": rollout_id, "remark": remark}))
    }
    async fn deny_rollout(&self, rollout_id: i64, remark: &str) -> ApiResult<()> {
        self.record_unit("denyRollout", json!({"rolloutId": rollout_id, "remark": remark}))
    }
    async fn retry_rollout(&self, rollout_id: i64) -> ApiResult<Value> {
        self.record("retryRollout", json!({"rolloutId": rollout_id}))
    }
    async fn list_rollout_groups(&self, rollout_id: i64, query: &PageQuery) -> ApiResult<Value> {
        self.record("getRolloutGroups", json!({"rolloutId": rollout_id, "query": query}))
    }
    async fn get_rollout_group(&self, rollout_id: i64, group_id: i64) -> ApiResult<Value> {
        self.record("getRolloutGroup", json!({"rolloutId": rollout_id, "groupId": group_id}))
    }
    async fn list_rollout_group_targets(
        &self,
        rollout_id: i64,
        group_id: i64,
        query: &PageQuery,
    ) -> ApiResult<Value> {
        self.record(
            "getRolloutGroupTargets",
            json!({"rolloutId": rollout_id, "groupId": group_id, "query": query}),
        )
    }
}

#[async_trait]
impl TargetFilterApi for FakeBackend {
    async fn list_filters(&self, query: &PageQuery) -> ApiResult<Value> {
        self.record("getFilters", json!({"query": query}))
    }
    async fn get_filter(&self, filter_id: i64) -> ApiResult<Value> {
        self.record("getFilter", json!({"filterId": filter_id}))
    }
    async fn create_filter(&self, filter: &TargetFilterCreate) -> ApiResult<Value> {
        self.record("createFilter", json!({"body": filter}))
    }
    async fn update_filter(&self, filter_id: i64, update: &TargetFilterUpdate) -> ApiResult<Value> {
        self.record("updateFilter", json!({"filterId": filter_id, "body": update}))
    }
    async fn delete_filter(&self, filter_id: i64) -> ApiResult<()> {
        self.record_unit("deleteFilter", json!({"filterId": filter_id}))
    }
    async fn get_auto_assignment(&self, filter_id: i64) -> ApiResult<Value> {
        self.record("getAssignedDistributionSet", json!({"filterId": filter_id}))
    }
    async fn set_auto_assignment(
        &self,
        filter_id: i64,
        assignment: &AutoAssignment,
    ) -> ApiResult<Value> {
        self.record("postAssignedDistributionSet", json!({"filterId": filter_id, "body": assignment}))
    }
    async fn delete_auto_assignment(&self, filter_id: i64) -> ApiResult<()> {
        self.record_unit("deleteAssignedDistributionSet", json!({"filterId": filter_id}))
    }
}

#[async_trait]
impl TargetTagApi for FakeBackend {
    async fn list_tags(&self, query: &PageQuery) -> ApiResult<Value> {
        self.record("getTargetTags", json!({"query": query}))
    }
    async fn get_tag(&self, tag_id: i64) -> ApiResult<Value> {
        self.record("getTargetTag", json!({"tagId": tag_id}))
    }
    async fn create_tags(&self, tags: &[TagCreate]) -> ApiResult<Value> {
        self.record("createTargetTags", json!({"body": tags}))
    }
    async fn update_tag(&self, tag_id: i64, update: &TagUpdate) -> ApiResult<Value> {
        self.record("updateTargetTag", json!({"tagId": tag_id, "body": update}))
    }
    async fn delete_tag(&self, tag_id: i64) -> ApiResult<()> {
        self.record_unit("deleteTargetTag", json!({"tagId": tag_id}))
    }
    async fn list_assigned_targets(&self, tag_id: i64, query: &PageQuery) -> ApiResult<Value> {
        self.record("getAssignedTargets", json!({"tagId": tag_id, "query": query}))
    }
    async fn assign_targets(
        &self,
        tag_id: i64,
        controller_ids: &[String],
        on_not_found: Option<OnNotFoundPolicy>,
    ) -> ApiResult<()> {
        self.record_unit(
            "assignTargets",
            json!({"tagId": tag_id, "body": controller_ids, "onNotFoundPolicy": on_not_found}),
        )
    }
    async fn unassign_targets(
        &self,
        tag_id: i64,
        controller_ids: &[String],
        on_not_found: Option<OnNotFoundPolicy>,
    ) -> ApiResult<()> {
        self.record_unit(
            "unassignTargets",
            json!({"tagId": tag_id, "body": controller_ids, "onNotFoundPolicy": on_not_found}),
        )
    }
}

#[async_trait]
impl TargetTypeApi for FakeBackend {
    async fn list_target_types(&self, query: &PageQuery) -> ApiResult<Value> {
        self.record("getTargetTypes", json!({"query": query}))
    }
    async fn get_target_type(&self, target_type_id: i64) -> ApiResult<Value> {
        self.record("getTargetType", json!({"targetTypeId": target_type_id}))
    }
    async fn create_target_types(&self, types: &[TargetTypeCreate]) -> ApiResult<Value> {
        self.record("createTargetTypes", json!({"body": types}))
    }
    async fn update_target_type(
        &self,
        target_type_id: i64,
        update: &TargetTypeUpdate,
    ) -> ApiResult<Value> {
        self.record("updateTargetType", json!({"targetTypeId": target_type_id, "body": update}))
    }
    async fn delete_target_type(&self, target_type_id: i64) -> ApiResult<()> {
        self.record_unit("deleteTargetType", json!({"targetTypeId": target_type_id}))
    }
    async fn list_compatible_ds_types(&self, target_type_id: i64) -> ApiResult<Value> {
        self.record("getCompatibleDistributionSets", json!({"targetTypeId": target_type_id}))
    }
    async fn add_compatible_ds_types(
        &self,
        target_type_id: i64,
        ds_types: &[IdRef],
    ) -> ApiResult<()> {
        self.record_unit(
            "addCompatibleDistributionSets",
            json!({"targetTypeId": target_type_id, "body": ds_types}),
        )
    }
    async fn remove_compatible_ds_type(
        &self,
        target_type_id: i64,
        ds_type_id: i64,
    ) -> ApiResult<()> {
        self.record_unit(
            "removeCompatibleDistributionSet",
            json!({"targetTypeId": target_type_id, "dsTypeId": ds_type_id}),
        )
    }
}

// =============================================================================
// TEST CONTEXT
// =============================================================================

/// A toolbox over a fresh fake backend.
/// Every action space served by the toolbox.
pub fn action_spaces() -> Vec<&'static ActionSpace> {
    vec![
        &target::MANAGE_TARGET,
        &target::MANAGE_TARGET_METADATA,
        &target::MANAGE_TARGET_DISTRIBUTION_SET,
        &target::MANAGE_TARGET_ACTIONS,
        &target::MANAGE_TARGET_TYPE_ASSIGNMENT,
        &target::MANAGE_TARGET_AUTO_CONFIRM,
        &action::QUERY_ACTIONS,
        &rollout::MANAGE_ROLLOUT,
        &rollout::MANAGE_ROLLOUT_STATE,
        &rollout::MANAGE_ROLLOUT_GROUPS,
        &target_filter::MANAGE_TARGET_FILTER,
        &target_filter::MANAGE_AUTO_ASSIGNMENT,
        &target_tag::MANAGE_TARGET_TAG,
        &target_tag::MANAGE_TAG_ASSIGNMENTS,
        &target_type::MANAGE_TARGET_TYPE,
        &target_type::MANAGE_COMPATIBILITY,
    ]
}

pub struct TestContext {
    pub backend: Arc<FakeBackend>,
    pub toolbox: Toolbox,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_pagination(PaginationConfig::default())
    }

    pub fn with_pagination(config: PaginationConfig) -> Self {
        let backend = Arc::new(FakeBackend::new());
        let toolbox = Toolbox::new(backend.clone(), Pagination::new(config));
        Self { backend, toolbox }
    }

    /// Call a tool that must exist.
    pub async fn call(&self, tool: &str, arguments: Value) -> CallToolResponse {
        self.try_call(tool, arguments)
            .await
            .unwrap_or_else(|e| panic!("{tool} is not a registered tool: {e}"))
    }

    pub async fn try_call(&self, tool: &str, arguments: Value) -> Result<CallToolResponse, McpError> {
        self.toolbox.call(tool, arguments).await
    }
}

// =============================================================================
// ASSERTION HELPERS
// =============================================================================

/// Text of the first content block.
pub fn text(response: &CallToolResponse) -> &str {
    let ToolContent::Text { text } = &response.content[0];
    text
}

/// Structured content of a result, which must be present.
pub fn structured(response: &CallToolResponse) -> &Value {
    response
        .structured_content
        .as_ref()
        .unwrap_or_else(|| panic!("no structured content in {response:?}"))
}

pub fn assert_preview(response: &CallToolResponse, action: &str) {
    assert!(!response.is_error, "expected a preview, got error: {}", text(response));
    let value = structured(response);
    assert_eq!(value["status"], "PREVIEW");
    assert_eq!(
        value["message"],
        "PREVIEW MODE: No changes were made. Please confirm to proceed."
    );
    assert_eq!(value["action"], action);
}

pub fn assert_error_kind(response: &CallToolResponse, kind: &str) {
    assert!(response.is_error, "expected {kind}, got success: {}", text(response));
    assert_eq!(structured(response)["error"], kind);
}
