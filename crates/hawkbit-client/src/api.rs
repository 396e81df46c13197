//! Management API surface, one trait per resource family.
//!
//! Reads return the server's JSON unchanged. Calls the server answers without
//! a body return `()`; the tool layer substitutes a confirmation string.

use async_trait::async_trait;
use hawkbit_core::PageQuery;
use serde_json::Value;

use crate::error::ClientError;
use crate::models::{
    ActionConfirmation, ActionUpdate, AutoAssignment, AutoConfirmActivation,
    DistributionSetAssignment, IdRef, MetadataEntry, MetadataValue, OnNotFoundPolicy,
    RolloutCreate, RolloutUpdate, TagCreate, TagUpdate, TargetCreate, TargetFilterCreate,
    TargetFilterUpdate, TargetTypeCreate, TargetTypeUpdate, TargetUpdate,
};

pub type ApiResult<T> = Result<T, ClientError>;

/// Targets (devices) and everything hanging off a single target.
#[async_trait]
pub trait TargetApi: Send + Sync {
    async fn list_targets(&self, query: &PageQuery) -> ApiResult<Value>;
    async fn get_target(&self, controller_id: &str) -> ApiResult<Value>;
    async fn create_targets(&self, targets: &[TargetCreate]) -> ApiResult<Value>;
    async fn update_target(&self, controller_id: &str, update: &TargetUpdate) -> ApiResult<Value>;
    async fn delete_target(&self, controller_id: &str) -> ApiResult<()>;

    async fn get_attributes(&self, controller_id: &str) -> ApiResult<Value>;
    async fn get_tags(&self, controller_id: &str) -> ApiResult<Value>;
    async fn get_assigned_distribution_set(&self, controller_id: &str) -> ApiResult<Value>;
    async fn get_installed_distribution_set(&self, controller_id: &str) -> ApiResult<Value>;
    async fn assign_distribution_set(
        &self,
        controller_id: &str,
        assignments: &[DistributionSetAssignment],
        offline: Option<bool>,
    ) -> ApiResult<Value>;

    async fn list_metadata(&self, controller_id: &str) -> ApiResult<Value>;
    async fn get_metadata(&self, controller_id: &str, key: &str) -> ApiResult<Value>;
    async fn create_metadata(&self, controller_id: &str, entries: &[MetadataEntry])
    -> ApiResult<Value>;
    async fn update_metadata(
        &self,
        controller_id: &str,
        key: &str,
        value: &MetadataValue,
    ) -> ApiResult<Value>;
    async fn delete_metadata(&self, controller_id: &str, key: &str) -> ApiResult<()>;

    async fn list_target_actions(&self, controller_id: &str, query: &PageQuery)
    -> ApiResult<Value>;
    async fn get_target_action(&self, controller_id: &str, action_id: i64) -> ApiResult<Value>;
    async fn get_action_status(
        &self,
        controller_id: &str,
        action_id: i64,
        query: &PageQuery,
    ) -> ApiResult<Value>;
    async fn cancel_action(
        &self,
        controller_id: &str,
        action_id: i64,
        force: Option<bool>,
    ) -> ApiResult<()>;
    async fn update_action(
        &self,
        controller_id: &str,
        action_id: i64,
        update: &ActionUpdate,
    ) -> ApiResult<Value>;
    async fn update_action_confirmation(
        &self,
        controller_id: &str,
        action_id: i64,
        confirmation: &ActionConfirmation,
    ) -> ApiResult<()>;

    async fn assign_target_type(&self, controller_id: &str, target_type_id: i64) -> ApiResult<()>;
    async fn unassign_target_type(&self, controller_id: &str) -> ApiResult<()>;

    async fn activate_auto_confirm(
        &self,
        controller_id: &str,
        activation: &AutoConfirmActivation,
    ) -> ApiResult<()>;
    async fn deactivate_auto_confirm(&self, controller_id: &str) -> ApiResult<()>;
}

/// Fleet-wide action search.
#[async_trait]
pub trait ActionApi: Send + Sync {
    async fn list_actions(&self, query: &PageQuery) -> ApiResult<Value>;
    async fn get_action(&self, action_id: i64) -> ApiResult<Value>;
}

/// Rollouts, their lifecycle transitions and their deploy groups.
#[async_trait]
pub trait RolloutApi: Send + Sync {
    async fn list_rollouts(&self, query: &PageQuery) -> ApiResult<Value>;
    async fn get_rollout(&self, rollout_id: i64) -> ApiResult<Value>;
    async fn create_rollout(&self, rollout: &RolloutCreate) -> ApiResult<Value>;
    async fn update_rollout(&self, rollout_id: i64, update: &RolloutUpdate) -> ApiResult<Value>;
    async fn delete_rollout(&self, rollout_id: i64) -> ApiResult<()>;

    async fn start_rollout(&self, rollout_id: i64) -> ApiResult<()>;
    async fn pause_rollout(&self, rollout_id: i64) -> ApiResult<()>;
    async fn resume_rollout(&self, rollout_id: i64) -> ApiResult<()>;
    async fn trigger_next_group(&self, rollout_id: i64) -> ApiResult<()>;
    async fn approve_rollout(&self, rollout_id: i64, remark: &str) -> ApiResult<()>;
    async fn deny_rollout(&self, rollout_id: i64, remark: &str) -> ApiResult<()>;
    async fn retry_rollout(&self, rollout_id: i64) -> ApiResult<Value>;

    async fn list_rollout_groups(&self, rollout_id: i64, query: &PageQuery) -> ApiResult<Value>;
    async fn get_rollout_group(&self, rollout_id: i64, group_id: i64) -> ApiResult<Value>;
    async fn list_rollout_group_targets(
        &self,
        rollout_id: i64,
        group_id: i64,
        query: &PageQuery,
    ) -> ApiResult<Value>;
}

/// Stored target filter queries and their auto-assignment.
#[async_trait]
pub trait TargetFilterApi: Send + Sync {
    async fn list_filters(&self, query: &PageQuery) -> ApiResult<Value>;
    async fn get_filter(&self, filter_id: i64) -> ApiResult<Value>;
    async fn create_filter(&self, filter: &TargetFilterCreate) -> ApiResult<Value>;
    async fn update_filter(&self, filter_id: i64, update: &TargetFilterUpdate) -> ApiResult<Value>;
    async fn delete_filter(&self, filter_id: i64) -> ApiResult<()>;

    async fn get_auto_assignment(&self, filter_id: i64) -> ApiResult<Value>;
    async fn set_auto_assignment(
        &self,
        filter_id: i64,
        assignment: &AutoAssignment,
    ) -> ApiResult<Value>;
    async fn delete_auto_assignment(&self, filter_id: i64) -> ApiResult<()>;
}

#[async_trait]
pub trait TargetTagApi: Send + Sync {
    async fn list_tags(&self, query: &PageQuery) -> ApiResult<Value>;
    async fn get_tag(&self, tag_id: i64) -> ApiResult<Value>;
    async fn create_tags(&self, tags: &[TagCreate]) -> ApiResult<Value>;
    async fn update_tag(&self, tag_id: i64, update: &TagUpdate) -> ApiResult<Value>;
    async fn delete_tag(&self, tag_id: i64) -> ApiResult<()>;

    async fn list_assigned_targets(&self, tag_id: i64, query: &PageQuery) -> ApiResult<Value>;
    async fn assign_targets(
        &self,
        tag_id: i64,
        controller_ids: &[String],
        on_not_found: Option<OnNotFoundPolicy>,
    ) -> ApiResult<()>;
    async fn unassign_targets(
        &self,
        tag_id: i64,
        controller_ids: &[String],
        on_not_found: Option<OnNotFoundPolicy>,
    ) -> ApiResult<()>;
}

#[async_trait]
pub trait TargetTypeApi: Send + Sync {
    async fn list_target_types(&self, query: &PageQuery) -> ApiResult<Value>;
    async fn get_target_type(&self, target_type_id: i64) -> ApiResult<Value>;
    async fn create_target_types(&self, types: &[TargetTypeCreate]) -> ApiResult<Value>;
    async fn update_target_type(
        &self,
        target_type_id: i64,
        update: &TargetTypeUpdate,
    ) -> ApiResult<Value>;
    async fn delete_target_type(&self, target_type_id: i64) -> ApiResult<()>;

    async fn list_compatible_ds_types(&self, target_type_id: i64) -> ApiResult<Value>;
    async fn add_compatible_ds_types(&self, target_type_id: i64, ds_types: &[IdRef])
    -> ApiResult<()>;
    async fn remove_compatible_ds_type(&self, target_type_id: i64, ds_type_id: i64)
    -> ApiResult<()>;
}

/// Everything the tool layer needs from one backend.
pub trait ManagementApi:
    TargetApi + ActionApi + RolloutApi + TargetFilterApi + TargetTagApi + TargetTypeApi
{
}

impl<T> ManagementApi for T where
    T: TargetApi + ActionApi + RolloutApi + TargetFilterApi + TargetTagApi + TargetTypeApi
{
}
