//! `reqwest` implementation of the management API traits.

use async_trait::async_trait;
use hawkbit_core::{HawkbitMcpConfig, PageQuery, ServerConfig};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{
    ActionApi, ApiResult, RolloutApi, TargetApi, TargetFilterApi, TargetTagApi, TargetTypeApi,
};
use crate::auth::{Authorizer, authorizer_from_config};
use crate::error::ClientError;
use crate::models::{
    ActionConfirmation, ActionUpdate, AutoAssignment, AutoConfirmActivation,
    DistributionSetAssignment, IdRef, MetadataEntry, MetadataValue, OnNotFoundPolicy,
    RolloutCreate, RolloutUpdate, TagCreate, TagUpdate, TargetCreate, TargetFilterCreate,
    TargetFilterUpdate, TargetTypeCreate, TargetTypeUpdate, TargetUpdate,
};

/// Longest server error body carried into an error message.
const MAX_ERROR_DETAIL: usize = 512;

/// Management API client talking to `{mgmt_url}/rest/v1`.
#[derive(Clone)]
pub struct HttpManagementClient {
    http: reqwest::Client,
    base: Url,
    authorizer: Arc<dyn Authorizer>,
}

impl HttpManagementClient {
    /// Create a client for the given server with an explicit authorizer.
    pub fn new(server: &ServerConfig, authorizer: Arc<dyn Authorizer>) -> Result<Self, ClientError> {
        let http = build_http_client(server)?;
        Self::with_http_client(server, http, authorizer)
    }

    /// Create a client and its authorizer from the full configuration.
    pub fn from_config(config: &HawkbitMcpConfig) -> Result<Self, ClientError> {
        let http = build_http_client(&config.server)?;
        let authorizer = authorizer_from_config(&config.auth, http.clone())?;
        Self::with_http_client(&config.server, http, authorizer)
    }

    fn with_http_client(
        server: &ServerConfig,
        http: reqwest::Client,
        authorizer: Arc<dyn Authorizer>,
    ) -> Result<Self, ClientError> {
        let base = Url::parse(server.base_url()).map_err(|e| {
            ClientError::InvalidConfig(format!("invalid mgmt_url '{}': {e}", server.mgmt_url))
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidConfig(format!(
                "mgmt_url '{}' cannot carry a path",
                server.mgmt_url
            )));
        }

        tracing::debug!(
            base_url = %base,
            auth = authorizer.scheme(),
            "Created management API client"
        );

        Ok(Self {
            http,
            base,
            authorizer,
        })
    }

    /// Base URL of the management server.
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// `{base}/rest/v1/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["rest", "v1"]).extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.http.request(method, self.endpoint(segments))
    }

    async fn execute(
        &self,
        operation: &'static str,
        builder: RequestBuilder,
    ) -> Result<Response, ClientError> {
        let builder = match self.authorizer.authorization().await? {
            Some(header) => builder.header(AUTHORIZATION, header),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|source| ClientError::Transport { operation, source })?;

        let status = response.status();
        tracing::debug!(operation, status = status.as_u16(), url = %response.url(), "Management API call");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Remote {
            operation,
            status: status.as_u16(),
            detail: error_detail(&body),
        })
    }

    async fn json(&self, operation: &'static str, builder: RequestBuilder) -> ApiResult<Value> {
        let response = self.execute(operation, builder).await?;
        let body = response
            .text()
            .await
            .map_err(|source| ClientError::Transport { operation, source })?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ClientError::Decode {
            operation,
            reason: e.to_string(),
        })
    }

    async fn no_content(&self, operation: &'static str, builder: RequestBuilder) -> ApiResult<()> {
        self.execute(operation, builder).await.map(|_| ())
    }
}

fn build_http_client(server: &ServerConfig) -> Result<reqwest::Client, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&server.user_agent)
            .map_err(|e| ClientError::InvalidConfig(format!("invalid user_agent: {e}")))?,
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_millis(server.request_timeout_ms.max(1)))
        .build()
        .map_err(|e| ClientError::InvalidConfig(format!("failed to create http client: {e}")))
}

/// Prefer the server's `message` field; fall back to the truncated body.
fn error_detail(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(message) = map.get("message").and_then(Value::as_str) {
            return match map.get("errorCode").and_then(Value::as_str) {
                Some(code) => format!("{message} ({code})"),
                None => message.to_string(),
            };
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(MAX_ERROR_DETAIL).collect()
}

#[async_trait]
impl TargetApi for HttpManagementClient {
    async fn list_targets(&self, query: &PageQuery) -> ApiResult<Value> {
        let req = self.request(Method::GET, &["targets"]).query(&query.query_pairs());
        self.json("getTargets", req).await
    }

    async fn get_target(&self, controller_id: &str) -> ApiResult<Value> {
        let req = self.request(Method::GET, &["targets", controller_id]);
        self.json("getTarget", req).await
    }

    async fn create_targets(&self, targets: &[TargetCreate]) -> ApiResult<Value> {
        let req = self.request(Method::POST, &["targets"]).json(targets);
        self.json("createTargets", req).await
    }

    async fn update_target(&self, controller_id: &str, update: &TargetUpdate) -> ApiResult<Value> {
        let req = self.request(Method::PUT, &["targets", controller_id]).json(update);
        self.json("updateTarget", req).await
    }

    async fn delete_target(&self, controller_id: &str) -> ApiResult<()> {
        let req = self.request(Method::DELETE, &["targets", controller_id]);
        self.no_content("deleteTarget", req).await
    }

    async fn get_attributes(&self, controller_id: &str) -> ApiResult<Value> {
        let req = self.request(Method::GET, &["targets", controller_id, "attributes"]);
        self.json("getAttributes", req).await
    }

    async fn get_tags(&self, controller_id: &str) -> ApiResult<Value> {
        let req = self.request(Method::GET, &["targets", controller_id, "tags"]);
        self.json("getTags", req).await
    }

    async fn get_assigned_distribution_set(&self, controller_id: &str) -> ApiResult<Value> {
        let req = self.request(Method::GET, &["targets", controller_id, "assignedDS"]);
        self.json("getAssignedDistributionSet", req).await
    }

    async fn get_installed_distribution_set(&self, controller_id: &str) -> ApiResult<Value> {
        let req = self.request(Method::GET, &["targets", controller_id, "installedDS"]);
        self.json("getInstalledDistributionSet", req).await
    }

    async fn assign_distribution_set(
        &self,
        controller_id: &str,
        assignments: &[DistributionSetAssignment],
        offline: Option<bool>,
    ) -> ApiResult<Value> {
        let mut req = self
            .request(Method::POST, &["targets", controller_id, "assignedDS"])
            .json(assignments);
        if let Some(offline) = offline {
            req = req.query(&[("offline", offline)]);
        }
        self.json("postAssignedDistributionSet", req).await
    }

    async fn list_metadata(&self, controller_id: &str) -> ApiResult<Value> {
        let req = self.request(Method::GET, &["targets", controller_id, "metadata"]);
        self.json("getMetadata", req).await
    }

    async fn get_metadata(&self, controller_id: &str, key: &str) -> ApiResult<Value> {
        let req = self.request(Method::GET, &["targets", controller_id, "metadata", key]);
        self.json("getMetadataValue", req).await
    }

    async fn create_metadata(
        &self,
        controller_id: &str,
        entries: &[MetadataEntry],
    ) -> ApiResult<Value> {
        let req = self
            .request(Method::POST, &["targets", controller_id, "metadata"])
            .json(entries);
        self.json("createMetadata", req).await
    }

    async fn update_metadata(
        &self,
        controller_id: &str,
        key: &str,
        value: &MetadataValue,
    ) -> ApiResult<Value> {
        let req = self
            .request(Method::PUT, &["targets", controller_id, "metadata", key])
            .json(value);
        self.json("updateMetadata", req).await
    }

    async fn delete_metadata(&self, controller_id: &str, key: &str) -> ApiResult<()> {
        let req = self.request(Method::DELETE, &["targets", controller_id, "metadata", key]);
        self.no_content("deleteMetadata", req).await
    }

    async fn list_target_actions(
        &self,
        controller_id: &str,
        query: &PageQuery,
    ) -> ApiResult<Value> {
        let req = self
            .request(Method::GET, &["targets", controller_id, "actions"])
            .query(&query.query_pairs());
        self.json("getActionHistory", req).await
    }

    async fn get_target_action(&self, controller_id: &str, action_id: i64) -> ApiResult<Value> {
        let action_id = action_id.to_string();
        let req = self.request(Method::GET, &["targets", controller_id, "actions", &action_id]);
        self.json("getAction", req).await
    }

    async fn get_action_status(
        &self,
        controller_id: &str,
        action_id: i64,
        query: &PageQuery,
    ) -> ApiResult<Value> {
        let action_id = action_id.to_string();
        let req = self
            .request(
                Method::GET,
                &["targets", controller_id, "actions", &action_id, "status"],
            )
            .query(&query.query_pairs());
        self.json("getActionStatusList", req).await
    }

    async fn cancel_action(
        &self,
        controller_id: &str,
        action_id: i64,
        force: Option<bool>,
    ) -> ApiResult<()> {
        let action_id = action_id.to_string();
        let mut req = self.request(
            Method::DELETE,
            &["targets", controller_id, "actions", &action_id],
        );
        if let Some(force) = force {
            req = req.query(&[("force", force)]);
        }
        self.no_content("cancelAction", req).await
    }

    async fn update_action(
        &self,
        controller_id: &str,
        action_id: i64,
        update: &ActionUpdate,
    ) -> ApiResult<Value> {
        let action_id = action_id.to_string();
        let req = self
            .request(Method::PUT, &["targets", controller_id, "actions", &action_id])
            .json(update);
        self.json("updateAction", req).await
    }

    async fn update_action_confirmation(
        &self,
        controller_id: &str,
        action_id: i64,
        confirmation: &ActionConfirmation,
    ) -> ApiResult<()> {
        let action_id = action_id.to_string();
        let req = self
            .request(
                Method::PUT,
                &["targets", controller_id, "actions", &action_id, "confirmation"],
            )
            .json(confirmation);
        self.no_content("updateActionConfirmation", req).await
    }

    async fn assign_target_type(&self, controller_id: &str, target_type_id: i64) -> ApiResult<()> {
        let req = self
            .request(Method::POST, &["targets", controller_id, "targettype"])
            .json(&IdRef::new(target_type_id));
        self.no_content("assignTargetType", req).await
    }

    async fn unassign_target_type(&self, controller_id: &str) -> ApiResult<()> {
        let req = self.request(Method::DELETE, &["targets", controller_id, "targettype"]);
        self.no_content("unassignTargetType", req).await
    }

    async fn activate_auto_confirm(
        &self,
        controller_id: &str,
        activation: &AutoConfirmActivation,
    ) -> ApiResult<()> {
        let req = self
            .request(
                Method::POST,
                &["targets", controller_id, "autoConfirm", "activate"],
            )
            .json(activation);
        self.no_content("activateAutoConfirm", req).await
    }

    async fn deactivate_auto_confirm(&self, controller_id: &str) -> ApiResult<()> {
        let req = self.request(
            Method::POST,
            &["targets", controller_id, "autoConfirm", "deactivate"],
        );
        self.no_content("deactivateAutoConfirm", req).await
    }
}

#[async_trait]
impl ActionApi for HttpManagementClient {
    async fn list_actions(&self, query: &PageQuery) -> ApiResult<Value> {
        let req = self.request(Method::GET, &["actions"]).query(&query.query_pairs());
        self.json("getActions", req).await
    }

    async fn get_action(&self, action_id: i64) -> ApiResult<Value> {
        let action_id = action_id.to_string();
        let req = self.request(Method::GET, &["actions", &action_id]);
        self.json("getAction", req).await
    }
}

#[async_trait]
impl RolloutApi for HttpManagementClient {
    async fn list_rollouts(&self, query: &PageQuery) -> ApiResult<Value> {
        let req = self.request(Method::GET, &["rollouts"]).query(&query.query_pairs());
        self.json("getRollouts", req).await
    }

    async fn get_rollout(&self, rollout_id: i64) -> ApiResult<Value> {
        let id = rollout_id.to_string();
        let req = self.request(Method::GET, &["rollouts", &id]);
        self.json("getRollout", req).await
    }

    async fn create_rollout(&self, rollout: &RolloutCreate) -> ApiResult<Value> {
        let req = self.request(Method::POST, &["rollouts"]).json(rollout);
        self.json("createRollout", req).await
    }

    async fn update_rollout(&self, rollout_id: i64, update: &RolloutUpdate) -> ApiResult<Value> {
        let id = rollout_id.to_string();
        let req = self.request(Method::PUT, &["rollouts", &id]).json(update);
        self.json("updateRollout", req).await
    }

    async fn delete_rollout(&self, rollout_id: i64) -> ApiResult<()> {
        let id = rollout_id.to_string();
        let req = self.request(Method::DELETE, &["rollouts", &id]);
        self.no_content("deleteRollout", req).await
    }

    async fn start_rollout(&self, rollout_id: i64) -> ApiResult<()> {
        let id = rollout_id.to_string();
        let req = self.request(Method::POST, &["rollouts", &id, "start"]);
        self.no_content("startRollout", req).await
    }

    async fn pause_rollout(&self, rollout_id: i64) -> ApiResult<()> {
        let id = rollout_id.to_string();
        let req = self.request(Method::POST, &["rollouts", &id, "pause"]);
        self.no_content("pauseRollout", req).await
    }

    async fn resume_rollout(&self, rollout_id: i64) -> ApiResult<()> {
        let id = rollout_id.to_string();
        let req = self.request(Method::POST, &["rollouts", &id, "resume"]);
        self.no_content("resumeRollout", req).await
    }

    async fn trigger_next_group(&self, rollout_id: i64) -> ApiResult<()> {
        let id = rollout_id.to_string();
        let req = self.request(Method::POST, &["rollouts", &id, "triggerNextGroup"]);
        self.no_content("triggerNextGroup", req).await
    }

    async fn approve_rollout(&self, rollout_id: i64, remark: &str) -> ApiResult<()> {
        let id = rollout_id.to_string();
        let req = self
            .request(Method::POST, &["rollouts", &id, "approve"])
            .query(&[("remark", remark)]);
        self.no_content("approveRollout", req).await
    }

    async fn deny_rollout(&self, rollout_id: i64, remark: &str) -> ApiResult<()> {
        let id = rollout_id.to_string();
        let req = self
            .request(Method::POST, &["rollouts", &id, "deny"])
            .query(&[("remark", remark)]);
        self.no_content("denyRollout", req).await
    }

    async fn retry_rollout(&self, rollout_id: i64) -> ApiResult<Value> {
        let id = rollout_id.to_string();
        let req = self.request(Method::POST, &["rollouts", &id, "retry"]);
        self.json("retryRollout", req).await
    }

    async fn list_rollout_groups(&self, rollout_id: i64, query: &PageQuery) -> ApiResult<Value> {
        let id = rollout_id.to_string();
        let req = self
            .request(Method::GET, &["rollouts", &id, "deploygroups"])
            .query(&query.query_pairs());
        self.json("getRolloutGroups", req).await
    }

    async fn get_rollout_group(&self, rollout_id: i64, group_id: i64) -> ApiResult<Value> {
        let id = rollout_id.to_string();
        let group = group_id.to_string();
        let req = self.request(Method::GET, &["rollouts", &id, "deploygroups", &group]);
        self.json("getRolloutGroup", req).await
    }

    async fn list_rollout_group_targets(
        &self,
        rollout_id: i64,
        group_id: i64,
        query: &PageQuery,
    ) -> ApiResult<Value> {
        let id = rollout_id.to_string();
        let group = group_id.to_string();
        let req = self
            .request(
                Method::GET,
                &["rollouts", &id, "deploygroups", &group, "targets"],
            )
            .query(&query.query_pairs());
        self.json("getRolloutGroupTargets", req).await
    }
}

#[async_trait]
impl TargetFilterApi for HttpManagementClient {
    async fn list_filters(&self, query: &PageQuery) -> ApiResult<Value> {
        let req = self.request(Method::GET, &["targetfilters"]).query(&query.query_pairs());
        self.json("getFilters", req).await
    }

    async fn get_filter(&self, filter_id: i64) -> ApiResult<Value> {
        let id = filter_id.to_string();
        let req = self.request(Method::GET, &["targetfilters", &id]);
        self.json("getFilter", req).await
    }

    async fn create_filter(&self, filter: &TargetFilterCreate) -> ApiResult<Value> {
        let req = self.request(Method::POST, &["targetfilters"]).json(filter);
        self.json("createFilter", req).await
    }

    async fn update_filter(&self, filter_id: i64, update: &TargetFilterUpdate) -> ApiResult<Value> {
        let id = filter_id.to_string();
        let req = self.request(Method::PUT, &["targetfilters", &id]).json(update);
        self.json("updateFilter", req).await
    }

    async fn delete_filter(&self, filter_id: i64) -> ApiResult<()> {
        let id = filter_id.to_string();
        let req = self.request(Method::DELETE, &["targetfilters", &id]);
        self.no_content("deleteFilter", req).await
    }

    async fn get_auto_assignment(&self, filter_id: i64) -> ApiResult<Value> {
        let id = filter_id.to_string();
        let req = self.request(Method::GET, &["targetfilters", &id, "autoAssignDS"]);
        self.json("getAssignedDistributionSet", req).await
    }

    async fn set_auto_assignment(
        &self,
        filter_id: i64,
        assignment: &AutoAssignment,
    ) -> ApiResult<Value> {
        let id = filter_id.to_string();
        let req = self
            .request(Method::POST, &["targetfilters", &id, "autoAssignDS"])
            .json(assignment);
        self.json("postAssignedDistributionSet", req).await
    }

    async fn delete_auto_assignment(&self, filter_id: i64) -> ApiResult<()> {
        let id = filter_id.to_string();
        let req = self.request(Method::DELETE, &["targetfilters", &id, "autoAssignDS"]);
        self.no_content("deleteAssignedDistributionSet", req).await
    }
}

#[async_trait]
impl TargetTagApi for HttpManagementClient {
    async fn list_tags(&self, query: &PageQuery) -> ApiResult<Value> {
        let req = self.request(Method::GET, &["targettags"]).query(&query.query_pairs());
        self.json("getTargetTags", req).await
    }

    async fn get_tag(&self, tag_id: i64) -> ApiResult<Value> {
        let id = tag_id.to_string();
        let req = self.request(Method::GET, &["targettags", &id]);
        self.json("getTargetTag", req).await
    }

    async fn create_tags(&self, tags: &[TagCreate]) -> ApiResult<Value> {
        let req = self.request(Method::POST, &["targettags"]).json(tags);
        self.json("createTargetTags", req).await
    }

    async fn update_tag(&self, tag_id: i64, update: &TagUpdate) -> ApiResult<Value> {
        let id = tag_id.to_string();
        let req = self.request(Method::PUT, &["targettags", &id]).json(update);
        self.json("updateTargetTag", req).await
    }

    async fn delete_tag(&self, tag_id: i64) -> ApiResult<()> {
        let id = tag_id.to_string();
        let req = self.request(Method::DELETE, &["targettags", &id]);
        self.no_content("deleteTargetTag", req).await
    }

    async fn list_assigned_targets(&self, tag_id: i64, query: &PageQuery) -> ApiResult<Value> {
        let id = tag_id.to_string();
        let req = self
            .request(Method::GET, &["targettags", &id, "assigned"])
            .query(&query.query_pairs());
        self.json("getAssignedTargets", req).await
    }

    async fn assign_targets(
        &self,
        tag_id: i64,
        controller_ids: &[String],
        on_not_found: Option<OnNotFoundPolicy>,
    ) -> ApiResult<()> {
        let id = tag_id.to_string();
        let mut req = self
            .request(Method::PUT, &["targettags", &id, "assigned"])
            .json(controller_ids);
        if let Some(policy) = on_not_found {
            req = req.query(&[("onNotFoundPolicy", policy.as_str())]);
        }
        self.no_content("assignTargets", req).await
    }

    async fn unassign_targets(
        &self,
        tag_id: i64,
        controller_ids: &[String],
        on_not_found: Option<OnNotFoundPolicy>,
    ) -> ApiResult<()> {
        let id = tag_id.to_string();
        let mut req = self
            .request(Method::DELETE, &["targettags", &id, "assigned"])
            .json(controller_ids);
        if let Some(policy) = on_not_found {
            req = req.query(&[("onNotFoundPolicy", policy.as_str())]);
        }
        self.no_content("unassignTargets", req).await
    }
}

#[async_trait]
impl TargetTypeApi for HttpManagementClient {
    async fn list_target_types(&self, query: &PageQuery) -> ApiResult<Value> {
        let req = self.request(Method::GET, &["targettypes"]).query(&query.query_pairs());
        self.json("getTargetTypes", req).await
    }

    async fn get_target_type(&self, target_type_id: i64) -> ApiResult<Value> {
        let id = target_type_id.to_string();
        let req = self.request(Method::GET, &["targettypes", &id]);
        self.json("getTargetType", req).await
    }

    async fn create_target_types(&self, types: &[TargetTypeCreate]) -> ApiResult<Value> {
        let req = self.request(Method::POST, &["targettypes"]).json(types);
        self.json("createTargetTypes", req).await
    }

    async fn update_target_type(
        &self,
        target_type_id: i64,
        update: &TargetTypeUpdate,
    ) -> ApiResult<Value> {
        let id = target_type_id.to_string();
        let req = self.request(Method::PUT, &["targettypes", &id]).json(update);
        self.json("updateTargetType", req).await
    }

    async fn delete_target_type(&self, target_type_id: i64) -> ApiResult<()> {
        let id = target_type_id.to_string();
        let req = self.request(Method::DELETE, &["targettypes", &id]);
        self.no_content("deleteTargetType", req).await
    }

    async fn list_compatible_ds_types(&self, target_type_id: i64) -> ApiResult<Value> {
        let id = target_type_id.to_string();
        let req = self.request(
            Method::GET,
            &["targettypes", &id, "compatibledistributionsettypes"],
        );
        self.json("getCompatibleDistributionSets", req).await
    }

    async fn add_compatible_ds_types(
        &self,
        target_type_id: i64,
        ds_types: &[IdRef],
    ) -> ApiResult<()> {
        let id = target_type_id.to_string();
        let req = self
            .request(
                Method::POST,
                &["targettypes", &id, "compatibledistributionsettypes"],
            )
            .json(ds_types);
        self.no_content("addCompatibleDistributionSets", req).await
    }

    async fn remove_compatible_ds_type(
        &self,
        target_type_id: i64,
        ds_type_id: i64,
    ) -> ApiResult<()> {
        let id = target_type_id.to_string();
        let ds_type = ds_type_id.to_string();
        let req = self.request(
            Method::DELETE,
            &["targettypes", &id, "compatibledistributionsettypes", &ds_type],
        );
        self.no_content("removeCompatibleDistributionSet", req).await
    }
}
