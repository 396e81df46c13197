//! The complete tool set: definitions plus routing to the owning service.

use hawkbit_client::ManagementApi;
use hawkbit_core::Pagination;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::McpError;
use crate::output::to_response;
use crate::protocol::{CallToolResponse, ToolDefinition};
use crate::services::{
    ActionService, ResourceService, RolloutService, TargetFilterService, TargetService,
    TargetTagService, TargetTypeService,
};
use crate::tools::ToolRegistry;

/// All tools served over MCP.
pub struct Toolbox {
    registry: ToolRegistry,
    services: Vec<Arc<dyn ResourceService>>,
    /// Tool name to index into `services`.
    routes: HashMap<String, usize>,
}

impl Toolbox {
    /// Every resource family, backed by one management API client.
    pub fn new<C>(api: Arc<C>, pagination: Pagination) -> Self
    where
        C: ManagementApi + 'static,
    {
        Self::from_services(vec![
            Arc::new(TargetService::new(api.clone(), pagination)),
            Arc::new(ActionService::new(api.clone(), pagination)),
            Arc::new(RolloutService::new(api.clone(), pagination)),
            Arc::new(TargetFilterService::new(api.clone(), pagination)),
            Arc::new(TargetTagService::new(api.clone(), pagination)),
            Arc::new(TargetTypeService::new(api, pagination)),
        ])
    }

    pub fn from_services(services: Vec<Arc<dyn ResourceService>>) -> Self {
        let mut registry = ToolRegistry::new();
        let mut routes = HashMap::new();
        for (index, service) in services.iter().enumerate() {
            for definition in service.definitions() {
                if let Some(previous) = routes.insert(definition.name.clone(), index) {
                    tracing::warn!(
                        tool = %definition.name,
                        replaced = services[previous].name(),
                        by = service.name(),
                        "Duplicate tool name"
                    );
                }
                registry.register(definition);
            }
        }
        tracing::debug!(tools = registry.len(), services = services.len(), "Built toolbox");
        Self {
            registry,
            services,
            routes,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Definitions sorted by name.
    pub fn definitions(&self) -> Vec<&ToolDefinition> {
        self.registry.list()
    }

    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.registry.get(name)
    }

    /// Execute a tool call.
    ///
    /// Only an unknown tool name is an `Err`; dispatch failures are rendered
    /// as `isError` results.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<CallToolResponse, McpError> {
        let service = self
            .routes
            .get(name)
            .map(|&index| &self.services[index])
            .ok_or_else(|| McpError::ToolNotFound {
                name: name.to_string(),
            })?;

        let result = service.call(name, arguments).await;
        match &result {
            Ok(output) if output.is_preview() => {
                tracing::info!(tool = name, "Returned preview for unconfirmed call")
            }
            Ok(_) => tracing::debug!(tool = name, "Tool call succeeded"),
            Err(err) => tracing::warn!(tool = name, kind = err.kind(), error = %err, "Tool call failed"),
        }
        Ok(to_response(result))
    }
}
