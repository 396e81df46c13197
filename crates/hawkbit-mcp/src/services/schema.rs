//! JSON Schema and tool definition builders shared by the services.
//!
//! Action enums come from the tool's [`ActionSpace`] and paging hints from
//! the query field catalog, so advertised schemas cannot drift from what the
//! dispatcher accepts.

use hawkbit_core::ResourceFamily;
use serde_json::{Map, Value, json};

use crate::dispatch::{ActionSpace, CONFIRM_FIELD};
use crate::protocol::{ToolAnnotations, ToolDefinition};

/// Incrementally built `{"type": "object", ...}` input schema.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(mut self, name: &str, schema: Value) -> Self {
        self.properties.insert(name.to_string(), schema);
        self
    }

    pub fn string(self, name: &str, description: &str) -> Self {
        self.property(name, json!({"type": "string", "description": description}))
    }

    pub fn integer(self, name: &str, description: &str) -> Self {
        self.property(name, json!({"type": "integer", "description": description}))
    }

    pub fn boolean(self, name: &str, description: &str) -> Self {
        self.property(name, json!({"type": "boolean", "description": description}))
    }

    /// Free-form object forwarded to the management API.
    pub fn object(self, name: &str, description: &str) -> Self {
        self.property(
            name,
            json!({"type": "object", "description": description, "additionalProperties": true}),
        )
    }

    /// List of free-form objects.
    pub fn object_list(self, name: &str, description: &str) -> Self {
        self.property(
            name,
            json!({
                "type": "array",
                "description": description,
                "items": {"type": "object", "additionalProperties": true}
            }),
        )
    }

    pub fn string_list(self, name: &str, description: &str) -> Self {
        self.property(
            name,
            json!({"type": "array", "description": description, "items": {"type": "string"}}),
        )
    }

    pub fn integer_list(self, name: &str, description: &str) -> Self {
        self.property(
            name,
            json!({"type": "array", "description": description, "items": {"type": "integer"}}),
        )
    }

    pub fn enumeration(self, name: &str, description: &str, values: &[&str]) -> Self {
        self.property(
            name,
            json!({"type": "string", "description": description, "enum": values}),
        )
    }

    pub fn required(mut self, name: &str) -> Self {
        if !self.required.iter().any(|r| r == name) {
            self.required.push(name.to_string());
        }
        self
    }

    /// The discriminator property of an action space, required.
    pub fn actions(self, space: &ActionSpace, description: &str) -> Self {
        let names = space.action_names();
        self.enumeration(space.discriminator, description, &names)
            .required(space.discriminator)
    }

    /// The `confirm` flag of gated tools.
    pub fn confirm(self) -> Self {
        self.boolean(
            CONFIRM_FIELD,
            "Set to true to persist changes. Default false (preview only).",
        )
    }

    /// `rsqlParam`, `offset`, `limit` and `sortParam` for a paged list.
    pub fn paging(self, family: ResourceFamily, discovery_tool: &str) -> Self {
        let catalog = family.catalog();
        self.string("rsqlParam", &catalog.filter_hint(discovery_tool))
            .property(
                "offset",
                json!({"type": "integer", "minimum": 0, "description": "Offset of the first entry. Default 0."}),
            )
            .property(
                "limit",
                json!({"type": "integer", "minimum": 1, "description": "Number of entries per page. Default and max value: 50."}),
            )
            .string("sortParam", &catalog.sort_hint())
    }

    pub fn build(self) -> Value {
        let mut schema = json!({
            "type": "object",
            "properties": Value::Object(self.properties),
        });
        if !self.required.is_empty() {
            schema["required"] = json!(self.required);
        }
        schema
    }
}

/// Definition of a read-only tool.
pub fn read_tool(name: &str, description: &str, schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema: schema,
        annotations: Some(ToolAnnotations {
            read_only_hint: Some(true),
            ..Default::default()
        }),
    }
}

/// Definition of an action-discriminated tool; annotations follow the space.
pub fn action_tool(space: &ActionSpace, description: &str, schema: Value) -> ToolDefinition {
    let gated = space.mutating_actions();
    let annotations = if gated.is_empty() {
        ToolAnnotations {
            read_only_hint: Some(true),
            ..Default::default()
        }
    } else {
        ToolAnnotations {
            read_only_hint: Some(false),
            destructive_hint: Some(space.is_destructive()),
            requires_confirmation: Some(true),
            confirmation_actions: Some(gated.into_iter().map(str::to_string).collect()),
        }
    };
    ToolDefinition {
        name: space.tool.to_string(),
        description: Some(description.to_string()),
        input_schema: schema,
        annotations: Some(annotations),
    }
}

/// Definition of a `get<Resource>SearchFields` discovery tool.
pub fn search_fields_tool(name: &str, family: ResourceFamily) -> ToolDefinition {
    read_tool(
        name,
        &format!(
            "{} search fields and their relationships, for building rsqlParam filters and sortParam values",
            family.label()
        ),
        SchemaBuilder::new().build(),
    )
}
