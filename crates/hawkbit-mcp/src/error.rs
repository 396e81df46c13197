//! Error types for the MCP crate.

use hawkbit_client::ClientError;
use serde_json::{Value, json};
use thiserror::Error;

/// Errors that can occur in the MCP server itself.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start the server.
    #[error("failed to start MCP server: {0}")]
    StartupFailed(String),

    /// Tool not found.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Outcome of a tool invocation that did not produce a result.
///
/// Everything except `Remote` is raised before any backend call is made.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// One or more required fields are absent, null or empty.
    #[error(
        "{tool}: action {action} requires the following field(s): {}",
        .fields.join(", ")
    )]
    MissingRequiredField {
        tool: String,
        action: String,
        fields: Vec<String>,
    },

    /// The action discriminator is not part of the tool's action space.
    #[error(
        "{tool}: unsupported action '{action}', expected one of: {}",
        .expected.join(", ")
    )]
    UnsupportedAction {
        tool: String,
        action: String,
        expected: Vec<&'static str>,
    },

    /// A field is present but malformed.
    #[error("invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    /// The management server (or the path to it) failed the call.
    #[error("{source}{}", hint_suffix(.hint))]
    Remote {
        #[source]
        source: ClientError,
        hint: Option<String>,
    },
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_deref()
        .map(|h| format!(" (hint: {h})"))
        .unwrap_or_default()
}

impl From<ClientError> for DispatchError {
    fn from(source: ClientError) -> Self {
        DispatchError::Remote { source, hint: None }
    }
}

impl DispatchError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DispatchError::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Attach a hint to a remote failure; other variants are returned as-is.
    pub fn with_hint(self, hint: impl Into<String>) -> Self {
        match self {
            DispatchError::Remote { source, .. } => DispatchError::Remote {
                source,
                hint: Some(hint.into()),
            },
            other => other,
        }
    }

    /// Variant name used as the `error` discriminator in tool results.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::MissingRequiredField { .. } => "MissingRequiredField",
            DispatchError::UnsupportedAction { .. } => "UnsupportedAction",
            DispatchError::InvalidArgument { .. } => "InvalidArgument",
            DispatchError::Remote { .. } => "RemoteError",
        }
    }

    /// Structured form carried in `structuredContent` of an error result.
    pub fn to_structured(&self) -> Value {
        let mut out = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        match self {
            DispatchError::MissingRequiredField {
                tool,
                action,
                fields,
            } => {
                out["tool"] = json!(tool);
                out["action"] = json!(action);
                out["fields"] = json!(fields);
            }
            DispatchError::UnsupportedAction {
                tool,
                action,
                expected,
            } => {
                out["tool"] = json!(tool);
                out["action"] = json!(action);
                out["expected"] = json!(expected);
            }
            DispatchError::InvalidArgument { field, .. } => {
                out["field"] = json!(field);
            }
            DispatchError::Remote { source, hint } => {
                if let Some(status) = source.status() {
                    out["status"] = json!(status);
                }
                if let Some(hint) = hint {
                    out["hint"] = json!(hint);
                }
            }
        }
        out
    }
}
