//! Tool results and their MCP rendering.

use serde_json::{Value, json};

use crate::dispatch::PreviewEnvelope;
use crate::error::DispatchError;
use crate::protocol::{CallToolResponse, ToolContent};

/// What a tool produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Backend response, passed through unchanged.
    Json(Value),
    /// Confirmation string for calls without a response body, or discovery text.
    Message(String),
    /// A mutating call that was not confirmed.
    Preview(PreviewEnvelope),
}

impl ToolOutput {
    pub fn message(text: impl Into<String>) -> Self {
        ToolOutput::Message(text.into())
    }

    /// JSON view of the output (messages become strings).
    pub fn to_value(&self) -> Value {
        match self {
            ToolOutput::Json(value) => value.clone(),
            ToolOutput::Message(text) => Value::String(text.clone()),
            ToolOutput::Preview(envelope) => envelope.to_value(),
        }
    }

    pub fn is_preview(&self) -> bool {
        matches!(self, ToolOutput::Preview(_))
    }

    pub fn into_response(self) -> CallToolResponse {
        match self {
            ToolOutput::Message(text) => CallToolResponse {
                content: vec![ToolContent::text(text)],
                structured_content: None,
                is_error: false,
            },
            other => {
                let value = other.to_value();
                CallToolResponse {
                    content: vec![ToolContent::text(render(&value))],
                    structured_content: Some(structured(value)),
                    is_error: false,
                }
            }
        }
    }
}

impl From<DispatchError> for CallToolResponse {
    fn from(err: DispatchError) -> Self {
        CallToolResponse {
            content: vec![ToolContent::text(err.to_string())],
            structured_content: Some(err.to_structured()),
            is_error: true,
        }
    }
}

/// Render a tool result from a dispatch outcome.
pub fn to_response(result: Result<ToolOutput, DispatchError>) -> CallToolResponse {
    match result {
        Ok(output) => output.into_response(),
        Err(err) => err.into(),
    }
}

fn render(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

// structuredContent must be an object.
fn structured(value: Value) -> Value {
    match value {
        Value::Object(_) => value,
        other => json!({ "result": other }),
    }
}
