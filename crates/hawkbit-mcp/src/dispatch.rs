//! Guarded intent dispatch.
//!
//! Every action-discriminated tool declares an [`ActionSpace`]: the actions it
//! accepts, the fields each action requires and whether it mutates backend
//! state. [`admit`] runs a call through three stages before anything reaches
//! the management API:
//!
//! 1. **Validation**: the action must belong to the space and every required
//!    field must be supplied. All missing fields are reported together.
//! 2. **Decoding**: the arguments become the family's command type, one
//!    variant per action.
//! 3. **Gate**: a mutating action without `confirm: true` yields a
//!    [`PreviewEnvelope`] instead of the command.
//!
//! A rejected call never touches the backend.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::arguments::Arguments;
use crate::error::DispatchError;

pub const PREVIEW_STATUS: &str = "PREVIEW";
pub const PREVIEW_MESSAGE: &str = "PREVIEW MODE: No changes were made. Please confirm to proceed.";

/// Argument that confirms a mutating action.
pub const CONFIRM_FIELD: &str = "confirm";

/// One action of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub action: &'static str,
    pub required_fields: &'static [&'static str],
    /// Fields the action reads when supplied.
    pub optional_fields: &'static [&'static str],
    /// Required fields for which an empty string is a real value.
    pub empty_allowed: &'static [&'static str],
    pub mutating: bool,
    /// Unassign/delete style actions.
    pub destructive: bool,
}

impl ActionDescriptor {
    pub const fn read(action: &'static str, required_fields: &'static [&'static str]) -> Self {
        Self {
            action,
            required_fields,
            optional_fields: &[],
            empty_allowed: &[],
            mutating: false,
            destructive: false,
        }
    }

    pub const fn write(action: &'static str, required_fields: &'static [&'static str]) -> Self {
        Self {
            action,
            required_fields,
            optional_fields: &[],
            empty_allowed: &[],
            mutating: true,
            destructive: false,
        }
    }

    pub const fn delete(action: &'static str, required_fields: &'static [&'static str]) -> Self {
        Self {
            action,
            required_fields,
            optional_fields: &[],
            empty_allowed: &[],
            mutating: true,
            destructive: true,
        }
    }

    pub const fn with_optional(mut self, optional_fields: &'static [&'static str]) -> Self {
        self.optional_fields = optional_fields;
        self
    }

    pub const fn allow_empty(mut self, empty_allowed: &'static [&'static str]) -> Self {
        self.empty_allowed = empty_allowed;
        self
    }

    /// Supplied value of `field`, keeping empty strings where allowed.
    fn value_of<'a>(&self, args: Arguments<'a>, field: &str) -> Option<&'a Value> {
        args.get(field).or_else(|| {
            if self.empty_allowed.iter().any(|f| *f == field) {
                args.raw(field).filter(|v| v.is_string())
            } else {
                None
            }
        })
    }

    /// Required fields followed by optional ones.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> {
        self.required_fields
            .iter()
            .chain(self.optional_fields.iter())
            .copied()
    }
}

/// The actions accepted by one tool.
#[derive(Debug, Clone, Copy)]
pub struct ActionSpace {
    pub tool: &'static str,
    /// Argument holding the action name.
    pub discriminator: &'static str,
    pub actions: &'static [ActionDescriptor],
}

impl ActionSpace {
    pub fn find(&self, action: &str) -> Option<&'static ActionDescriptor> {
        self.actions.iter().find(|d| d.action == action)
    }

    pub fn action_names(&self) -> Vec<&'static str> {
        self.actions.iter().map(|d| d.action).collect()
    }

    pub fn mutating_actions(&self) -> Vec<&'static str> {
        self.actions
            .iter()
            .filter(|d| d.mutating)
            .map(|d| d.action)
            .collect()
    }

    pub fn is_read_only(&self) -> bool {
        self.actions.iter().all(|d| !d.mutating)
    }

    pub fn is_destructive(&self) -> bool {
        self.actions.iter().any(|d| d.destructive)
    }
}

/// One agent call of an action-discriminated tool.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub tool_name: String,
    /// Value of the space's discriminator argument, if a string was given.
    pub action: Option<String>,
    pub arguments: Map<String, Value>,
    /// Only a literal JSON `true` confirms.
    pub confirm: bool,
}

impl ToolInvocation {
    pub fn new(space: &ActionSpace, arguments: Value) -> Result<Self, DispatchError> {
        let arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => {
                return Err(DispatchError::invalid(
                    "arguments",
                    "tool arguments must be a JSON object",
                ));
            }
        };
        let action = arguments
            .get(space.discriminator)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let confirm = matches!(arguments.get(CONFIRM_FIELD), Some(Value::Bool(true)));
        Ok(Self {
            tool_name: space.tool.to_string(),
            action,
            arguments,
            confirm,
        })
    }

    pub fn args(&self) -> Arguments<'_> {
        Arguments::new(&self.arguments)
    }
}

/// Returned in place of a mutating call that was not confirmed.
///
/// Serializes flat: `{status, message, action, <identifiers>, <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewEnvelope {
    pub status: &'static str,
    pub message: &'static str,
    pub action: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl PreviewEnvelope {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            status: PREVIEW_STATUS,
            message: PREVIEW_MESSAGE,
            action: action.into(),
            details: Map::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        out.insert("status".to_string(), Value::from(self.status));
        out.insert("message".to_string(), Value::from(self.message));
        out.insert("action".to_string(), Value::from(self.action.clone()));
        for (key, value) in &self.details {
            out.insert(key.clone(), value.clone());
        }
        Value::Object(out)
    }
}

/// Result of admission.
#[derive(Debug)]
pub enum Gate<C> {
    /// Not confirmed; nothing was executed.
    Preview(PreviewEnvelope),
    /// Validated and decoded; execute it.
    Proceed(C),
}

/// Per-family command decoded from an admitted invocation.
pub trait Command: Sized {
    /// The action space this command is decoded from.
    fn space() -> &'static ActionSpace;

    /// Decode validated arguments for `descriptor.action`.
    fn decode(descriptor: &ActionDescriptor, args: Arguments<'_>) -> Result<Self, DispatchError>;

    /// Extra entries for the preview envelope.
    fn preview_details(&self) -> Vec<(&'static str, Value)> {
        Vec::new()
    }
}

/// Validate, decode and gate one invocation.
pub fn admit<C: Command>(invocation: &ToolInvocation) -> Result<Gate<C>, DispatchError> {
    let space = C::space();
    let args = invocation.args();

    let action = match (&invocation.action, args.get(space.discriminator)) {
        (Some(action), _) => action.as_str(),
        (None, None) => {
            return Err(DispatchError::MissingRequiredField {
                tool: space.tool.to_string(),
                action: String::new(),
                fields: vec![space.discriminator.to_string()],
            });
        }
        (None, Some(other)) => {
            return Err(DispatchError::invalid(
                space.discriminator,
                format!("expected an action name, got {other}"),
            ));
        }
    };

    let descriptor = space
        .find(action)
        .ok_or_else(|| DispatchError::UnsupportedAction {
            tool: space.tool.to_string(),
            action: action.to_string(),
            expected: space.action_names(),
        })?;

    let missing: Vec<String> = descriptor
        .required_fields
        .iter()
        .filter(|f| descriptor.value_of(args, f).is_none())
        .map(|f| f.to_string())
        .collect();
    if !missing.is_empty() {
        tracing::debug!(
            tool = space.tool,
            action = descriptor.action,
            missing = ?missing,
            "Rejected call with missing fields"
        );
        return Err(DispatchError::MissingRequiredField {
            tool: space.tool.to_string(),
            action: descriptor.action.to_string(),
            fields: missing,
        });
    }

    let command = C::decode(descriptor, args)?;

    if descriptor.mutating && !invocation.confirm {
        let mut envelope = PreviewEnvelope::new(descriptor.action);
        for field in descriptor.fields() {
            if let Some(value) = descriptor.value_of(args, field) {
                envelope.details.insert(field.to_string(), value.clone());
            }
        }
        for (key, value) in command.preview_details() {
            envelope.details.insert(key.to_string(), value);
        }
        tracing::debug!(tool = space.tool, action = descriptor.action, "Returning preview");
        return Ok(Gate::Preview(envelope));
    }

    tracing::debug!(
        tool = space.tool,
        action = descriptor.action,
        mutating = descriptor.mutating,
        "Dispatching action"
    );
    Ok(Gate::Proceed(command))
}
