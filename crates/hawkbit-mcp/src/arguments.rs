//! Typed access to tool call arguments.
//!
//! Agents send loosely typed JSON: ids as strings, booleans as `"true"`, a
//! single object where a list is expected. Accessors accept those spellings
//! and report anything else as [`DispatchError::InvalidArgument`].

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::DispatchError;

/// Whether a field counts as supplied.
///
/// Absent, `null`, blank strings, empty arrays and empty objects do not.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

/// Read-only view over the argument object of one call.
#[derive(Debug, Clone, Copy)]
pub struct Arguments<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Arguments<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    /// Raw value of a supplied field.
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).filter(|v| is_present(Some(v)))
    }

    /// Value of a field as sent, blank or not.
    pub fn raw(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field)
    }

    pub fn is_present(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Fields of `fields` that are not supplied, in the given order.
    pub fn missing(&self, fields: &[&str]) -> Vec<String> {
        fields
            .iter()
            .filter(|f| !self.is_present(f))
            .map(|f| f.to_string())
            .collect()
    }

    pub fn string(&self, field: &str) -> Result<String, DispatchError> {
        self.opt_string(field)?
            .ok_or_else(|| DispatchError::invalid(field, "a value is required"))
    }

    pub fn opt_string(&self, field: &str) -> Result<Option<String>, DispatchError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(DispatchError::invalid(
                field,
                format!("expected a string, got {}", type_name(other)),
            )),
        }
    }

    /// Like [`opt_string`](Self::opt_string) but keeps an empty string.
    pub fn raw_string(&self, field: &str) -> Result<Option<String>, DispatchError> {
        match self.map.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(DispatchError::invalid(
                field,
                format!("expected a string, got {}", type_name(other)),
            )),
        }
    }

    pub fn id(&self, field: &str) -> Result<i64, DispatchError> {
        self.opt_i64(field)?
            .ok_or_else(|| DispatchError::invalid(field, "a value is required"))
    }

    pub fn opt_i64(&self, field: &str) -> Result<Option<i64>, DispatchError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| DispatchError::invalid(field, format!("expected an integer, got {n}"))),
            Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| {
                DispatchError::invalid(field, format!("expected an integer, got '{s}'"))
            }),
            Some(other) => Err(DispatchError::invalid(
                field,
                format!("expected an integer, got {}", type_name(other)),
            )),
        }
    }

    pub fn opt_bool(&self, field: &str) -> Result<Option<bool>, DispatchError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(other) => Err(DispatchError::invalid(
                field,
                format!("expected a boolean, got {}", type_name(other)),
            )),
        }
    }

    /// Decode an object payload into its request type.
    pub fn body<T: DeserializeOwned>(&self, field: &str) -> Result<T, DispatchError> {
        let value = self
            .get(field)
            .ok_or_else(|| DispatchError::invalid(field, "a value is required"))?;
        if !value.is_object() {
            return Err(DispatchError::invalid(
                field,
                format!("expected an object, got {}", type_name(value)),
            ));
        }
        decode(field, value.clone())
    }

    /// Decode a list payload; a single object is taken as a list of one.
    pub fn list<T: DeserializeOwned>(&self, field: &str) -> Result<Vec<T>, DispatchError> {
        match self.get(field) {
            None => Err(DispatchError::invalid(field, "a value is required")),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| decode(&format!("{field}[{i}]"), item.clone()))
                .collect(),
            Some(single @ Value::Object(_)) => Ok(vec![decode(field, single.clone())?]),
            Some(other) => Err(DispatchError::invalid(
                field,
                format!("expected a list, got {}", type_name(other)),
            )),
        }
    }

    /// A list of string keys; numbers are taken as their decimal text and a
    /// single string as a list of one.
    pub fn string_list(&self, field: &str) -> Result<Vec<String>, DispatchError> {
        let items = match self.get(field) {
            Some(Value::Array(items)) => items.as_slice(),
            Some(single @ Value::String(_)) => std::slice::from_ref(single),
            Some(other) => {
                return Err(DispatchError::invalid(
                    field,
                    format!("expected a list of strings, got {}", type_name(other)),
                ));
            }
            None => return Err(DispatchError::invalid(field, "a value is required")),
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(DispatchError::invalid(
                    format!("{field}[{i}]"),
                    format!("expected a non-blank string, got {}", type_name(other)),
                )),
            })
            .collect()
    }

    /// A list of ids; numeric strings are accepted.
    pub fn id_list(&self, field: &str) -> Result<Vec<i64>, DispatchError> {
        let items = match self.get(field) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(DispatchError::invalid(
                    field,
                    format!("expected a list of ids, got {}", type_name(other)),
                ));
            }
            None => return Err(DispatchError::invalid(field, "a value is required")),
        };
        items
            .iter()
            .map(|item| match item {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .map(|id| id.ok_or_else(|| DispatchError::invalid(field, "expected a list of integer ids")))
            .collect()
    }
}

fn decode<T: DeserializeOwned>(field: &str, value: Value) -> Result<T, DispatchError> {
    serde_json::from_value(value).map_err(|e| DispatchError::invalid(field, e.to_string()))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
