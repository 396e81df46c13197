//! Composite reads that stitch several management API calls together.
//!
//! Sub-fetches run one after another. A sub-fetch that is rejected, times
//! out or answers with an unreadable body is recorded as `<key>_error` and
//! the report is marked `partial`. Only authorization failures abort the
//! read, since no later call could succeed either.

use chrono::{SecondsFormat, Utc};
use hawkbit_client::{ClientError, TargetApi};
use serde_json::{Map, Value, json};

use crate::error::DispatchError;

/// Accumulates the parts of a composite read.
#[derive(Debug, Default)]
pub struct CompositeReport {
    parts: Map<String, Value>,
    failed: Vec<String>,
}

impl CompositeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a part that needs no fetching.
    pub fn insert(&mut self, key: &str, value: Value) {
        self.parts.insert(key.to_string(), value);
    }

    /// Store the outcome of one sub-fetch.
    ///
    /// Call-scoped failures are captured; anything else is returned.
    pub fn record(&mut self, key: &str, result: Result<Value, ClientError>) -> Result<(), ClientError> {
        match result {
            Ok(value) => {
                self.parts.insert(key.to_string(), value);
                Ok(())
            }
            Err(err) if err.is_call_scoped() => {
                tracing::warn!(part = key, error = %err, "Composite read part failed");
                self.parts.insert(format!("{key}_error"), Value::String(err.to_string()));
                self.failed.push(key.to_string());
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Keys whose sub-fetch failed.
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    pub fn into_value(self) -> Value {
        let mut out = self.parts;
        out.insert("partial".to_string(), json!(!self.failed.is_empty()));
        if !self.failed.is_empty() {
            out.insert("failedParts".to_string(), json!(self.failed));
        }
        out.insert(
            "retrievedAt".to_string(),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        Value::Object(out)
    }
}

/// Target plus attributes, tags, distribution sets and metadata.
///
/// Every part, the target included, may fail individually.
pub async fn target_details(
    api: &dyn TargetApi,
    controller_id: &str,
) -> Result<Value, DispatchError> {
    let mut report = CompositeReport::new();
    report.insert("controllerId", json!(controller_id));
    report.record("target", api.get_target(controller_id).await)?;
    report.record("attributes", api.get_attributes(controller_id).await)?;
    report.record("tags", api.get_tags(controller_id).await)?;
    report.record(
        "assignedDistributionSet",
        api.get_assigned_distribution_set(controller_id).await,
    )?;
    report.record(
        "installedDistributionSet",
        api.get_installed_distribution_set(controller_id).await,
    )?;
    report.record("metadata", api.list_metadata(controller_id).await)?;

    tracing::debug!(
        controller_id,
        partial = report.is_partial(),
        failed = ?report.failed(),
        "Assembled target details"
    );
    Ok(report.into_value())
}
