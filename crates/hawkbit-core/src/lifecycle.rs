//! Rollout lifecycle states and the verbs that move between them.
//!
//! The management server owns the state; this module only names the states
//! and records which states each verb is accepted from, so previews and
//! error messages can tell the agent what the server expects. Verbs are never
//! pre-checked against a fetched state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rollout state as reported by the management server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RolloutLifecycleState {
    Creating,
    Ready,
    Running,
    Paused,
    WaitingForApproval,
    Approved,
    Denied,
    Finished,
    Error,
    /// A state outside the modelled set (e.g. `starting`, `deleting`).
    Other(String),
}

impl RolloutLifecycleState {
    /// Parse a backend status string, case-insensitively.
    pub fn parse(status: &str) -> Self {
        match status.trim().to_ascii_uppercase().as_str() {
            "CREATING" => Self::Creating,
            "READY" => Self::Ready,
            "RUNNING" => Self::Running,
            "PAUSED" => Self::Paused,
            "WAITING_FOR_APPROVAL" => Self::WaitingForApproval,
            "APPROVED" => Self::Approved,
            "DENIED" | "APPROVAL_DENIED" => Self::Denied,
            "FINISHED" => Self::Finished,
            "ERROR" | "ERROR_CREATING" | "ERROR_STARTING" => Self::Error,
            _ => Self::Other(status.trim().to_string()),
        }
    }

    /// Read the `status` field of a rollout representation.
    pub fn from_rollout(rollout: &serde_json::Value) -> Option<Self> {
        rollout.get("status").and_then(|s| s.as_str()).map(Self::parse)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "CREATING",
            Self::Ready => "READY",
            Self::Running => "RUNNING",
            Self::Paused => "PAUSED",
            Self::WaitingForApproval => "WAITING_FOR_APPROVAL",
            Self::Approved => "APPROVED",
            Self::Denied => "DENIED",
            Self::Finished => "FINISHED",
            Self::Error => "ERROR",
            Self::Other(s) => s,
        }
    }

    /// No verb moves a rollout out of these states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Denied)
    }
}

impl fmt::Display for RolloutLifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static FROM_READY: [RolloutLifecycleState; 1] = [RolloutLifecycleState::Ready];
static FROM_RUNNING: [RolloutLifecycleState; 1] = [RolloutLifecycleState::Running];
static FROM_PAUSED: [RolloutLifecycleState; 1] = [RolloutLifecycleState::Paused];
static FROM_WAITING_FOR_APPROVAL: [RolloutLifecycleState; 1] =
    [RolloutLifecycleState::WaitingForApproval];
static FROM_ERROR: [RolloutLifecycleState; 1] = [RolloutLifecycleState::Error];

/// Lifecycle verbs accepted by `manageRolloutState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleVerb {
    Start,
    Pause,
    Resume,
    TriggerNextGroup,
    Approve,
    Deny,
    Retry,
}

impl LifecycleVerb {
    pub const ALL: [LifecycleVerb; 7] = [
        LifecycleVerb::Start,
        LifecycleVerb::Pause,
        LifecycleVerb::Resume,
        LifecycleVerb::TriggerNextGroup,
        LifecycleVerb::Approve,
        LifecycleVerb::Deny,
        LifecycleVerb::Retry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleVerb::Start => "START",
            LifecycleVerb::Pause => "PAUSE",
            LifecycleVerb::Resume => "RESUME",
            LifecycleVerb::TriggerNextGroup => "TRIGGER_NEXT_GROUP",
            LifecycleVerb::Approve => "APPROVE",
            LifecycleVerb::Deny => "DENY",
            LifecycleVerb::Retry => "RETRY",
        }
    }

    /// Parse the wire name of a verb.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|verb| verb.as_str() == name)
    }

    /// States the management server accepts this verb from.
    pub fn valid_from(self) -> &'static [RolloutLifecycleState] {
        match self {
            LifecycleVerb::Start => &FROM_READY,
            LifecycleVerb::Pause | LifecycleVerb::TriggerNextGroup => &FROM_RUNNING,
            LifecycleVerb::Resume => &FROM_PAUSED,
            LifecycleVerb::Approve | LifecycleVerb::Deny => &FROM_WAITING_FOR_APPROVAL,
            LifecycleVerb::Retry => &FROM_ERROR,
        }
    }

    /// State the rollout is expected to reach when the verb succeeds.
    pub fn expected_target(self) -> Option<RolloutLifecycleState> {
        match self {
            LifecycleVerb::Start | LifecycleVerb::Resume => Some(RolloutLifecycleState::Running),
            LifecycleVerb::Pause => Some(RolloutLifecycleState::Paused),
            LifecycleVerb::Approve => Some(RolloutLifecycleState::Approved),
            LifecycleVerb::Deny => Some(RolloutLifecycleState::Denied),
            LifecycleVerb::TriggerNextGroup | LifecycleVerb::Retry => None,
        }
    }

    /// Only APPROVE and DENY carry a remark.
    pub fn takes_remark(self) -> bool {
        matches!(self, LifecycleVerb::Approve | LifecycleVerb::Deny)
    }
}

impl fmt::Display for LifecycleVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
