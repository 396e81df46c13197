//! Error types for the management API client.

use thiserror::Error;

/// Errors raised by management API calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The management server rejected the call (4xx/5xx).
    #[error("{operation} failed with HTTP {status}: {detail}")]
    Remote {
        operation: &'static str,
        status: u16,
        detail: String,
    },

    /// The request never produced an HTTP response.
    #[error("{operation} failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// No credential could be obtained for the call.
    #[error("authorization failed: {0}")]
    Auth(String),

    /// The response body was not the expected JSON.
    #[error("{operation}: invalid response body: {reason}")]
    Decode {
        operation: &'static str,
        reason: String,
    },

    /// The client could not be built from its configuration.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// HTTP status of a remote rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Failures confined to the single call that raised them.
    ///
    /// Composite reads record these per field. `Auth` and `InvalidConfig`
    /// mean no call can succeed.
    pub fn is_call_scoped(&self) -> bool {
        matches!(
            self,
            ClientError::Remote { .. } | ClientError::Decode { .. } | ClientError::Transport { .. }
        )
    }
}
