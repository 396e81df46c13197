//! Authorization configuration for outbound management API calls.
//!
//! Secrets can be given inline (development) or through an environment
//! variable reference (`*_env`). The environment variable wins when both are
//! set.

use super::ConfigError;
use serde::{Deserialize, Serialize};

/// How outbound requests are authorized.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No `Authorization` header.
    #[default]
    None,

    /// Fixed bearer token.
    Bearer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_env: Option<String>,
    },

    /// HTTP basic authentication (`tenant\user` style usernames pass through).
    Basic {
        username: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password_env: Option<String>,
    },

    /// OAuth2 client credentials grant against an identity provider.
    ClientCredentials {
        token_url: String,
        client_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_secret: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_secret_env: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope: Option<String>,
    },
}

impl AuthConfig {
    /// Short name of the configured scheme, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthConfig::None => "none",
            AuthConfig::Bearer { .. } => "bearer",
            AuthConfig::Basic { .. } => "basic",
            AuthConfig::ClientCredentials { .. } => "client_credentials",
        }
    }

    /// Resolve the secret of this scheme from inline value or environment.
    ///
    /// Returns `Ok(None)` for [`AuthConfig::None`].
    pub fn resolve_secret(&self) -> Result<Option<String>, ConfigError> {
        match self {
            AuthConfig::None => Ok(None),
            AuthConfig::Bearer { token, token_env } => {
                resolve_secret("auth.token", token.as_deref(), token_env.as_deref()).map(Some)
            }
            AuthConfig::Basic {
                password,
                password_env,
                ..
            } => resolve_secret("auth.password", password.as_deref(), password_env.as_deref())
                .map(Some),
            AuthConfig::ClientCredentials {
                client_secret,
                client_secret_env,
                ..
            } => resolve_secret(
                "auth.client_secret",
                client_secret.as_deref(),
                client_secret_env.as_deref(),
            )
            .map(Some),
        }
    }
}

fn resolve_secret(
    field: &str,
    inline: Option<&str>,
    env_var: Option<&str>,
) -> Result<String, ConfigError> {
    if let Some(var) = env_var {
        return match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(ConfigError::Config(format!(
                "{field}: environment variable {var} is not set"
            ))),
        };
    }
    match inline {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::Config(format!(
            "{field}: provide an inline value or an environment variable reference"
        ))),
    }
}
