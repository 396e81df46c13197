//! Authorization providers for outbound management API calls.
//!
//! An [`Authorizer`] is asked for the `Authorization` header value before
//! every request. Static schemes answer immediately; [`ClientCredentials`]
//! fetches an OAuth2 token and caches it until shortly before it expires.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hawkbit_core::AuthConfig;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::ClientError;

/// Tokens are refreshed this long before the provider says they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(30);

/// Supplies the `Authorization` header for outbound calls.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Full header value (`Bearer ...`, `Basic ...`), or `None` to send none.
    async fn authorization(&self) -> Result<Option<String>, ClientError>;

    /// Scheme name for logs.
    fn scheme(&self) -> &'static str;
}

/// Sends no `Authorization` header.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAuth;

#[async_trait]
impl Authorizer for NoAuth {
    async fn authorization(&self) -> Result<Option<String>, ClientError> {
        Ok(None)
    }

    fn scheme(&self) -> &'static str {
        "none"
    }
}

/// A fixed bearer token.
#[derive(Clone)]
pub struct StaticBearer {
    header: String,
}

impl StaticBearer {
    pub fn new(token: impl AsRef<str>) -> Self {
        Self {
            header: format!("Bearer {}", token.as_ref().trim()),
        }
    }
}

#[async_trait]
impl Authorizer for StaticBearer {
    async fn authorization(&self) -> Result<Option<String>, ClientError> {
        Ok(Some(self.header.clone()))
    }

    fn scheme(&self) -> &'static str {
        "bearer"
    }
}

/// HTTP basic authentication.
#[derive(Clone)]
pub struct BasicAuth {
    header: String,
}

impl BasicAuth {
    pub fn new(username: &str, password: &str) -> Self {
        let encoded = STANDARD.encode(format!("{username}:{password}"));
        Self {
            header: format!("Basic {encoded}"),
        }
    }
}

#[async_trait]
impl Authorizer for BasicAuth {
    async fn authorization(&self) -> Result<Option<String>, ClientError> {
        Ok(Some(self.header.clone()))
    }

    fn scheme(&self) -> &'static str {
        "basic"
    }
}

struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// OAuth2 client credentials grant with a cached token.
///
/// Concurrent callers wait on the cache lock while a refresh is in flight,
/// so at most one token request is outstanding.
pub struct ClientCredentials {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: Option<String>,
    cache: Mutex<Option<CachedToken>>,
}

impl ClientCredentials {
    pub fn new(
        http: reqwest::Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: None,
            cache: Mutex::new(None),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    async fn fetch_token(&self) -> Result<CachedToken, ClientError> {
        let mut form = vec![
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        if let Some(scope) = &self.scope {
            form.push(("scope", scope.as_str()));
        }

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ClientError::Auth(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Auth(format!(
                "token endpoint returned HTTP {}",
                status.as_u16()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Auth(format!("invalid token response: {e}")))?;

        let lifetime = token
            .expires_in
            .map(|secs| Duration::from_secs(secs).saturating_sub(REFRESH_MARGIN))
            .unwrap_or(Duration::ZERO);

        tracing::debug!(
            client_id = %self.client_id,
            lifetime_secs = lifetime.as_secs(),
            "Obtained access token"
        );

        Ok(CachedToken {
            access_token: token.access_token,
            refresh_at: Instant::now() + lifetime,
        })
    }
}

#[async_trait]
impl Authorizer for ClientCredentials {
    async fn authorization(&self) -> Result<Option<String>, ClientError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if Instant::now() < cached.refresh_at {
                return Ok(Some(format!("Bearer {}", cached.access_token)));
            }
        }

        let fresh = self.fetch_token().await?;
        let header = format!("Bearer {}", fresh.access_token);
        *cache = Some(fresh);
        Ok(Some(header))
    }

    fn scheme(&self) -> &'static str {
        "client_credentials"
    }
}

/// Build the authorizer described by the configuration.
///
/// Secrets are resolved here, so a missing environment variable fails at
/// startup rather than on the first call.
pub fn authorizer_from_config(
    auth: &AuthConfig,
    http: reqwest::Client,
) -> Result<Arc<dyn Authorizer>, ClientError> {
    let secret = auth
        .resolve_secret()
        .map_err(|e| ClientError::InvalidConfig(e.to_string()))?
        .unwrap_or_default();

    let authorizer: Arc<dyn Authorizer> = match auth {
        AuthConfig::None => Arc::new(NoAuth),
        AuthConfig::Bearer { .. } => Arc::new(StaticBearer::new(secret)),
        AuthConfig::Basic { username, .. } => Arc::new(BasicAuth::new(username, &secret)),
        AuthConfig::ClientCredentials {
            token_url,
            client_id,
            scope,
            ..
        } => {
            let mut provider =
                ClientCredentials::new(http, token_url.clone(), client_id.clone(), secret);
            if let Some(scope) = scope {
                provider = provider.with_scope(scope.clone());
            }
            Arc::new(provider)
        }
    };
    Ok(authorizer)
}
