//! # hawkbit-client
//!
//! Management REST API client for hawkbit-mcp.
//!
//! One async trait per resource family ([`api::TargetApi`],
//! [`api::RolloutApi`], ...) describes the calls the tool layer may make.
//! [`HttpManagementClient`] implements all of them over `reqwest` against
//! `{mgmt_url}/rest/v1`. Request bodies are typed ([`models`]); response
//! bodies are returned as untouched JSON so the tool layer can pass them
//! through verbatim.
//!
//! Every outbound call asks an [`auth::Authorizer`] for its `Authorization`
//! header. The OAuth2 client-credentials authorizer caches its token and
//! refreshes it transparently. This crate performs no retries.

pub mod api;
pub mod auth;
pub mod error;
pub mod http;
pub mod models;

pub use api::{
    ActionApi, ManagementApi, RolloutApi, TargetApi, TargetFilterApi, TargetTagApi, TargetTypeApi,
};
pub use auth::{Authorizer, BasicAuth, ClientCredentials, NoAuth, StaticBearer, authorizer_from_config};
pub use error::ClientError;
pub use http::HttpManagementClient;
