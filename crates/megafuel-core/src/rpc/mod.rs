//! JSON-RPC transport abstraction.
//!
//! Defines the [`Endpoint`] and [`Dialer`] traits the router dispatches
//! through, and provides an HTTP implementation ([`HttpEndpoint`],
//! [`HttpDialer`]) plus a recording test mock (`mock::MockEndpoint`).

mod http_adapter;
#[cfg(test)]
pub mod mock;

pub use http_adapter::{HttpDialer, HttpEndpoint};

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ClientError;

/// Request header that scopes a call to a sponsor policy.
pub const POLICY_UUID_HEADER: &str = "X-MegaFuel-Policy-Uuid";

/// Headers attached to one outgoing request.
///
/// Built fresh by the router for every call and passed into the transport;
/// endpoints never store them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallHeaders {
    pub policy_uuid: Option<String>,
    pub user_agent: Option<String>,
}

/// A dialed JSON-RPC endpoint.
///
/// Implementations must be safe to share across concurrent calls; all
/// per-call data arrives through the `call` arguments.
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// The URL or other target this endpoint was dialed with.
    fn target(&self) -> &str;

    /// Issue a single JSON-RPC request with positional `params` and return
    /// the raw `result` value.
    async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
        headers: &CallHeaders,
    ) -> Result<serde_json::Value, ClientError>;

    /// Release the endpoint. Later calls fail with `EndpointClosed`.
    fn close(&self);

    fn is_closed(&self) -> bool;
}

/// Opens endpoints for the router at construction time.
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(&self, target: &str) -> Result<Arc<dyn Endpoint>, ClientError>;
}
