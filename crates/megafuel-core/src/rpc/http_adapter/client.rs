use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header;
use reqwest::Url;
use tracing::{debug, trace};

use crate::config::TransportOptions;
use crate::error::{ClientError, RpcError};

use super::super::{CallHeaders, Dialer, Endpoint, POLICY_UUID_HEADER};
use super::connection::parse_connection;
use super::protocol::{JsonRpcRequest, JsonRpcResponse};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// JSON-RPC endpoint over HTTP(S).
///
/// Holds no per-call state: policy and `User-Agent` headers are applied to
/// each request builder individually, so one endpoint can serve concurrent
/// calls with different headers.
pub struct HttpEndpoint {
    client: reqwest::Client,
    target: String,
    url: Url,
    limiter: Option<DirectRateLimiter>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl HttpEndpoint {
    /// Validate `connection` and build the HTTP client for it.
    ///
    /// HTTP has no persistent session, so dialing only checks that the
    /// target is an `http://` or `https://` URL and that the client builds.
    pub fn dial(connection: &str, options: &TransportOptions) -> Result<Self, ClientError> {
        let url = parse_connection(connection)?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.timeout)
            .pool_max_idle_per_host(32)
            .tcp_nodelay(true);
        if let Some(user_agent) = &options.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder.build().map_err(|e| ClientError::DialFailure {
            target: connection.to_owned(),
            reason: format!("build HTTP client: {e}"),
        })?;

        let limiter = match options.requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| ClientError::DialFailure {
                    target: connection.to_owned(),
                    reason: "requests_per_second must be at least 1".to_owned(),
                })?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self {
            client,
            target: connection.to_owned(),
            url,
            limiter,
            next_id: AtomicU64::new(initial_request_id()),
            closed: AtomicBool::new(false),
        })
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

#[async_trait]
impl Endpoint for HttpEndpoint {
    fn target(&self) -> &str {
        &self.target
    }

    async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
        headers: &CallHeaders,
    ) -> Result<serde_json::Value, ClientError> {
        if self.is_closed() {
            return Err(ClientError::EndpointClosed(self.target.clone()));
        }

        self.wait_for_rate_limit().await;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(
            rpc.id = id,
            rpc.method = method,
            rpc.params = params.len(),
            rpc.policy = headers.policy_uuid.is_some(),
            "rpc call"
        );
        let req = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let mut builder = self
            .client
            .post(self.url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .json(&req);
        if let Some(policy_uuid) = &headers.policy_uuid {
            builder = builder.header(POLICY_UUID_HEADER, policy_uuid);
        }
        if let Some(user_agent) = &headers.user_agent {
            builder = builder.header(header::USER_AGENT, user_agent);
        }

        let response = builder.send().await.map_err(RpcError::Transport)?;
        let status = response.status();

        let body = response.text().await.map_err(RpcError::Transport)?;
        debug!(rpc.id = id, rpc.method = method, %status, body_len = body.len(), "rpc response");
        trace!(rpc.id = id, rpc.method = method, body = %body, "rpc response body");

        let decoded: JsonRpcResponse = serde_json::from_str(&body).map_err(|e| {
            RpcError::InvalidResponse(format!(
                "decode JSON-RPC response (HTTP {status}): {e}; body={body}"
            ))
        })?;

        decoded.into_result()
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(rpc.endpoint = %self.url.host_str().unwrap_or_default(), "endpoint closed");
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Dials [`HttpEndpoint`]s with a shared set of [`TransportOptions`].
#[derive(Debug, Clone, Default)]
pub struct HttpDialer {
    options: TransportOptions,
}

impl HttpDialer {
    pub fn new(options: TransportOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Dialer for HttpDialer {
    async fn dial(&self, target: &str) -> Result<Arc<dyn Endpoint>, ClientError> {
        Ok(Arc::new(HttpEndpoint::dial(target, &self.options)?))
    }
}

fn initial_request_id() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| u64::try_from(d.as_nanos()).ok())
        .unwrap_or(1)
}
