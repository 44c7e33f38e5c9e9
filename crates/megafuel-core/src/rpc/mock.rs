use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ClientError, RpcError};

use super::{CallHeaders, Dialer, Endpoint};

/// One request observed by a [`MockEndpoint`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Vec<serde_json::Value>,
    pub headers: CallHeaders,
}

#[derive(Clone)]
enum CannedReply {
    Result(serde_json::Value),
    ServerError { code: i64, message: String },
}

/// A mock endpoint for testing. Returns canned results per method, populated
/// via the builder pattern, and records every call it receives.
pub struct MockEndpoint {
    target: String,
    replies: HashMap<String, CannedReply>,
    delay: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
    closed: AtomicBool,
}

impl MockEndpoint {
    pub fn builder(target: &str) -> MockEndpointBuilder {
        MockEndpointBuilder {
            target: target.to_owned(),
            replies: HashMap::new(),
            delay: None,
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mock call log poisoned").clone()
    }
}

pub struct MockEndpointBuilder {
    target: String,
    replies: HashMap<String, CannedReply>,
    delay: Option<Duration>,
}

impl MockEndpointBuilder {
    pub fn with_result(mut self, method: &str, result: serde_json::Value) -> Self {
        self.replies
            .insert(method.to_owned(), CannedReply::Result(result));
        self
    }

    pub fn with_server_error(mut self, method: &str, code: i64, message: &str) -> Self {
        self.replies.insert(
            method.to_owned(),
            CannedReply::ServerError {
                code,
                message: message.to_owned(),
            },
        );
        self
    }

    /// Delay every reply, for exercising cancellation and deadlines.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn build(self) -> Arc<MockEndpoint> {
        Arc::new(MockEndpoint {
            target: self.target,
            replies: self.replies,
            delay: self.delay,
            calls: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl Endpoint for MockEndpoint {
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

        self.calls
            .lock()
            .expect("mock call log poisoned")
            .push(RecordedCall {
                method: method.to_owned(),
                params,
                headers: headers.clone(),
            });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.replies.get(method) {
            Some(CannedReply::Result(value)) => Ok(value.clone()),
            Some(CannedReply::ServerError { code, message }) => {
                Err(ClientError::Rpc(RpcError::ServerError {
                    code: *code,
                    message: message.clone(),
                    data: None,
                }))
            }
            None => Err(ClientError::Rpc(RpcError::ServerError {
                code: -32601,
                message: format!("the method {method} does not exist/is not available"),
                data: None,
            })),
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// A dialer that hands out fresh [`MockEndpoint`]s and keeps them for
/// inspection. Targets registered with `fail_on` fail to dial.
#[derive(Default)]
pub struct MockDialer {
    failing: HashSet<String>,
    dialed: Mutex<Vec<Arc<MockEndpoint>>>,
}

impl MockDialer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(mut self, target: &str) -> Self {
        self.failing.insert(target.to_owned());
        self
    }

    pub fn dialed(&self) -> Vec<Arc<MockEndpoint>> {
        self.dialed.lock().expect("mock dial log poisoned").clone()
    }
}

#[async_trait]
impl Dialer for MockDialer {
    async fn dial(&self, target: &str) -> Result<Arc<dyn Endpoint>, ClientError> {
        if self.failing.contains(target) {
            return Err(ClientError::DialFailure {
                target: target.to_owned(),
                reason: "connection refused".to_owned(),
            });
        }
        let endpoint = MockEndpoint::builder(target).build();
        self.dialed
            .lock()
            .expect("mock dial log poisoned")
            .push(Arc::clone(&endpoint));
        Ok(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_method_returns_method_not_found() {
        let endpoint = MockEndpoint::builder("mock://user").build();
        let err = endpoint
            .call("pm_unknown", Vec::new(), &CallHeaders::default())
            .await
            .expect_err("unknown method must fail");
        assert_eq!(err.remote_code(), Some(-32601));
        assert_eq!(endpoint.calls().len(), 1);
    }

    #[tokio::test]
    async fn failing_dialer_records_nothing() {
        let dialer = MockDialer::new().fail_on("mock://sponsor");
        assert!(dialer.dial("mock://sponsor").await.is_err());
        assert!(dialer.dialed().is_empty());
    }
}
