//! Per-call values: policy scoping, transport overrides, and cancellation.
//!
//! A [`CallContext`] is an immutable value passed by reference into every
//! facade method. Nothing in it is written back to endpoint state, so two
//! concurrent calls on the same client never observe each other's headers.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Policy identifier attached to a single call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyContext {
    policy_uuid: String,
}

impl PolicyContext {
    pub fn new(policy_uuid: impl Into<String>) -> Self {
        Self {
            policy_uuid: policy_uuid.into(),
        }
    }

    /// The policy identifier, or `None` when it is empty.
    pub fn policy_uuid(&self) -> Option<&str> {
        let trimmed = self.policy_uuid.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

impl From<Uuid> for PolicyContext {
    fn from(value: Uuid) -> Self {
        Self::new(value.to_string())
    }
}

/// Transport overrides scoped to one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CallContext {
    policy: Option<PolicyContext>,
    options: CallOptions,
    cancellation: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: impl Into<PolicyContext>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.options.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// The non-empty call-scoped policy identifier, if any.
    pub fn policy_uuid(&self) -> Option<&str> {
        self.policy.as_ref().and_then(PolicyContext::policy_uuid)
    }

    pub fn options(&self) -> &CallOptions {
        &self.options
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl From<&str> for PolicyContext {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PolicyContext {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
