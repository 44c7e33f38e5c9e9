use std::time::Duration;

/// Transport-level settings applied to every endpoint a client dials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    /// Default `User-Agent`; a per-call value in `CallOptions` takes precedence.
    pub user_agent: Option<String>,
    /// Outbound request rate limit per endpoint. `None` disables limiting.
    pub requests_per_second: Option<u32>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            user_agent: None,
            requests_per_second: None,
        }
    }
}

/// Construction surface for paymaster and sponsor clients.
///
/// - `user_url`: the public paymaster endpoint, e.g.
///   `https://bsc-megafuel.nodereal.io/`.
/// - `sponsor_url`: the policy-scoped endpoint, e.g.
///   `https://open-platform.nodereal.io/{apikey}/megafuel`.
/// - `private_policy`: fixes a policy UUID at construction time ("private
///   paymaster" mode). A policy supplied on an individual call overrides it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub user_url: String,
    pub sponsor_url: Option<String>,
    pub private_policy: Option<String>,
    pub transport: TransportOptions,
}

impl ClientConfig {
    pub fn new(user_url: impl Into<String>) -> Self {
        Self {
            user_url: user_url.into(),
            ..Self::default()
        }
    }

    pub fn with_sponsor_url(mut self, url: impl Into<String>) -> Self {
        self.sponsor_url = Some(url.into());
        self
    }

    pub fn with_private_policy(mut self, policy_uuid: impl Into<String>) -> Self {
        self.private_policy = Some(policy_uuid.into());
        self
    }

    pub fn with_transport(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }
}
