//! Per-call endpoint selection and dispatch.
//!
//! A [`Router`] owns the user endpoint and, optionally, a sponsor endpoint.
//! Every call is routed independently:
//!
//! | call policy | sponsor endpoint | construction policy | endpoint | policy header |
//! |-------------|------------------|---------------------|----------|---------------|
//! | set         | present          | any                 | sponsor  | call policy   |
//! | set         | absent           | set                 | user     | call policy   |
//! | unset       | any              | set                 | user     | construction  |
//! | otherwise   |                  |                     | user     | none          |
//!
//! Sponsor-only operations bypass the table: they always go to the sponsor
//! endpoint with the policy from their request body, and fail with
//! `NoSponsorEndpoint` when none was configured.

use std::fmt;
use std::future::pending;
use std::sync::Arc;

use tracing::debug;

use crate::context::CallContext;
use crate::error::ClientError;
use crate::rpc::{CallHeaders, Dialer, Endpoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointRole {
    User,
    Sponsor,
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Sponsor => write!(f, "sponsor"),
        }
    }
}

/// The outcome of routing one call: which endpoint, and with which headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub role: EndpointRole,
    pub headers: CallHeaders,
}

pub struct Router {
    user: Arc<dyn Endpoint>,
    sponsor: Option<Arc<dyn Endpoint>>,
    construction_policy: Option<String>,
}

impl Router {
    /// Dial the user endpoint and, if given, the sponsor endpoint.
    ///
    /// If the sponsor dial fails, the user endpoint is closed before the
    /// error is returned.
    pub async fn connect(
        dialer: &dyn Dialer,
        user_target: &str,
        sponsor_target: Option<&str>,
        construction_policy: Option<String>,
    ) -> Result<Self, ClientError> {
        let user = dialer.dial(user_target).await?;

        let sponsor = match sponsor_target {
            None => None,
            Some(target) => match dialer.dial(target).await {
                Ok(endpoint) => Some(endpoint),
                Err(err) => {
                    debug!(error = %err, "sponsor dial failed; closing user endpoint");
                    user.close();
                    return Err(err);
                }
            },
        };

        Ok(Self::from_endpoints(user, sponsor, construction_policy))
    }

    pub fn from_endpoints(
        user: Arc<dyn Endpoint>,
        sponsor: Option<Arc<dyn Endpoint>>,
        construction_policy: Option<String>,
    ) -> Self {
        let construction_policy = construction_policy
            .map(|p| p.trim().to_owned())
            .filter(|p| !p.is_empty());
        Self {
            user,
            sponsor,
            construction_policy,
        }
    }

    pub fn has_sponsor(&self) -> bool {
        self.sponsor.is_some()
    }

    pub fn construction_policy(&self) -> Option<&str> {
        self.construction_policy.as_deref()
    }

    /// Route a base operation.
    pub fn select(&self, ctx: &CallContext) -> Selection {
        let user_agent = ctx.options().user_agent.clone();
        let (role, policy_uuid) = match (ctx.policy_uuid(), &self.sponsor, &self.construction_policy) {
            (Some(policy), Some(_), _) => (EndpointRole::Sponsor, Some(policy.to_owned())),
            (Some(policy), None, Some(_)) => (EndpointRole::User, Some(policy.to_owned())),
            (None, _, Some(fixed)) => (EndpointRole::User, Some(fixed.clone())),
            _ => (EndpointRole::User, None),
        };
        Selection {
            role,
            headers: CallHeaders {
                policy_uuid,
                user_agent,
            },
        }
    }

    /// Route a sponsor-only operation scoped to `policy_uuid`.
    pub fn select_sponsor(
        &self,
        ctx: &CallContext,
        policy_uuid: &str,
    ) -> Result<Selection, ClientError> {
        if self.sponsor.is_none() {
            return Err(ClientError::NoSponsorEndpoint);
        }
        Ok(Selection {
            role: EndpointRole::Sponsor,
            headers: CallHeaders {
                policy_uuid: Some(policy_uuid.to_owned()),
                user_agent: ctx.options().user_agent.clone(),
            },
        })
    }

    pub async fn call(
        &self,
        ctx: &CallContext,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, ClientError> {
        let selection = self.select(ctx);
        self.dispatch(ctx, selection, method, params).await
    }

    pub async fn call_sponsor(
        &self,
        ctx: &CallContext,
        policy_uuid: &str,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, ClientError> {
        let selection = self.select_sponsor(ctx, policy_uuid)?;
        self.dispatch(ctx, selection, method, params).await
    }

    /// Close every endpoint this router owns.
    pub fn close(&self) {
        self.user.close();
        if let Some(sponsor) = &self.sponsor {
            sponsor.close();
        }
    }

    fn endpoint(&self, role: EndpointRole) -> Result<&Arc<dyn Endpoint>, ClientError> {
        match role {
            EndpointRole::User => Ok(&self.user),
            EndpointRole::Sponsor => self.sponsor.as_ref().ok_or(ClientError::NoSponsorEndpoint),
        }
    }

    async fn dispatch(
        &self,
        ctx: &CallContext,
        selection: Selection,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, ClientError> {
        let endpoint = self.endpoint(selection.role)?;
        debug!(
            rpc.method = method,
            rpc.endpoint = %selection.role,
            rpc.policy = selection.headers.policy_uuid.as_deref().unwrap_or(""),
            "dispatching rpc"
        );

        let cancelled = async {
            match ctx.cancellation() {
                Some(token) => token.cancelled().await,
                None => pending::<()>().await,
            }
        };
        let deadline = async {
            match ctx.deadline() {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        // Dropping the call future abandons the in-flight request.
        tokio::select! {
            biased;
            _ = cancelled => Err(ClientError::Cancelled),
            _ = deadline => Err(ClientError::DeadlineExceeded),
            result = endpoint.call(method, params, &selection.headers) => result,
        }
    }
}

impl Drop for Router {
    fn drop(&mut self) {
        self.close();
    }
}
