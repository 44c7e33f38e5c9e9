//! Shared test helpers for `megafuel-core` unit tests.
//!
//! Consolidates policy fixtures and router/client builders over
//! [`MockEndpoint`] so tests across modules share a single source of truth
//! for dummy endpoints.

use std::sync::Arc;

use uuid::Uuid;

use crate::paymaster::PaymasterClient;
use crate::router::Router;
use crate::rpc::mock::{MockEndpoint, MockEndpointBuilder};

// ==============================================================================
// Policy Fixtures
// ==============================================================================

pub const POLICY_P1: &str = "72191372-5550-4cf6-956e-b70d1e4786cf";
pub const POLICY_P2: &str = "4625f6a9-7260-41ec-a656-4608fdca329b";

pub fn policy_p1() -> Uuid {
    Uuid::parse_str(POLICY_P1).expect("static policy uuid must parse")
}

// ==============================================================================
// Router and Client Builders
// ==============================================================================

/// A router with empty user and sponsor mocks.
pub fn dual_router() -> (Router, Arc<MockEndpoint>, Arc<MockEndpoint>) {
    dual_router_with(|b| b)
}

/// A router whose user mock is configured by `configure_user`, plus an
/// empty sponsor mock.
pub fn dual_router_with(
    configure_user: impl FnOnce(MockEndpointBuilder) -> MockEndpointBuilder,
) -> (Router, Arc<MockEndpoint>, Arc<MockEndpoint>) {
    let user = configure_user(MockEndpoint::builder("mock://user")).build();
    let sponsor = MockEndpoint::builder("mock://sponsor").build();
    let router = Router::from_endpoints(user.clone(), Some(sponsor.clone()), None);
    (router, user, sponsor)
}

/// A paymaster client over the given user and optional sponsor mocks.
pub fn paymaster_over(
    user: &Arc<MockEndpoint>,
    sponsor: Option<&Arc<MockEndpoint>>,
) -> PaymasterClient {
    let sponsor = sponsor.map(|s| Arc::clone(s) as Arc<dyn crate::rpc::Endpoint>);
    PaymasterClient::from_router(Router::from_endpoints(user.clone(), sponsor, None))
}
