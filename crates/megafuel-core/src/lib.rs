//! Client for MegaFuel paymaster and sponsor JSON-RPC endpoints.
//!
//! [`PaymasterClient`] covers the public paymaster API; [`SponsorClient`]
//! adds policy whitelist and spend-data management on top of it. Both route
//! each call through a [`Router`](router::Router) that picks the user or
//! sponsor endpoint and the policy header for that call alone.

pub mod amount;
pub mod config;
pub mod context;
pub mod error;
pub mod paymaster;
pub mod router;
pub mod rpc;
pub mod sponsor;
#[cfg(test)]
mod test_util;
pub mod types;

pub use amount::BigAmount;
pub use config::{ClientConfig, TransportOptions};
pub use context::{CallContext, CallOptions, PolicyContext};
pub use error::{ClientError, RpcError};
pub use paymaster::PaymasterClient;
pub use sponsor::SponsorClient;
