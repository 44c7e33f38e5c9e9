//! JSON-RPC 2.0 over HTTP(S).
//!
//! Implements [`Endpoint`](super::Endpoint) using `reqwest`, with per-call
//! policy and `User-Agent` headers and optional request rate limiting.

mod client;
mod connection;
mod protocol;

pub use client::{HttpDialer, HttpEndpoint};
