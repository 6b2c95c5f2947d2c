//! # authgate-upstream
//!
//! Typed reqwest client for the upstream backend: login, both refresh
//! variants, and generic request forwarding for the proxy.
//!
//! Transport-level failures map to [`authgate_core::error::ErrorKind::Upstream`]
//! (a gateway failure), upstream 401s to `Authentication`; the two are
//! never conflated.

pub mod client;
pub mod types;

pub use client::UpstreamClient;
pub use types::{
    AccessTokenGrant, ForwardRequest, ForwardedResponse, LoginRequest, TokenPair,
};
