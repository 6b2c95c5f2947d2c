//! Upstream backend configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the upstream identity-bearing backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the backend API, without a trailing slash.
    pub base_url: String,
    /// Login endpoint path.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Token-pair refresh endpoint path (edge variant, renews both tokens).
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Access-token refresh endpoint path (client variant, access only).
    #[serde(default = "default_refresh_token_path")]
    pub refresh_token_path: String,
    /// Request timeout in seconds for every upstream call, including
    /// refresh. A hung refresh would otherwise block all waiters
    /// indefinitely.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

impl UpstreamConfig {
    /// The base URL with any trailing slash removed.
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn default_login_path() -> String {
    "/v1/auth/login".to_string()
}

fn default_refresh_path() -> String {
    "/v1/auth/refresh".to_string()
}

fn default_refresh_token_path() -> String {
    "/v1/auth/refresh_token".to_string()
}

fn default_timeout() -> u64 {
    30
}
