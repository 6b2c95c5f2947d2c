//! Token lifecycle configuration.
//!
//! All expiry decisions go through one policy function; the values here
//! are the buffers fed into it. Divergent buffer values are configuration,
//! not separate logic.

use serde::{Deserialize, Serialize};

/// Token expiry buffers and guard behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Buffer in seconds used to decide whether a request must be blocked
    /// on a refresh before it is issued.
    #[serde(default = "default_block_buffer")]
    pub block_buffer_seconds: i64,
    /// Buffer in seconds used to decide whether the access token should be
    /// proactively refreshed before it becomes a problem.
    #[serde(default = "default_proactive_buffer")]
    pub proactive_buffer_seconds: i64,
    /// Buffer in seconds applied to the refresh token itself. An expired
    /// refresh token means the session cannot be recovered.
    #[serde(default = "default_refresh_guard_buffer")]
    pub refresh_guard_buffer_seconds: i64,
    /// Where the session guard redirects unauthenticated requests.
    #[serde(default = "default_login_redirect")]
    pub login_redirect: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            block_buffer_seconds: default_block_buffer(),
            proactive_buffer_seconds: default_proactive_buffer(),
            refresh_guard_buffer_seconds: default_refresh_guard_buffer(),
            login_redirect: default_login_redirect(),
        }
    }
}

fn default_block_buffer() -> i64 {
    60
}

fn default_proactive_buffer() -> i64 {
    300
}

fn default_refresh_guard_buffer() -> i64 {
    60
}

fn default_login_redirect() -> String {
    "/login".to_string()
}
