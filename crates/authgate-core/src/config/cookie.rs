//! Auth cookie configuration.

use serde::{Deserialize, Serialize};

/// Settings for the `access_token` / `refresh_token` cookie pair.
///
/// The two cookies are always set together and cleared together, never
/// independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Max-Age of the access token cookie in seconds.
    #[serde(default = "default_access_max_age")]
    pub access_max_age_seconds: i64,
    /// Max-Age of the refresh token cookie in seconds.
    #[serde(default = "default_refresh_max_age")]
    pub refresh_max_age_seconds: i64,
    /// Whether the `Secure` attribute is set. Disable for local
    /// development over plain HTTP only.
    #[serde(default = "default_secure")]
    pub secure: bool,
    /// Optional cookie domain.
    #[serde(default)]
    pub domain: Option<String>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_max_age_seconds: default_access_max_age(),
            refresh_max_age_seconds: default_refresh_max_age(),
            secure: default_secure(),
            domain: None,
        }
    }
}

fn default_access_max_age() -> i64 {
    // 10 minutes
    60 * 10
}

fn default_refresh_max_age() -> i64 {
    // 7 days
    60 * 60 * 24 * 7
}

fn default_secure() -> bool {
    true
}
