//! Session state model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The token pair held for an authenticated session.
///
/// Replaced atomically on login; on refresh either the access token
/// alone is updated or the whole pair is replaced, depending on which
/// refresh variant the upstream served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Short-lived bearer credential for API calls.
    pub access_token: String,
    /// Long-lived credential used solely to obtain a new access token.
    /// Absent in deployments where the refresh token never leaves the
    /// cookie jar.
    pub refresh_token: Option<String>,
    /// Token type as reported by the upstream, normally `"bearer"`.
    pub token_type: String,
    /// Expiry as reported by the upstream, when it reports one. The
    /// authoritative expiry check decodes the token itself.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Profile of the authenticated user, as returned by the upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Upstream user identifier.
    pub id: String,
    /// Account email.
    pub email: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
}

/// Complete session state, persisted wholesale on every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    /// The authenticated user, if any.
    pub user: Option<UserProfile>,
    /// The held token pair, if any.
    pub tokens: Option<TokenSet>,
    /// Whether the session considers itself logged in.
    pub authenticated: bool,
}
