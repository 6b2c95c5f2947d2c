//! Wire types for the upstream auth endpoints and proxy forwarding.

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use serde::{Deserialize, Serialize};

/// Credentials sent to `POST /v1/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password, forwarded verbatim to the identity service.
    pub password: String,
    /// Whether the upstream should issue a long-lived session.
    pub remember_me: bool,
}

/// Token pair returned by login and by the pair-renewing refresh
/// endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
}

/// Response of the access-only refresh endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenGrant {
    /// The renewed access token.
    pub access_token: String,
    /// Token type, normally `"bearer"`.
    pub token_type: String,
}

/// A request to forward to the backend on a client's behalf.
///
/// Headers are expected to be sanitized by the caller; the client only
/// manages the `authorization` header, from `bearer_token`.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    /// HTTP method of the original request.
    pub method: Method,
    /// Path and query to append to the backend base URL, with a leading
    /// slash.
    pub path_and_query: String,
    /// Sanitized request headers.
    pub headers: HeaderMap,
    /// Buffered request body.
    pub body: Bytes,
    /// Access token to attach as a bearer credential. `None` forwards
    /// the request unauthenticated.
    pub bearer_token: Option<String>,
}

/// A buffered backend response, before header sanitization.
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    /// Response status.
    pub status: StatusCode,
    /// Response headers as received.
    pub headers: HeaderMap,
    /// Buffered response body.
    pub body: Bytes,
}

impl ForwardedResponse {
    /// Whether the backend rejected the attached credential.
    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }
}
