//! Best-effort JWT payload decoding.
//!
//! Signature validation is deliberately out of scope: the upstream
//! identity service is the only party that verifies tokens. This codec
//! only extracts lifecycle claims, and it fails closed — any malformed
//! input decodes to `None`, never to a panic or an error.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

/// Lifecycle claims extracted from a bearer token payload.
///
/// Derived data only; never persisted. Recomputed from the raw token
/// string on demand.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecodedClaims {
    /// Expiry as unix seconds, if the token carries one.
    pub exp: Option<i64>,
    /// Issued-at as unix seconds.
    pub iat: Option<i64>,
    /// Subject identifier.
    pub sub: Option<String>,
}

/// Decodes the payload segment of a JWT-shaped token without verifying
/// its signature.
///
/// Returns `None` on wrong segment count, invalid base64url, or invalid
/// JSON. Side-effect free.
pub fn decode(token: &str) -> Option<DecodedClaims> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_header), Some(payload), Some(_signature), None) => payload,
        _ => return None,
    };

    if payload.is_empty() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}
