//! Time-buffer expiry policy.
//!
//! Every expiry decision in the application goes through
//! [`is_token_expired`]. Call sites differ only in the buffer they pass
//! (blocking check vs proactive refresh vs refresh-token guard); the
//! buffer values live in configuration, not in separate logic.

use chrono::{DateTime, Utc};

use super::claims;

/// Returns whether `token` is expired, or will be within
/// `buffer_seconds`.
///
/// Fails closed: a missing token, an undecodable token, or a token
/// without an `exp` claim all read as expired.
pub fn is_token_expired(token: Option<&str>, buffer_seconds: i64) -> bool {
    is_token_expired_at(token, buffer_seconds, Utc::now())
}

/// [`is_token_expired`] against an explicit clock.
///
/// The decision is deterministic given the clock and the buffer; results
/// are never cached since the authoritative clock keeps advancing.
pub fn is_token_expired_at(token: Option<&str>, buffer_seconds: i64, now: DateTime<Utc>) -> bool {
    let Some(token) = token else {
        return true;
    };
    let Some(claims) = claims::decode(token) else {
        return true;
    };
    let Some(exp) = claims.exp else {
        return true;
    };

    now.timestamp() >= exp - buffer_seconds
}
