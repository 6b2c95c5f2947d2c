//! Bounded retry for authenticated requests.
//!
//! A stale access token shows up as a 401 on an otherwise fine request.
//! The wrapper refreshes once and re-issues once; a second 401 is
//! returned as-is so a backend that keeps rejecting a credential can
//! never cause a retry storm.

use std::future::Future;

use tracing::debug;

use authgate_core::AppResult;

use super::coordinator::RefreshCoordinator;

/// An outcome that can signal a 401-class authentication failure.
pub trait AuthOutcome {
    /// Whether this outcome is a 401-class failure worth a refresh.
    fn is_unauthorized(&self) -> bool;
}

impl<T> AuthOutcome for AppResult<T> {
    fn is_unauthorized(&self) -> bool {
        matches!(self, Err(e) if e.is_unauthorized())
    }
}

/// Issues a request, and on a 401-class outcome refreshes the token and
/// re-issues it exactly once.
///
/// The retried outcome is returned verbatim, even if it is itself a
/// 401. When the refresh fails, the original failing outcome is
/// returned unchanged.
pub async fn with_auth_retry<T, F, Fut>(coordinator: &RefreshCoordinator, issue_request: F) -> T
where
    T: AuthOutcome,
    F: Fn() -> Fut,
    Fut: Future<Output = T>,
{
    let outcome = issue_request().await;
    if !outcome.is_unauthorized() {
        return outcome;
    }

    debug!("Request rejected with 401, attempting token refresh");
    if !coordinator.refresh().await {
        return outcome;
    }

    // One retry, never a loop.
    issue_request().await
}
