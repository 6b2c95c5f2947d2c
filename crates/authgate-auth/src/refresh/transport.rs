//! Refresh transport abstraction.

use async_trait::async_trait;

use authgate_core::AppResult;

/// Tokens returned by a successful refresh call.
#[derive(Debug, Clone)]
pub struct RenewedTokens {
    /// The new access token.
    pub access_token: String,
    /// Token type as reported by the upstream.
    pub token_type: Option<String>,
    /// A rotated refresh token, for upstream variants that renew the
    /// whole pair. `None` means the existing refresh token stays valid.
    pub refresh_token: Option<String>,
}

/// Issues the actual refresh call to the upstream identity service.
///
/// Implemented over HTTP by `authgate-upstream`; tests substitute mocks.
/// A non-2xx upstream response is an `Err`, like any transport failure.
#[async_trait]
pub trait RefreshTransport: Send + Sync {
    /// Exchanges a refresh token for renewed credentials.
    async fn refresh(&self, refresh_token: &str) -> AppResult<RenewedTokens>;
}
