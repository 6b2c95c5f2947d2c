//! Session guard for pages and endpoints that require a live session.
//!
//! The guard inspects the refresh token only. An expired access token
//! is recoverable through the proxy's refresh path; a missing or
//! expired refresh token is not, so the guard clears both cookies and
//! redirects to the login page in the same response.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use authgate_auth::is_token_expired;

use crate::cookies::{clear_auth_cookies, REFRESH_TOKEN_COOKIE};
use crate::state::AppState;

/// Redirect to login unless the request carries a refresh token that is
/// still comfortably inside its lifetime.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let refresh_token = jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string());
    let guard_buffer = state.config.auth.refresh_guard_buffer_seconds;

    if is_token_expired(refresh_token.as_deref(), guard_buffer) {
        info!(
            path = %request.uri().path(),
            "No usable refresh token, redirecting to login"
        );
        let jar = clear_auth_cookies(jar, &state.config.cookie);
        let redirect = Redirect::to(&state.config.auth.login_redirect);
        return (jar, redirect).into_response();
    }

    next.run(request).await
}
