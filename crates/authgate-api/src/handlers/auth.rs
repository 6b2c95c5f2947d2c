//! Login, logout, and session inspection endpoints.

use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use authgate_auth::is_token_expired;
use authgate_upstream::LoginRequest;

use crate::cookies::{clear_auth_cookies, set_auth_cookies, ACCESS_TOKEN_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;

/// Credentials posted by the login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Authenticate against the upstream and install both auth cookies.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<LoginForm>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let pair = state
        .upstream
        .login(&LoginRequest {
            email: form.email.clone(),
            password: form.password,
            remember_me: form.remember_me,
        })
        .await?;

    info!(email = %form.email, "Login succeeded");
    let jar = set_auth_cookies(jar, &pair.access_token, &pair.refresh_token, &state.config.cookie);
    Ok((jar, Json(json!({ "message": "Logged in" }))))
}

/// Clear the cookie session. Always succeeds; there is no upstream
/// logout call to fail.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = clear_auth_cookies(jar, &state.config.cookie);
    (jar, Json(json!({ "message": "Logged out" })))
}

/// Describe the current cookie session. Sits behind the session guard,
/// so a missing or expired refresh token never reaches this handler.
pub async fn session(State(state): State<AppState>, jar: CookieJar) -> Json<Value> {
    let access = jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string());
    let auth = &state.config.auth;

    let expired = is_token_expired(access.as_deref(), auth.block_buffer_seconds);
    let expiring_soon = is_token_expired(access.as_deref(), auth.proactive_buffer_seconds);

    Json(json!({
        "authenticated": true,
        "access_token_expired": expired,
        "access_token_expiring_soon": expiring_soon,
    }))
}
