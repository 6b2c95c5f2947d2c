//! Reqwest-backed client for the upstream backend.

use std::time::Duration;

use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::HeaderValue;
use reqwest::redirect::Policy;
use tracing::{debug, warn};

use authgate_auth::{RefreshTransport, RenewedTokens};
use authgate_core::config::upstream::UpstreamConfig;
use authgate_core::error::ErrorKind;
use authgate_core::{AppError, AppResult};

use crate::types::{
    AccessTokenGrant, ForwardRequest, ForwardedResponse, LoginRequest, TokenPair,
};

/// HTTP client for the upstream backend.
///
/// Wraps a shared [`reqwest::Client`] configured with the upstream
/// request timeout. Redirects are not followed; the proxy relays them
/// to the browser untouched.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    /// Build a client from upstream configuration.
    pub fn new(config: UpstreamConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .redirect(Policy::none())
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.trimmed_base_url(), path)
    }

    /// Full backend URL for a forwarded path-and-query. Exposed for
    /// request logging in the proxy layer.
    pub fn target_url(&self, path_and_query: &str) -> String {
        self.url(path_and_query)
    }

    /// Authenticate with email and password.
    ///
    /// A 401 from the backend maps to an authentication error, any
    /// other non-success status to an upstream error.
    pub async fn login(&self, request: &LoginRequest) -> AppResult<TokenPair> {
        let response = self
            .http
            .post(self.url(&self.config.login_path))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Upstream, format!("Upstream unreachable: {e}"), e)
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppError::authentication("Invalid credentials"));
        }
        if !status.is_success() {
            return Err(AppError::upstream(format!(
                "Login failed with upstream status {status}"
            )));
        }

        response.json::<TokenPair>().await.map_err(|e| {
            AppError::with_source(ErrorKind::Upstream, "Malformed login response", e)
        })
    }

    /// Exchange a refresh token for a new access/refresh token pair.
    ///
    /// Any non-success status means the refresh token was not honored
    /// and maps to an authentication error so callers tear the session
    /// down. Transport failures stay upstream errors and must not.
    pub async fn refresh_token_pair(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let response = self
            .http
            .post(self.url(&self.config.refresh_path))
            .bearer_auth(refresh_token)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Upstream, format!("Upstream unreachable: {e}"), e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Upstream rejected refresh token");
            return Err(AppError::authentication("Refresh token rejected"));
        }

        response.json::<TokenPair>().await.map_err(|e| {
            AppError::with_source(ErrorKind::Upstream, "Malformed refresh response", e)
        })
    }

    /// Exchange a refresh token for a new access token only.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> AppResult<AccessTokenGrant> {
        let response = self
            .http
            .get(self.url(&self.config.refresh_token_path))
            .bearer_auth(refresh_token)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Upstream, format!("Upstream unreachable: {e}"), e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Upstream rejected refresh token");
            return Err(AppError::authentication("Refresh token rejected"));
        }

        response.json::<AccessTokenGrant>().await.map_err(|e| {
            AppError::with_source(ErrorKind::Upstream, "Malformed refresh response", e)
        })
    }

    /// Forward a sanitized request to the backend and buffer the
    /// response.
    ///
    /// The `authorization` header is fully owned by this method: it is
    /// set from `bearer_token` or removed, never passed through from
    /// the caller's headers.
    pub async fn forward(&self, request: &ForwardRequest) -> AppResult<ForwardedResponse> {
        let mut headers = request.headers.clone();
        match &request.bearer_token {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Validation, "Invalid bearer token", e)
                    })?;
                headers.insert(AUTHORIZATION, value);
            }
            None => {
                headers.remove(AUTHORIZATION);
            }
        }

        let url = self.url(&request.path_and_query);
        debug!(method = %request.method, url = %url, "Forwarding request upstream");

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .headers(headers);
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            AppError::with_source(ErrorKind::Upstream, format!("Upstream unreachable: {e}"), e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| {
            AppError::with_source(ErrorKind::Upstream, "Failed to read upstream response", e)
        })?;

        Ok(ForwardedResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl RefreshTransport for UpstreamClient {
    async fn refresh(&self, refresh_token: &str) -> AppResult<RenewedTokens> {
        let grant = self.refresh_access_token(refresh_token).await?;
        Ok(RenewedTokens {
            access_token: grant.access_token,
            token_type: Some(grant.token_type),
            refresh_token: None,
        })
    }
}
