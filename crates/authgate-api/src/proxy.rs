//! The forwarding proxy.
//!
//! Client requests arrive carrying auth cookies. The proxy strips
//! hop-by-hop headers, substitutes the cookie-held access token for a
//! bearer credential, and forwards the request to the backend. A 401 on
//! an authenticated request triggers one token-pair refresh and one
//! retry; a refresh the upstream rejects tears the cookie session down.

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::header::{
    ACCEPT_ENCODING, CONNECTION, CONTENT_ENCODING, CONTENT_LENGTH, HOST, PROXY_AUTHORIZATION,
    TRANSFER_ENCODING,
};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use authgate_core::{AppError, AppResult};
use authgate_upstream::{ForwardRequest, ForwardedResponse};

use crate::cookies::{
    clear_auth_cookies, set_auth_cookies, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
use crate::error::ApiError;
use crate::state::AppState;

/// Request headers never forwarded upstream. `authorization` is not
/// listed because the upstream client owns it outright.
const STRIPPED_REQUEST_HEADERS: [HeaderName; 7] = [
    HOST,
    CONTENT_LENGTH,
    CONNECTION,
    HeaderName::from_static("keep-alive"),
    PROXY_AUTHORIZATION,
    TRANSFER_ENCODING,
    ACCEPT_ENCODING,
];

fn sanitize_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut sanitized = headers.clone();
    for name in &STRIPPED_REQUEST_HEADERS {
        sanitized.remove(name);
    }
    sanitized
}

/// Convert a buffered upstream response into a client response.
///
/// The body was already buffered and decompressed by the HTTP client,
/// so the upstream's framing headers no longer describe it.
fn proxy_response(upstream: ForwardedResponse) -> Response {
    let mut builder = Response::builder().status(upstream.status);
    for (name, value) in &upstream.headers {
        if name == &CONTENT_ENCODING || name == &CONTENT_LENGTH {
            continue;
        }
        builder = builder.header(name, value);
    }
    builder
        .body(Body::from(upstream.body))
        .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
}

/// Forward a request to the backend, refreshing the token pair and
/// retrying once on a 401.
pub async fn forward(
    State(state): State<AppState>,
    Path(path): Path<String>,
    jar: CookieJar,
    request: Request,
) -> Result<(CookieJar, Response), ApiError> {
    let method = request.method().clone();
    let headers = sanitize_request_headers(request.headers());
    let path_and_query = match request.uri().query() {
        Some(query) => format!("/{path}?{query}"),
        None => format!("/{path}"),
    };

    let body = axum::body::to_bytes(
        request.into_body(),
        state.config.server.max_body_bytes,
    )
    .await
    .map_err(|e| AppError::with_source(
        authgate_core::error::ErrorKind::Validation,
        "Request body too large or unreadable",
        e,
    ))?;

    let access_token = jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string());
    let had_token = access_token.is_some();

    let mut upstream_request = ForwardRequest {
        method,
        path_and_query,
        headers,
        body,
        bearer_token: access_token,
    };

    let response = send(&state, &upstream_request).await?;

    if !response.is_unauthorized() || !had_token {
        // Nothing to refresh: either the request succeeded, or it was
        // anonymous and a 401 is the honest answer.
        return Ok((jar, proxy_response(response)));
    }

    let Some(refresh_token) = jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string())
    else {
        info!("Access token rejected and no refresh token present, clearing session");
        let jar = clear_auth_cookies(jar, &state.config.cookie);
        return Ok((jar, proxy_response(response)));
    };

    info!("Access token rejected, refreshing token pair");
    let pair = match state.upstream.refresh_token_pair(&refresh_token).await {
        Ok(pair) => pair,
        Err(err) if err.is_unauthorized() => {
            // The refresh token itself is no longer honored. Tear down
            // the cookie session and hand back the original 401.
            warn!("Refresh token rejected by upstream, clearing session");
            let jar = clear_auth_cookies(jar, &state.config.cookie);
            return Ok((jar, proxy_response(response)));
        }
        // Transport failure during refresh is a gateway error, not a
        // credential problem. Cookies stay untouched.
        Err(err) => return Err(err.into()),
    };

    let jar = set_auth_cookies(jar, &pair.access_token, &pair.refresh_token, &state.config.cookie);
    upstream_request.bearer_token = Some(pair.access_token);

    // One retry with the renewed token, its outcome returned verbatim.
    let retried = send(&state, &upstream_request).await?;
    Ok((jar, proxy_response(retried)))
}

async fn send(state: &AppState, request: &ForwardRequest) -> AppResult<ForwardedResponse> {
    state.upstream.forward(request).await.map_err(|err| {
        warn!(
            method = %request.method,
            url = %state.upstream.target_url(&request.path_and_query),
            error = %err,
            "Upstream request failed"
        );
        err
    })
}
