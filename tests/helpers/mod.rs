//! Shared test harness.
//!
//! Spins up a stub upstream backend on a random port and builds the
//! gateway router against it. Requests are driven through the router
//! directly with `tower::ServiceExt::oneshot`; only upstream traffic
//! goes over a real socket.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::Cookie;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use authgate_api::{build_router, AppState};
use authgate_core::config::cookie::CookieConfig;
use authgate_core::config::upstream::UpstreamConfig;
use authgate_core::config::AppConfig;
use authgate_upstream::UpstreamClient;

/// Build an unsigned JWT with the given `exp` claim.
///
/// A process-wide counter goes into `jti` so two tokens minted in the
/// same second never compare equal.
pub fn make_jwt(exp: i64) -> String {
    static SERIAL: AtomicUsize = AtomicUsize::new(0);
    let jti = SERIAL.fetch_add(1, Ordering::SeqCst);
    let header = URL_SAFE_NO_PAD.encode(json!({"alg": "HS256", "typ": "JWT"}).to_string());
    let payload =
        URL_SAFE_NO_PAD.encode(json!({"exp": exp, "sub": "user-1", "jti": jti}).to_string());
    format!("{header}.{payload}.sig")
}

/// A JWT that expired in the past.
pub fn expired_jwt() -> String {
    make_jwt(Utc::now().timestamp() - 3600)
}

/// A JWT valid well past every buffer.
pub fn fresh_jwt() -> String {
    make_jwt(Utc::now().timestamp() + 86_400)
}

/// Observable state of the stub upstream.
pub struct UpstreamState {
    /// Calls to non-auth endpoints.
    pub api_calls: AtomicUsize,
    /// Calls to the token-pair refresh endpoint.
    pub refresh_calls: AtomicUsize,
    /// Calls to the login endpoint.
    pub login_calls: AtomicUsize,
    /// When set, the refresh endpoint rejects every token.
    pub reject_refresh: AtomicBool,
    /// Access tokens the stub currently honors.
    valid_tokens: Mutex<HashSet<String>>,
}

impl UpstreamState {
    fn new() -> Self {
        Self {
            api_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
            reject_refresh: AtomicBool::new(false),
            valid_tokens: Mutex::new(HashSet::new()),
        }
    }

    /// Mint an access token the stub will accept.
    pub fn issue_access_token(&self) -> String {
        let token = fresh_jwt();
        self.valid_tokens.lock().unwrap().insert(token.clone());
        token
    }

    fn accepts(&self, token: &str) -> bool {
        self.valid_tokens.lock().unwrap().contains(token)
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

async fn stub_login(
    State(state): State<Arc<UpstreamState>>,
    Json(body): Json<Value>,
) -> Response {
    state.login_calls.fetch_add(1, Ordering::SeqCst);
    if body.get("password").and_then(Value::as_str) == Some("secret") {
        let access = state.issue_access_token();
        Json(json!({"access_token": access, "refresh_token": "refresh-token-1"})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect email or password"})),
        )
            .into_response()
    }
}

async fn stub_refresh_pair(
    State(state): State<Arc<UpstreamState>>,
    headers: HeaderMap,
) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if state.reject_refresh.load(Ordering::SeqCst) || bearer(&headers).is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid refresh token"})),
        )
            .into_response();
    }
    let access = state.issue_access_token();
    Json(json!({"access_token": access, "refresh_token": "refresh-token-2"})).into_response()
}

async fn stub_refresh_access(
    State(state): State<Arc<UpstreamState>>,
    headers: HeaderMap,
) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if state.reject_refresh.load(Ordering::SeqCst) || bearer(&headers).is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid refresh token"})),
        )
            .into_response();
    }
    let access = state.issue_access_token();
    Json(json!({"access_token": access, "token_type": "bearer"})).into_response()
}

async fn stub_echo(State(state): State<Arc<UpstreamState>>, headers: HeaderMap) -> Response {
    state.api_calls.fetch_add(1, Ordering::SeqCst);
    match bearer(&headers) {
        Some(token) if state.accepts(&token) => Json(json!({
            "authorization": headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok()),
            "x-request-id": headers.get("x-request-id").and_then(|v| v.to_str().ok()),
        }))
        .into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Could not validate credentials"})),
        )
            .into_response(),
    }
}

async fn stub_public(State(state): State<Arc<UpstreamState>>, headers: HeaderMap) -> Response {
    state.api_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "authorization": headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
    }))
    .into_response()
}

async fn start_stub(state: Arc<UpstreamState>) -> String {
    let router = Router::new()
        .route("/v1/auth/login", post(stub_login))
        .route("/v1/auth/refresh", post(stub_refresh_pair))
        .route("/v1/auth/refresh_token", get(stub_refresh_access))
        .route("/v1/echo", any(stub_echo))
        .route("/v1/public", any(stub_public))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A buffered gateway response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Parsed `Set-Cookie` headers.
    pub fn set_cookies(&self) -> Vec<Cookie<'static>> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|s| Cookie::parse(s.to_string()).ok())
            .collect()
    }

    /// The parsed `Set-Cookie` for a given cookie name, if any.
    pub fn set_cookie(&self, name: &str) -> Option<Cookie<'static>> {
        self.set_cookies().into_iter().find(|c| c.name() == name)
    }
}

/// The gateway under test, wired against a stub upstream.
pub struct TestApp {
    pub router: Router,
    pub upstream: Arc<UpstreamState>,
    pub config: Arc<AppConfig>,
}

impl TestApp {
    pub async fn new() -> Self {
        let upstream = Arc::new(UpstreamState::new());
        let base_url = start_stub(Arc::clone(&upstream)).await;
        Self::with_base_url(upstream, base_url)
    }

    /// A gateway pointed at an address nothing listens on.
    pub async fn with_unreachable_upstream() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        Self::with_base_url(Arc::new(UpstreamState::new()), format!("http://{addr}"))
    }

    fn with_base_url(upstream: Arc<UpstreamState>, base_url: String) -> Self {
        let config = Arc::new(AppConfig {
            server: Default::default(),
            upstream: UpstreamConfig {
                base_url,
                login_path: "/v1/auth/login".to_string(),
                refresh_path: "/v1/auth/refresh".to_string(),
                refresh_token_path: "/v1/auth/refresh_token".to_string(),
                request_timeout_seconds: 5,
            },
            auth: Default::default(),
            cookie: CookieConfig {
                secure: false,
                ..Default::default()
            },
            logging: Default::default(),
        });

        let client = Arc::new(UpstreamClient::new(config.upstream.clone()).unwrap());
        let state = AppState::new(Arc::clone(&config), client);
        Self {
            router: build_router(state),
            upstream,
            config,
        }
    }

    /// Drive one request through the gateway router.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        cookies: &[(&str, &str)],
        body: Option<Value>,
    ) -> TestResponse {
        self.request_with_headers(method, uri, cookies, &[], body)
            .await
    }

    /// Like [`request`](Self::request), with extra request headers.
    pub async fn request_with_headers(
        &self,
        method: &str,
        uri: &str,
        cookies: &[(&str, &str)],
        extra_headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }
        if !cookies.is_empty() {
            let header_value = cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, header_value);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(axum::body::Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
