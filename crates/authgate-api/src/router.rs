//! Route table and middleware assembly.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{any, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, health};
use crate::middleware::guard::require_session;
use crate::middleware::logging::request_logging;
use crate::proxy;
use crate::state::AppState;

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let guarded = Router::new()
        .route("/auth/session", get(auth::session))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .merge(guarded)
        .route("/api/proxy/{*path}", any(proxy::forward))
        .route("/health", get(health::health))
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes))
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
