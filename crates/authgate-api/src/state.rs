//! Shared application state for the HTTP layer.

use std::sync::Arc;

use authgate_core::config::AppConfig;
use authgate_upstream::UpstreamClient;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Client for the upstream backend.
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    /// Create application state from configuration and an upstream
    /// client.
    pub fn new(config: Arc<AppConfig>, upstream: Arc<UpstreamClient>) -> Self {
        Self { config, upstream }
    }
}
