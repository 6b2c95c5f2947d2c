//! # authgate-api
//!
//! The HTTP surface of Authgate: login/logout/session endpoints, the
//! session guard middleware, and the forwarding proxy that substitutes
//! cookie-held tokens for bearer credentials and transparently renews
//! them on a 401.

pub mod cookies;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod proxy;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
