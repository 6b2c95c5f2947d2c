//! # authgate-auth
//!
//! Bearer-token lifecycle for Authgate: claim decoding, expiry policy,
//! session state with pluggable persistence, single-flight refresh
//! coordination, and the bounded 401 retry wrapper.
//!
//! This crate performs no HTTP itself. The refresh network call is
//! abstracted behind [`refresh::RefreshTransport`] so the same
//! coordinator serves both the edge server and embedded clients.

pub mod refresh;
pub mod session;
pub mod token;

pub use refresh::{RefreshCoordinator, RefreshTransport, RenewedTokens, with_auth_retry};
pub use session::{AuthState, SessionStore, TokenSet, UserProfile};
pub use token::{DecodedClaims, decode, is_token_expired};
