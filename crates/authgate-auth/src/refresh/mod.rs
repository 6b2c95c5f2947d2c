//! Single-flight token refresh and bounded 401 retry.

pub mod coordinator;
pub mod retry;
pub mod transport;

pub use coordinator::RefreshCoordinator;
pub use retry::{AuthOutcome, with_auth_retry};
pub use transport::{RefreshTransport, RenewedTokens};
