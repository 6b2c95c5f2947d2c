//! Session state and storage.

pub mod persist;
pub mod state;
pub mod store;

pub use persist::{FileStateStore, MemoryStateStore, StateStore};
pub use state::{AuthState, TokenSet, UserProfile};
pub use store::SessionStore;
