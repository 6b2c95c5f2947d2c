//! Process-wide session store.
//!
//! One `SessionStore` serves any deployment context; only the
//! [`StateStore`] substrate differs. Updates are atomic replacements
//! (or the documented access-token-only narrow update), so readers
//! never observe a partially written state.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use super::persist::{MemoryStateStore, StateStore};
use super::state::{AuthState, TokenSet, UserProfile};
use crate::token::expiry::is_token_expired;

/// Holds the current session state and writes it through to the
/// injected substrate on every mutation.
pub struct SessionStore {
    state: RwLock<AuthState>,
    persist: Arc<dyn StateStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionStore {
    /// Creates a store backed by the given substrate, reading any
    /// previously persisted state synchronously.
    ///
    /// Unreadable persisted state is discarded fail-closed: the session
    /// starts logged out and the substrate is cleared.
    pub fn new(persist: Arc<dyn StateStore>) -> Self {
        let state = match persist.load() {
            Ok(Some(state)) => {
                debug!(
                    authenticated = state.authenticated,
                    "Restored persisted session state"
                );
                state
            }
            Ok(None) => AuthState::default(),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session state");
                if let Err(e) = persist.clear() {
                    warn!(error = %e, "Failed to clear corrupt session state");
                }
                AuthState::default()
            }
        };

        Self {
            state: RwLock::new(state),
            persist,
        }
    }

    /// Creates a store with no persistence.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStateStore::new()))
    }

    /// Installs a fresh session after login. Replaces the entire state.
    pub fn login(&self, tokens: TokenSet, user: UserProfile) {
        self.mutate(|state| {
            *state = AuthState {
                user: Some(user),
                tokens: Some(tokens),
                authenticated: true,
            };
        });
    }

    /// Replaces the whole token pair, keeping user and authenticated
    /// flag. Used when the upstream rotates both tokens.
    pub fn replace_tokens(&self, tokens: TokenSet) {
        self.mutate(|state| {
            state.tokens = Some(tokens);
        });
    }

    /// Narrow update for the refresh variant that renews the access
    /// token only. The refresh token and user are left untouched.
    pub fn update_access_token(&self, access_token: &str, token_type: &str) {
        self.mutate(|state| match &mut state.tokens {
            Some(tokens) => {
                tokens.access_token = access_token.to_string();
                tokens.token_type = token_type.to_string();
                tokens.expires_at = None;
            }
            None => {
                state.tokens = Some(TokenSet {
                    access_token: access_token.to_string(),
                    refresh_token: None,
                    token_type: token_type.to_string(),
                    expires_at: None,
                });
            }
        });
    }

    /// Tears the session down: logged out, no tokens, substrate cleared.
    pub fn clear(&self) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = AuthState::default();
        }
        if let Err(e) = self.persist.clear() {
            warn!(error = %e, "Failed to clear persisted session state");
        }
    }

    /// Whether the session considers itself logged in.
    pub fn is_authenticated(&self) -> bool {
        self.read(|state| state.authenticated)
    }

    /// The current access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.read(|state| state.tokens.as_ref().map(|t| t.access_token.clone()))
    }

    /// The current refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.read(|state| state.tokens.as_ref().and_then(|t| t.refresh_token.clone()))
    }

    /// The authenticated user, if any.
    pub fn user(&self) -> Option<UserProfile> {
        self.read(|state| state.user.clone())
    }

    /// Whether the access token is expired, or will be within
    /// `buffer_seconds`. Fails closed when no token is held.
    pub fn is_access_token_expired(&self, buffer_seconds: i64) -> bool {
        let token = self.access_token();
        is_token_expired(token.as_deref(), buffer_seconds)
    }

    /// Whether the refresh token is expired, or will be within
    /// `buffer_seconds`. Fails closed when no token is held.
    pub fn is_refresh_token_expired(&self, buffer_seconds: i64) -> bool {
        let token = self.refresh_token();
        is_token_expired(token.as_deref(), buffer_seconds)
    }

    fn read<T>(&self, f: impl FnOnce(&AuthState) -> T) -> T {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn mutate(&self, f: impl FnOnce(&mut AuthState)) {
        let snapshot = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut state);
            state.clone()
        };
        if let Err(e) = self.persist.save(&snapshot) {
            warn!(error = %e, "Failed to persist session state");
        }
    }
}
