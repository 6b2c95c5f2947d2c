//! Single-flight refresh coordination.
//!
//! At most one refresh call may be outstanding at any instant, no
//! matter how many concurrent callers discover an expired token. The
//! first caller becomes the leader and performs the call; everyone
//! arriving while it runs attaches to a watch channel and observes the
//! same outcome.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use authgate_core::config::auth::AuthConfig;

use super::transport::RefreshTransport;
use crate::session::SessionStore;

/// Refresh lifecycle state, process-wide.
enum RefreshState {
    /// No refresh in progress.
    Idle,
    /// Exactly one refresh call outstanding. New callers subscribe to
    /// the receiver instead of issuing a second call.
    Refreshing(watch::Receiver<Option<bool>>),
}

enum Role {
    Leader(watch::Sender<Option<bool>>),
    Waiter(watch::Receiver<Option<bool>>),
}

/// Coordinates token refresh for one session.
///
/// Owns no ambient global state: the session store, the transport, and
/// the buffer configuration are all injected, so independent sessions
/// (multi-tenant processes, tests) cannot cross-talk.
pub struct RefreshCoordinator {
    session: Arc<SessionStore>,
    transport: Arc<dyn RefreshTransport>,
    config: AuthConfig,
    state: Mutex<RefreshState>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .finish()
    }
}

impl RefreshCoordinator {
    /// Creates a coordinator over the given session and transport.
    pub fn new(
        session: Arc<SessionStore>,
        transport: Arc<dyn RefreshTransport>,
        config: AuthConfig,
    ) -> Self {
        Self {
            session,
            transport,
            config,
            state: Mutex::new(RefreshState::Idle),
        }
    }

    /// The session store this coordinator updates.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Whether a refresh call is currently outstanding.
    pub fn is_refreshing(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(*state, RefreshState::Refreshing(_))
    }

    /// Refreshes the access token, returning whether the session now
    /// holds renewed credentials.
    ///
    /// If a refresh is already in flight, the caller awaits its outcome
    /// instead of starting another. On failure the session state is left
    /// untouched; deciding whether to tear the session down belongs to
    /// the caller.
    pub async fn refresh(&self) -> bool {
        // The check-and-transition must not cross a suspension point,
        // or two callers could both observe Idle. A synchronous mutex
        // makes it one atomic unit.
        let role = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match &*state {
                RefreshState::Refreshing(rx) => Role::Waiter(rx.clone()),
                RefreshState::Idle => {
                    let (tx, rx) = watch::channel(None);
                    *state = RefreshState::Refreshing(rx);
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Waiter(mut rx) => {
                debug!("Refresh already in flight, awaiting its outcome");
                loop {
                    if let Some(outcome) = *rx.borrow_and_update() {
                        return outcome;
                    }
                    // A dropped sender means the leader never published
                    // an outcome; read that as failure.
                    if rx.changed().await.is_err() {
                        return false;
                    }
                }
            }
            Role::Leader(tx) => {
                let reset = IdleOnDrop { state: &self.state };
                let outcome = self.perform_refresh().await;
                // Back to Idle before waking waiters, so a waiter that
                // immediately retries starts a fresh refresh.
                drop(reset);
                let _ = tx.send(Some(outcome));
                outcome
            }
        }
    }

    /// Proactive validity check to run before issuing a request.
    ///
    /// Fails fast without touching the network when the session is not
    /// authenticated or the refresh token itself is expired. Refreshes
    /// only when the access token is inside the proactive buffer, and
    /// returns `true` immediately while it is comfortably valid.
    pub async fn ensure_valid_token(&self) -> bool {
        if !self.session.is_authenticated() {
            debug!("Session not authenticated, nothing to ensure");
            return false;
        }

        if self
            .session
            .is_refresh_token_expired(self.config.refresh_guard_buffer_seconds)
        {
            debug!("Refresh token expired, session cannot be recovered");
            return false;
        }

        if self
            .session
            .is_access_token_expired(self.config.proactive_buffer_seconds)
        {
            debug!(
                buffer_seconds = self.config.proactive_buffer_seconds,
                "Access token expiring soon, refreshing proactively"
            );
            return self.refresh().await;
        }

        true
    }

    async fn perform_refresh(&self) -> bool {
        let Some(refresh_token) = self.session.refresh_token() else {
            warn!("No refresh token held, cannot refresh");
            return false;
        };

        match self.transport.refresh(&refresh_token).await {
            Ok(renewed) => {
                let token_type = renewed.token_type.as_deref().unwrap_or("bearer");
                match renewed.refresh_token {
                    Some(new_refresh) => {
                        self.session.replace_tokens(crate::session::TokenSet {
                            access_token: renewed.access_token,
                            refresh_token: Some(new_refresh),
                            token_type: token_type.to_string(),
                            expires_at: None,
                        });
                    }
                    None => {
                        self.session
                            .update_access_token(&renewed.access_token, token_type);
                    }
                }
                info!("Access token refreshed");
                true
            }
            Err(e) => {
                // Session teardown on terminal failure is the caller's
                // decision, not ours.
                warn!(error = %e, "Token refresh failed");
                false
            }
        }
    }
}

/// Restores `Idle` when the leader finishes, panics, or is cancelled,
/// so the coordinator can never stay wedged in `Refreshing`.
struct IdleOnDrop<'a> {
    state: &'a Mutex<RefreshState>,
}

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = RefreshState::Idle;
    }
}
