//! Persistence substrates for session state.
//!
//! The storage medium is a strategy injected into [`super::SessionStore`]:
//! in-memory for servers and tests, a JSON file for embedded clients
//! (the local-storage analog).

use std::path::PathBuf;
use std::sync::Mutex;

use authgate_core::{AppError, AppResult};

use super::state::AuthState;

/// Storage substrate for serialized session state.
///
/// All methods are synchronous: state is read once at store
/// construction and written wholesale on every mutation.
pub trait StateStore: Send + Sync {
    /// Loads the previously saved state, if any.
    fn load(&self) -> AppResult<Option<AuthState>>;
    /// Overwrites the saved state.
    fn save(&self, state: &AuthState) -> AppResult<()>;
    /// Removes any saved state.
    fn clear(&self) -> AppResult<()>;
}

/// Keeps state in memory only. Sessions do not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    slot: Mutex<Option<AuthState>>,
}

impl MemoryStateStore {
    /// Creates an empty in-memory substrate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a substrate pre-seeded with the given state.
    pub fn with_state(state: AuthState) -> Self {
        Self {
            slot: Mutex::new(Some(state)),
        }
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> AppResult<Option<AuthState>> {
        let slot = self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(slot.clone())
    }

    fn save(&self, state: &AuthState) -> AppResult<()> {
        let mut slot = self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = Some(state.clone());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        let mut slot = self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = None;
        Ok(())
    }
}

/// Persists state as a single JSON file under one path.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Creates a file substrate at the given path. The file is created
    /// lazily on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> AppResult<Option<AuthState>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::with_source(
                    authgate_core::error::ErrorKind::Internal,
                    format!("Failed to read session state from {}: {e}", self.path.display()),
                    e,
                ));
            }
        };

        let state = serde_json::from_str(&raw)?;
        Ok(Some(state))
    }

    fn save(&self, state: &AuthState) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(state)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
