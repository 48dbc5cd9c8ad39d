//! Credential store: persisted holder for the current session.
//!
//! The store is a dumb key/value holder. It never talks to the network and
//! carries no session logic; `haulog_client::session::SessionController` is
//! its only writer.

mod crypto;
mod file;

pub use file::FileStore;

use std::sync::{PoisonError, RwLock};

use thiserror::Error;

use crate::models::session::Session;

/// Credential store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Encryption error: {0}")]
    Crypto(String),
}

/// Persisted holder for the session's tokens and user profile.
///
/// The access token, refresh token, and user are one logical unit: `set`
/// writes all of them in a single step and `clear` removes all of them, so
/// a reader never observes a half-written session.
pub trait CredentialStore: Send + Sync {
    /// Snapshot of the stored session. An empty, corrupt, or unreadable
    /// store reads as an anonymous session rather than an error.
    fn get(&self) -> Session;

    /// Replace the stored session with `session`, as one unit.
    fn set(&self, session: &Session) -> Result<(), StoreError>;

    /// Remove every stored field.
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory credential store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    session: RwLock<Session>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Session {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, session: &Session) -> Result<(), StoreError> {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Session::anonymous();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::User;

    fn sample_session() -> Session {
        Session::authenticated(
            "A1".into(),
            "R1".into(),
            User {
                id: 1,
                username: "bob".into(),
                role: "driver".into(),
            },
        )
    }

    #[test]
    fn memory_store_starts_anonymous() {
        let store = MemoryStore::new();
        assert_eq!(store.get(), Session::anonymous());
    }

    #[test]
    fn memory_store_set_get_round_trip() {
        let store = MemoryStore::new();
        let session = sample_session();
        store.set(&session).unwrap();
        assert_eq!(store.get(), session);
    }

    #[test]
    fn memory_store_clear_removes_everything() {
        let store = MemoryStore::new();
        store.set(&sample_session()).unwrap();
        store.clear().unwrap();
        assert_eq!(store.get(), Session::anonymous());
    }
}
