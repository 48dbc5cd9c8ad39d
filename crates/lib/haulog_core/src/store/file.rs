//! File-backed credential store.
//!
//! Persists the session as a single JSON record under the platform data
//! dir, written atomically (temp file + rename) so a crash cannot leave a
//! token on disk without its matching user record. Token values are sealed
//! with AES-256-GCM (see [`super::crypto`]).

use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{CredentialStore, StoreError, crypto};
use crate::models::session::{Session, SessionStatus, User};

/// On-disk session record. Token fields hold sealed (base64) values.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<User>,
    saved_at: DateTime<Utc>,
}

/// Credential store persisting to a JSON file.
pub struct FileStore {
    path: PathBuf,
    passphrase: String,
}

impl FileStore {
    /// Store at the default platform location
    /// (`<data_dir>/haulog/session.json`).
    pub fn open_default(passphrase: &str) -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("haulog")
            .join("session.json");
        Self::at_path(path, passphrase)
    }

    /// Store at an explicit path (tests, portable installs).
    pub fn at_path(path: impl Into<PathBuf>, passphrase: &str) -> Self {
        Self {
            path: path.into(),
            passphrase: passphrase.to_string(),
        }
    }

    fn read_record(&self) -> Option<StoredSession> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read session file");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt session file; ignoring");
                None
            }
        }
    }

    fn open_token(&self, sealed: Option<String>) -> Result<Option<String>, StoreError> {
        sealed
            .as_deref()
            .map(|s| crypto::open(s, &self.passphrase))
            .transpose()
    }
}

impl CredentialStore for FileStore {
    fn get(&self) -> Session {
        let Some(record) = self.read_record() else {
            return Session::anonymous();
        };

        let (access_token, refresh_token) = match (
            self.open_token(record.access_token),
            self.open_token(record.refresh_token),
        ) {
            (Ok(access), Ok(refresh)) => (access, refresh),
            (Err(error), _) | (_, Err(error)) => {
                warn!(%error, "stored tokens unreadable; discarding session");
                return Session::anonymous();
            }
        };

        // Only a complete record restores a session; the controller never
        // persists partial ones, so anything else is damage.
        let status = if access_token.is_some() && refresh_token.is_some() && record.user.is_some()
        {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Anonymous
        };

        let session = Session {
            access_token,
            refresh_token,
            user: record.user,
            status,
        };
        if !session.is_consistent() {
            warn!("inconsistent persisted session; discarding");
            return Session::anonymous();
        }
        session
    }

    fn set(&self, session: &Session) -> Result<(), StoreError> {
        let record = StoredSession {
            access_token: session
                .access_token
                .as_deref()
                .map(|t| crypto::seal(t, &self.passphrase))
                .transpose()?,
            refresh_token: session
                .refresh_token
                .as_deref()
                .map(|t| crypto::seal(t, &self.passphrase))
                .transpose()?,
            user: session.user.clone(),
            saved_at: Utc::now(),
        };

        let Some(dir) = self.path.parent() else {
            return Err(StoreError::Io(io::Error::other(
                "session path has no parent directory",
            )));
        };
        std::fs::create_dir_all(dir)?;

        // The whole record lands in one rename; readers never observe a
        // partially written session.
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &record)?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::Io(e.error))?;

        debug!(path = %self.path.display(), "session persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
