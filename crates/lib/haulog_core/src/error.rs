//! Error taxonomy for the session subsystem.

use thiserror::Error;

use crate::store::StoreError;

/// Convenience alias for session operation results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors surfaced by session operations.
///
/// Only `RefreshRejected` has a global side effect (the session is cleared
/// when the backend rejects the refresh token). Everything else is returned
/// to the caller with the session left as it was.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed input, rejected before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backend rejected the supplied credentials.
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    /// Transport failure; eligible for caller-level retry.
    #[error("Network error: {0}")]
    Network(String),

    /// The refresh token was rejected. Fatal to the session, not the process.
    #[error("Refresh rejected: {0}")]
    RefreshRejected(String),

    /// Credential store failure.
    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),
}
