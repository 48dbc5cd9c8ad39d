//! Session domain models.
//!
//! These are internal domain models, distinct from the wire types in
//! `haulog_client` (which carry `#[serde(rename)]` for camelCase fields).

use serde::{Deserialize, Serialize};

/// Domain user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Role assigned by the backend (e.g. `"admin"`, `"driver"`). The role
    /// vocabulary is owned by the backend, so this stays an open string.
    pub role: String,
}

/// Lifecycle status of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No credentials held. Initial state and the only reset state.
    Anonymous,
    /// A login or registration call is in flight.
    Authenticating,
    /// Valid credentials held.
    Authenticated,
    /// A token refresh is in flight.
    Refreshing,
    /// The access token is known stale but the refresh token is still held.
    Expired,
}

/// The current session: token pair, user profile, and lifecycle status.
///
/// Invariants: `access_token` and `user` are present together or not at all,
/// and `refresh_token` is absent only for anonymous sessions. Constructors
/// uphold these; [`Session::is_consistent`] checks a snapshot of unknown
/// provenance (e.g. read back from disk).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
    pub status: SessionStatus,
}

impl Session {
    /// Fresh anonymous session: no tokens, no profile.
    pub fn anonymous() -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            user: None,
            status: SessionStatus::Anonymous,
        }
    }

    /// Session established by a successful login or registration.
    pub fn authenticated(access_token: String, refresh_token: String, user: User) -> Self {
        Self {
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            user: Some(user),
            status: SessionStatus::Authenticated,
        }
    }

    /// Whether the presence invariants hold.
    pub fn is_consistent(&self) -> bool {
        if self.access_token.is_some() != self.user.is_some() {
            return false;
        }
        match self.status {
            SessionStatus::Anonymous => {
                self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
            }
            _ => self.refresh_token.is_some(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated && self.access_token.is_some()
    }

    /// Role of the signed-in user, if any.
    pub fn role(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.role.as_str())
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role() == Some(role)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> User {
        User {
            id: 1,
            username: "bob".into(),
            role: "driver".into(),
        }
    }

    #[test]
    fn anonymous_session_is_consistent() {
        let session = Session::anonymous();
        assert!(session.is_consistent());
        assert!(!session.is_authenticated());
        assert_eq!(session.role(), None);
    }

    #[test]
    fn authenticated_session_is_consistent() {
        let session = Session::authenticated("A1".into(), "R1".into(), driver());
        assert!(session.is_consistent());
        assert!(session.is_authenticated());
        assert!(session.has_role("driver"));
        assert!(!session.has_role("admin"));
    }

    #[test]
    fn token_without_user_is_inconsistent() {
        let mut session = Session::authenticated("A1".into(), "R1".into(), driver());
        session.user = None;
        assert!(!session.is_consistent());
    }

    #[test]
    fn non_anonymous_without_refresh_token_is_inconsistent() {
        let mut session = Session::authenticated("A1".into(), "R1".into(), driver());
        session.refresh_token = None;
        assert!(!session.is_consistent());
    }

    #[test]
    fn anonymous_with_leftover_fields_is_inconsistent() {
        let mut session = Session::authenticated("A1".into(), "R1".into(), driver());
        session.status = SessionStatus::Anonymous;
        assert!(!session.is_consistent());
    }
}
