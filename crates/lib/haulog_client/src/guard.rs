//! Route guard: role-gated navigation decisions.
//!
//! All role branching lives here. UI code asks the guard for a decision
//! (or calls `SessionController::has_role` / `is_authenticated`); it never
//! inspects raw token presence itself.

use std::sync::Arc;

use haulog_core::models::session::{Session, SessionStatus};

use crate::session::SessionController;

/// Outcome of evaluating a navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The session may enter the route.
    Allow,
    /// A login or refresh is in flight, or a renewal is obtainable; show a
    /// loader instead of flickering to the login page.
    Pending,
    /// No valid access token and no way to obtain one.
    RedirectToLogin,
    /// Valid session, but the user's role is not in the required set.
    RedirectToUnauthorized,
}

/// Role-gated navigation decisions over the current session.
pub struct RouteGuard {
    session: Arc<SessionController>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionController>) -> Self {
        Self { session }
    }

    /// Decide from the current session snapshot. An empty `required_roles`
    /// set admits any authenticated user.
    pub fn evaluate(&self, required_roles: &[&str]) -> RouteDecision {
        Self::decide(&self.session.session(), required_roles)
    }

    /// The decision table, pure over a session snapshot.
    pub fn decide(session: &Session, required_roles: &[&str]) -> RouteDecision {
        if matches!(
            session.status,
            SessionStatus::Authenticating | SessionStatus::Refreshing
        ) {
            return RouteDecision::Pending;
        }
        match (&session.access_token, &session.user) {
            (Some(_), Some(user)) => {
                if required_roles.is_empty() || required_roles.contains(&user.role.as_str()) {
                    RouteDecision::Allow
                } else {
                    RouteDecision::RedirectToUnauthorized
                }
            }
            // A held refresh token means a new access token is obtainable.
            _ if session.refresh_token.is_some() => RouteDecision::Pending,
            _ => RouteDecision::RedirectToLogin,
        }
    }

    /// Evaluate after driving any obtainable token renewal to completion.
    ///
    /// A failed renewal clears the session, so the re-evaluation redirects
    /// to login. May still report `Pending` while a login started elsewhere
    /// is in flight.
    pub async fn resolve(&self, required_roles: &[&str]) -> RouteDecision {
        let snapshot = self.session.session();
        let renewable = snapshot.status == SessionStatus::Refreshing
            || (snapshot.access_token.is_none() && snapshot.refresh_token.is_some());
        if renewable {
            // Joins the in-flight refresh if one is running (single-flight).
            let _ = self.session.refresh().await;
        }
        self.evaluate(required_roles)
    }
}
