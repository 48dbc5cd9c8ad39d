//! # haulog_client
//!
//! Session and credential lifecycle client for Haulog: login, registration,
//! persisted sessions, transparent token renewal, and role-gated navigation
//! decisions. Feature code consumes this crate through
//! [`SessionController`], [`RequestDispatcher::dispatch`], and
//! [`RouteGuard`]; it never inspects tokens itself.

pub mod backend;
pub mod config;
pub mod dispatch;
pub mod guard;
pub mod models;
pub mod session;

use std::sync::Arc;

use haulog_core::AuthResult;
use haulog_core::store::CredentialStore;

pub use config::ClientConfig;
pub use dispatch::{ApiError, ApiRequest, ApiResponse, RequestDispatcher};
pub use guard::{RouteDecision, RouteGuard};
pub use session::SessionController;

/// The assembled client: controller, dispatcher, and guard over one shared
/// session.
pub struct Client {
    pub session: Arc<SessionController>,
    pub dispatcher: RequestDispatcher,
    pub guard: RouteGuard,
}

/// Assemble a client over HTTP with `config`, restoring any session
/// persisted in `store`.
pub fn connect(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> AuthResult<Client> {
    let backend = Arc::new(backend::HttpAuthBackend::new(config)?);
    let session = Arc::new(SessionController::new(store, backend));
    let transport = Arc::new(dispatch::ReqwestTransport::new(config)?);
    let dispatcher = RequestDispatcher::new(Arc::clone(&session), transport);
    let guard = RouteGuard::new(Arc::clone(&session));
    Ok(Client {
        session,
        dispatcher,
        guard,
    })
}
