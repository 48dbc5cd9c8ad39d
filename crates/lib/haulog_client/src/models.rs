//! Wire types for the backend auth API.
//!
//! Field names follow the backend contract (camelCase where the backend
//! expects it); the domain models live in `haulog_core::models`.

use serde::{Deserialize, Serialize};

use haulog_core::models::session::User;

/// `POST auth/login/` request body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST auth/register/` request body.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
}

/// Token pair plus profile returned by login and register.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
    pub user: User,
}

/// `POST auth/token/refresh/` request body.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// `POST auth/token/refresh/` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// `POST auth/password_reset/` request body.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// `POST auth/password_reset/confirm/` request body.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetConfirm {
    pub uid: String,
    pub token: String,
    pub new_password: String,
}

/// Backend detail body, used both for error responses and for the
/// acknowledgement returned by the password-reset endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct DetailResponse {
    pub detail: Option<String>,
}
