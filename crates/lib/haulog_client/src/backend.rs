//! Backend auth endpoints.
//!
//! [`AuthBackend`] is the seam the session controller talks through; the
//! production implementation posts JSON to the configured API. Tests swap
//! in scripted implementations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use haulog_core::{AuthError, AuthResult};

use crate::config::ClientConfig;
use crate::models::{
    DetailResponse, LoginRequest, PasswordResetConfirm, PasswordResetRequest, RefreshRequest,
    RefreshResponse, RegisterRequest, TokenResponse,
};

/// Backend auth endpoints consumed by the session controller.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> AuthResult<TokenResponse>;
    async fn register(&self, request: &RegisterRequest) -> AuthResult<TokenResponse>;
    async fn refresh(&self, request: &RefreshRequest) -> AuthResult<RefreshResponse>;
    async fn request_password_reset(&self, request: &PasswordResetRequest) -> AuthResult<String>;
    async fn confirm_password_reset(&self, request: &PasswordResetConfirm) -> AuthResult<String>;
}

/// `AuthBackend` over HTTP.
pub struct HttpAuthBackend {
    client: reqwest::Client,
    api_url: Url,
}

impl HttpAuthBackend {
    pub fn new(config: &ClientConfig) -> AuthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AuthError::Network(format!("client init: {e}")))?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> AuthResult<Url> {
        self.api_url
            .join(path)
            .map_err(|e| AuthError::Network(format!("bad endpoint {path}: {e}")))
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> AuthResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("POST {path}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<DetailResponse>()
                .await
                .ok()
                .and_then(|d| d.detail)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(match status {
                StatusCode::BAD_REQUEST => AuthError::Validation(detail),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AuthError::Credentials(detail),
                _ => AuthError::Network(format!("POST {path}: HTTP {status}: {detail}")),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AuthError::Network(format!("POST {path}: parse: {e}")))
    }

    async fn post_for_detail<B>(&self, path: &str, body: &B) -> AuthResult<String>
    where
        B: Serialize + Sync,
    {
        let acknowledgement: DetailResponse = self.post_json(path, body).await?;
        Ok(acknowledgement.detail.unwrap_or_default())
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn login(&self, request: &LoginRequest) -> AuthResult<TokenResponse> {
        self.post_json("auth/login/", request).await
    }

    async fn register(&self, request: &RegisterRequest) -> AuthResult<TokenResponse> {
        self.post_json("auth/register/", request).await
    }

    async fn refresh(&self, request: &RefreshRequest) -> AuthResult<RefreshResponse> {
        self.post_json("auth/token/refresh/", request).await
    }

    async fn request_password_reset(&self, request: &PasswordResetRequest) -> AuthResult<String> {
        self.post_for_detail("auth/password_reset/", request).await
    }

    async fn confirm_password_reset(&self, request: &PasswordResetConfirm) -> AuthResult<String> {
        self.post_for_detail("auth/password_reset/confirm/", request)
            .await
    }
}
