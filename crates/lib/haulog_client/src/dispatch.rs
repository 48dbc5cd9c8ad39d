//! Request dispatcher: bearer attachment and transparent token renewal.
//!
//! Every feature-level API call goes through [`RequestDispatcher::dispatch`].
//! The dispatcher attaches the current access token, and on an authorization
//! failure runs the controller's single-flight refresh and retries the
//! original call exactly once. Feature code never handles tokens itself.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::Method;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use haulog_core::{AuthError, AuthResult};

use crate::config::ClientConfig;
use crate::session::SessionController;

/// Authorization failures get exactly this many transparent retries per
/// original call, no matter how many consecutive 401s occur.
const MAX_AUTH_RETRIES: u8 = 1;

/// A logical API request, independent of the transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured API base (e.g. `trips/`).
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path, None)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path, Some(body))
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path, Some(body))
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path, None)
    }
}

/// Transport-level response: status plus parsed JSON body (`Null` when the
/// backend sent none).
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors surfaced to feature code by [`RequestDispatcher::dispatch`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// An authorization failure that survived the one refresh-and-retry.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Transport failure.
    #[error("Network error: {0}")]
    Network(String),
}

/// Executes a prepared request against the backend. The seam tests inject
/// scripted transports through.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform the request, attaching `bearer` when present. Returns `Ok`
    /// for any HTTP status; `Err` is reserved for transport failures.
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, ApiError>;
}

/// `HttpTransport` over reqwest.
pub struct ReqwestTransport {
    client: reqwest::Client,
    api_url: Url,
}

impl ReqwestTransport {
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
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let url = self
            .api_url
            .join(&request.path)
            .map_err(|e| ApiError::Network(format!("bad path {}: {e}", request.path)))?;

        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("{} {}: {e}", request.method, request.path)))?;

        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok(ApiResponse { status, body })
    }
}

/// Wraps outbound API calls with bearer attachment and 401 recovery.
pub struct RequestDispatcher {
    session: Arc<SessionController>,
    transport: Arc<dyn HttpTransport>,
}

impl RequestDispatcher {
    pub fn new(session: Arc<SessionController>, transport: Arc<dyn HttpTransport>) -> Self {
        Self { session, transport }
    }

    /// Dispatch a request, transparently renewing the access token on an
    /// authorization failure (at most once per original call).
    pub async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let request_id = Uuid::new_v4();
        self.send(request_id, request, 0).await
    }

    /// `attempt` is immutable per call; the retry path passes `attempt + 1`.
    async fn send(
        &self,
        request_id: Uuid,
        request: ApiRequest,
        attempt: u8,
    ) -> Result<ApiResponse, ApiError> {
        let bearer = self.session.access_token();
        let response = self.transport.execute(&request, bearer.as_deref()).await?;
        debug!(
            %request_id,
            method = %request.method,
            path = %request.path,
            status = response.status,
            attempt,
            "dispatched"
        );

        if response.status == http::StatusCode::UNAUTHORIZED.as_u16() {
            let message = detail_message(&response.body);
            if attempt >= MAX_AUTH_RETRIES {
                warn!(%request_id, "still unauthorized after token renewal");
                return Err(ApiError::Unauthorized(message));
            }
            if let Err(error) = self.session.refresh().await {
                // The controller already cleared the session if the refresh
                // token was rejected; surface the original failure.
                warn!(%request_id, %error, "token renewal failed; surfacing original 401");
                return Err(ApiError::Unauthorized(message));
            }
            return Box::pin(self.send(request_id, request, attempt + 1)).await;
        }

        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                message: detail_message(&response.body),
            });
        }
        Ok(response)
    }
}

/// Pull the backend's `detail` message out of an error body.
fn detail_message(body: &Value) -> String {
    body.get("detail")
        .and_then(Value::as_str)
        .unwrap_or("request rejected")
        .to_string()
}
