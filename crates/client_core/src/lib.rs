use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{TodoId, TodoItem, UserProfile},
    error::ApiError,
    protocol::{Envelope, LoginRequest, LoginResponse, RegisterRequest, TodoWriteRequest},
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

pub mod todo_store;
pub use todo_store::{TodoBackend, TodoStore};

/// Failure taxonomy surfaced to callers. Every operation is a single
/// round trip; nothing here is retried and nothing is fatal to the process.
/// Frontends render the message as plain text.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("session storage failure: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

/// Seam for the persisted session token, injected into [`ApiClient`] at
/// construction. The token is opaque; absence means requests go out without
/// an `Authorization` header and the server rejects them.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn set_token(&self, token: &str) -> Result<()>;
    async fn token(&self) -> Result<Option<String>>;
    async fn clear_token(&self) -> Result<()>;
}

#[async_trait]
impl TokenStore for storage::SessionStore {
    async fn set_token(&self, token: &str) -> Result<()> {
        storage::SessionStore::set_token(self, token).await
    }

    async fn token(&self) -> Result<Option<String>> {
        storage::SessionStore::token(self).await
    }

    async fn clear_token(&self) -> Result<()> {
        storage::SessionStore::clear_token(self).await
    }
}

/// Process-local token store for tests and short-lived tooling.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn set_token(&self, token: &str) -> Result<()> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn token(&self) -> Result<Option<String>> {
        Ok(self.token.read().await.clone())
    }

    async fn clear_token(&self) -> Result<()> {
        *self.token.write().await = None;
        Ok(())
    }
}

/// HTTP client for the todo API. Attaches `Authorization: Bearer <token>`
/// when a token is persisted and maps responses into [`ClientError`]. No
/// retries, no request deduplication, transport-default timeouts only.
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            tokens,
        }
    }

    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.tokens)
    }

    /// Exchanges credentials for a bearer token and persists it, overwriting
    /// any prior session.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let LoginResponse { token } = decode(response).await?;
        self.tokens
            .set_token(&token)
            .await
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        info!(username, "login succeeded");
        Ok(token)
    }

    /// Creates an account. The caller is expected to follow up with `login`;
    /// no token is issued here.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<(), ClientError> {
        require_filled("username", username)?;
        require_filled("password", password)?;
        require_filled("email", email)?;
        let response = self
            .http
            .post(format!("{}/api/auth/register", self.base_url))
            .json(&RegisterRequest {
                username: username.to_string(),
                password: password.to_string(),
                email: email.to_string(),
            })
            .send()
            .await?;
        ensure_success(response).await
    }

    pub async fn list_todos(&self) -> Result<Vec<TodoItem>, ClientError> {
        let request = self.http.get(format!("{}/api/todos", self.base_url));
        let response = self.authorized(request).await?.send().await?;
        decode(response).await
    }

    pub async fn get_todo(&self, id: &TodoId) -> Result<TodoItem, ClientError> {
        let request = self.http.get(format!("{}/api/todos/{id}", self.base_url));
        let response = self.authorized(request).await?.send().await?;
        decode(response).await
    }

    pub async fn create_todo(
        &self,
        title: &str,
        description: &str,
    ) -> Result<TodoItem, ClientError> {
        require_todo_fields(title, description)?;
        let request = self
            .http
            .post(format!("{}/api/todos", self.base_url))
            .json(&TodoWriteRequest {
                title: title.to_string(),
                description: description.to_string(),
            });
        let response = self.authorized(request).await?.send().await?;
        decode(response).await
    }

    pub async fn update_todo(
        &self,
        id: &TodoId,
        title: &str,
        description: &str,
    ) -> Result<TodoItem, ClientError> {
        require_todo_fields(title, description)?;
        let request = self
            .http
            .put(format!("{}/api/todos/{id}", self.base_url))
            .json(&TodoWriteRequest {
                title: title.to_string(),
                description: description.to_string(),
            });
        let response = self.authorized(request).await?.send().await?;
        decode(response).await
    }

    pub async fn delete_todo(&self, id: &TodoId) -> Result<(), ClientError> {
        let request = self.http.delete(format!("{}/api/todos/{id}", self.base_url));
        let response = self.authorized(request).await?.send().await?;
        ensure_success(response).await
    }

    pub async fn profile(&self) -> Result<UserProfile, ClientError> {
        let request = self.http.get(format!("{}/api/profile", self.base_url));
        let response = self.authorized(request).await?.send().await?;
        decode(response).await
    }

    /// Drops the persisted session. Purely local; the server keeps no
    /// revocation state worth telling about.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.tokens
            .clear_token()
            .await
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        info!("session cleared");
        Ok(())
    }

    async fn authorized(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        match self
            .tokens
            .token()
            .await
            .map_err(|e| ClientError::Storage(e.to_string()))?
        {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Ok(request),
        }
    }
}

fn require_filled(field: &str, value: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn require_todo_fields(title: &str, description: &str) -> Result<(), ClientError> {
    if title.trim().is_empty() || description.trim().is_empty() {
        return Err(ClientError::Validation(
            "both title and description are required".to_string(),
        ));
    }
    Ok(())
}

/// Unwraps a successful `{ "data": ... }` body, or classifies the failure by
/// HTTP status: 401/403 auth, 404 not found, 400/422 validation, everything
/// else network. The server's message text is carried through verbatim.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(classify(response).await);
    }
    let envelope: Envelope<T> = response
        .json()
        .await
        .map_err(|e| ClientError::Network(format!("invalid response body: {e}")))?;
    Ok(envelope.data)
}

async fn ensure_success(response: Response) -> Result<(), ClientError> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(classify(response).await)
}

async fn classify(response: Response) -> ClientError {
    let status = response.status();
    let message = match response.json::<ApiError>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Auth(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ClientError::Validation(message)
        }
        _ => ClientError::Network(format!("unexpected status {status}: {message}")),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
