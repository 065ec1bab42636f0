use std::sync::Arc;

use async_trait::async_trait;
use shared::domain::TodoItem;
use tokio::sync::RwLock;
use tracing::warn;

use crate::{ApiClient, ClientError};

/// Listing seam between the cache and the transport, so the container's
/// semantics are testable without a live server.
#[async_trait]
pub trait TodoBackend: Send + Sync {
    async fn list_todos(&self) -> Result<Vec<TodoItem>, ClientError>;
}

#[async_trait]
impl TodoBackend for ApiClient {
    async fn list_todos(&self) -> Result<Vec<TodoItem>, ClientError> {
        ApiClient::list_todos(self).await
    }
}

/// Single in-memory cache of the current user's todo list, shared across
/// frontends. Refreshed wholesale from the server; only server-confirmed
/// updates are patched in place. Create and delete callers re-run
/// [`TodoStore::fetch_all`] instead of patching locally.
///
/// Concurrent fetches are last-response-wins: the cache is only ever
/// replaced with a fully materialized list, so overlapping calls cannot
/// corrupt it, but no request ordering is enforced.
pub struct TodoStore {
    backend: Arc<dyn TodoBackend>,
    items: RwLock<Vec<TodoItem>>,
}

impl TodoStore {
    pub fn new(backend: Arc<dyn TodoBackend>) -> Self {
        Self {
            backend,
            items: RwLock::new(Vec::new()),
        }
    }

    /// Reloads the full list. On success the cached sequence is replaced with
    /// the server's response in server order; on failure the prior cache is
    /// left untouched and the error is forwarded.
    pub async fn fetch_all(&self) -> Result<(), ClientError> {
        let items = self.backend.list_todos().await?;
        *self.items.write().await = items;
        Ok(())
    }

    /// Replaces the cached entry matching `updated.id` in place, preserving
    /// order. An unknown id is a no-op; the server is the source of truth, so
    /// that case only happens when the cache is stale.
    pub async fn apply_update(&self, updated: TodoItem) {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|item| item.id == updated.id) {
            Some(slot) => *slot = updated,
            None => warn!(id = %updated.id, "apply_update ignored for id not in cache"),
        }
    }

    /// Cloned read view for rendering. Frontends hold the store, never a
    /// private copy of the list.
    pub async fn snapshot(&self) -> Vec<TodoItem> {
        self.items.read().await.clone()
    }
}

#[cfg(test)]
#[path = "tests/todo_store_tests.rs"]
mod tests;
