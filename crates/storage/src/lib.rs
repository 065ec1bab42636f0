use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Fixed key under which the bearer token is persisted. There is exactly one
/// session per installation.
const SESSION_TOKEN_KEY: &str = "session_token";

/// Durable session store: a single opaque bearer token surviving process
/// restarts. Written at login, read before every authenticated request,
/// cleared at logout. No expiry or refresh logic lives here; the token is
/// trusted until the server rejects it.
#[derive(Clone)]
pub struct SessionStore {
    pool: Pool<Sqlite>,
}

impl SessionStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await?;
        let store = Self { pool };
        store.ensure_session_table().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_session_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure session table exists")?;
        Ok(())
    }

    /// Persists `token`, overwriting any prior value.
    pub async fn set_token(&self, token: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO session (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = CURRENT_TIMESTAMP",
        )
        .bind(SESSION_TOKEN_KEY)
        .bind(token)
        .execute(&self.pool)
        .await
        .context("failed to persist session token")?;
        Ok(())
    }

    /// Returns the persisted token, or `None` if none was ever set or it was
    /// cleared. Absence is a normal state, not an error.
    pub async fn token(&self) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM session WHERE key = ?")
            .bind(SESSION_TOKEN_KEY)
            .fetch_optional(&self.pool)
            .await
            .context("failed to read session token")?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    /// Removes any persisted token. Clearing twice is not an error.
    pub async fn clear_token(&self) -> Result<()> {
        sqlx::query("DELETE FROM session WHERE key = ?")
            .bind(SESSION_TOKEN_KEY)
            .execute(&self.pool)
            .await
            .context("failed to clear session token")?;
        Ok(())
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
