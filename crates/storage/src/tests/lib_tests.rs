use super::*;

#[tokio::test]
async fn token_is_absent_until_set() {
    let store = SessionStore::new("sqlite::memory:").await.expect("db");
    assert_eq!(store.token().await.expect("read"), None);
}

#[tokio::test]
async fn set_then_get_returns_same_token() {
    let store = SessionStore::new("sqlite::memory:").await.expect("db");
    store.set_token("opaque-token").await.expect("write");
    assert_eq!(
        store.token().await.expect("read").as_deref(),
        Some("opaque-token")
    );
}

#[tokio::test]
async fn set_overwrites_prior_token() {
    let store = SessionStore::new("sqlite::memory:").await.expect("db");
    store.set_token("first").await.expect("write");
    store.set_token("second").await.expect("write");
    assert_eq!(store.token().await.expect("read").as_deref(), Some("second"));
}

#[tokio::test]
async fn clear_removes_token_and_is_idempotent() {
    let store = SessionStore::new("sqlite::memory:").await.expect("db");
    store.set_token("opaque-token").await.expect("write");
    store.clear_token().await.expect("clear");
    assert_eq!(store.token().await.expect("read"), None);
    store.clear_token().await.expect("clear again");
    assert_eq!(store.token().await.expect("read"), None);
}

#[tokio::test]
async fn token_survives_store_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}/session.db", dir.path().display());

    {
        let store = SessionStore::new(&url).await.expect("db");
        store.set_token("survivor").await.expect("write");
    }

    let reopened = SessionStore::new(&url).await.expect("reopen");
    assert_eq!(
        reopened.token().await.expect("read").as_deref(),
        Some("survivor")
    );
}

#[tokio::test]
async fn creates_parent_dir_for_database_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}/nested/data/session.db", dir.path().display());
    let store = SessionStore::new(&url).await.expect("db");
    store.health_check().await.expect("health check");
    assert!(dir.path().join("nested/data").exists());
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let store = SessionStore::new("sqlite::memory:").await.expect("db");
    store.health_check().await.expect("health check");
}
