use super::*;

fn offline_client() -> ApiClient {
    // Port 9 (discard) is never listened on; these tests must fail before
    // any request is sent.
    ApiClient::new("http://127.0.0.1:9", Arc::new(MemoryTokenStore::default()))
}

#[tokio::test]
async fn memory_store_roundtrips_token() {
    let store = MemoryTokenStore::default();
    assert_eq!(store.token().await.expect("read"), None);
    store.set_token("abc").await.expect("write");
    assert_eq!(store.token().await.expect("read").as_deref(), Some("abc"));
    store.clear_token().await.expect("clear");
    assert_eq!(store.token().await.expect("read"), None);
    store.clear_token().await.expect("clear twice");
}

#[tokio::test]
async fn create_todo_rejects_blank_title_before_sending() {
    let err = offline_client()
        .create_todo("   ", "2%")
        .await
        .expect_err("should fail");
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn create_todo_rejects_blank_description_before_sending() {
    let err = offline_client()
        .create_todo("Buy milk", "")
        .await
        .expect_err("should fail");
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn update_todo_rejects_blank_fields_before_sending() {
    let err = offline_client()
        .update_todo(&TodoId::from("x"), "", "")
        .await
        .expect_err("should fail");
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn register_rejects_empty_email_before_sending() {
    let err = offline_client()
        .register("alice", "secret", " ")
        .await
        .expect_err("should fail");
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn logout_clears_the_stored_token() {
    let tokens = Arc::new(MemoryTokenStore::default());
    tokens.set_token("opaque").await.expect("write");
    let client = ApiClient::new("http://127.0.0.1:9", Arc::clone(&tokens) as Arc<dyn TokenStore>);
    client.logout().await.expect("logout");
    assert_eq!(tokens.token().await.expect("read"), None);
}

#[test]
fn base_url_trailing_slash_is_stripped() {
    let client = ApiClient::new(
        "http://localhost:3000/",
        Arc::new(MemoryTokenStore::default()),
    );
    assert_eq!(client.base_url, "http://localhost:3000");
}

#[test]
fn errors_render_as_plain_text() {
    let err = ClientError::Auth("Invalid credentials".to_string());
    assert_eq!(err.to_string(), "authentication failed: Invalid credentials");
    let err = ClientError::NotFound("todo not found".to_string());
    assert_eq!(err.to_string(), "not found: todo not found");
}
