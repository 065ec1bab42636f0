use serde::{Deserialize, Serialize};

/// Every successful response body wraps its payload under a `data` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Body for both create and update; the API always sends the full pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoWriteRequest {
    pub title: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::TodoItem;

    #[test]
    fn login_response_unwraps_from_data_envelope() {
        let raw = r#"{"data":{"token":"opaque-token"}}"#;
        let envelope: Envelope<LoginResponse> = serde_json::from_str(raw).expect("deserialize");
        assert_eq!(envelope.data.token, "opaque-token");
    }

    #[test]
    fn todo_list_unwraps_in_order() {
        let raw = r#"{"data":[
            {"_id":"1","title":"a","description":"x"},
            {"_id":"2","title":"b","description":"y"}
        ]}"#;
        let envelope: Envelope<Vec<TodoItem>> = serde_json::from_str(raw).expect("deserialize");
        let ids: Vec<_> = envelope.data.iter().map(|t| t.id.0.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }
}
