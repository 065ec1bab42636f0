//! In-memory double of the todo API the client consumes. Holds users,
//! sessions, and todos behind `RwLock`s; state lives for the process only.
//! Response bodies wrap their payload under `data`, matching what the client
//! parses.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    domain::{TodoId, TodoItem, UserProfile},
    error::{ApiError, ErrorCode},
    protocol::{Envelope, LoginRequest, LoginResponse, RegisterRequest, TodoWriteRequest},
};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

pub mod config;

type ApiFailure = (StatusCode, Json<ApiError>);

#[derive(Debug, Clone)]
struct UserRecord {
    password: String,
    email: String,
}

#[derive(Debug, Clone)]
struct StoredTodo {
    id: TodoId,
    owner: String,
    title: String,
    description: String,
}

impl StoredTodo {
    fn to_item(&self) -> TodoItem {
        TodoItem {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Default)]
pub struct AppState {
    users: RwLock<HashMap<String, UserRecord>>,
    // token -> username
    sessions: RwLock<HashMap<String, String>>,
    // insertion order is the order the list endpoint returns
    todos: RwLock<Vec<StoredTodo>>,
}

pub fn app() -> Router {
    build_router(Arc::new(AppState::default()))
}

pub async fn run(listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    axum::serve(listener, app()).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/auth/register", axum::routing::post(register))
        .route("/api/auth/login", axum::routing::post(login))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/:id",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/api/profile", get(profile))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Envelope<Value>>), ApiFailure> {
    if req.username.trim().is_empty() || req.password.trim().is_empty() || req.email.trim().is_empty()
    {
        return Err(validation("username, password and email are required"));
    }

    let mut users = state.users.write().await;
    if users.contains_key(&req.username) {
        return Err(validation("username is already taken"));
    }
    users.insert(
        req.username.clone(),
        UserRecord {
            password: req.password,
            email: req.email,
        },
    );
    info!(username = %req.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(json!({ "message": "user registered" }))),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Envelope<LoginResponse>>, ApiFailure> {
    let users = state.users.read().await;
    let valid = users
        .get(&req.username)
        .is_some_and(|user| user.password == req.password);
    if !valid {
        return Err(unauthorized("Invalid credentials"));
    }
    drop(users);

    let token = Uuid::new_v4().to_string();
    state
        .sessions
        .write()
        .await
        .insert(token.clone(), req.username.clone());
    info!(username = %req.username, "login token issued");
    Ok(Json(Envelope::new(LoginResponse { token })))
}

async fn list_todos(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Envelope<Vec<TodoItem>>>, ApiFailure> {
    let username = authenticate(&state, &headers).await?;
    let todos = state.todos.read().await;
    let items = todos
        .iter()
        .filter(|todo| todo.owner == username)
        .map(StoredTodo::to_item)
        .collect();
    Ok(Json(Envelope::new(items)))
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<TodoWriteRequest>,
) -> Result<(StatusCode, Json<Envelope<TodoItem>>), ApiFailure> {
    let username = authenticate(&state, &headers).await?;
    if req.title.trim().is_empty() || req.description.trim().is_empty() {
        return Err(validation("both title and description are required"));
    }

    let todo = StoredTodo {
        id: TodoId(Uuid::new_v4().to_string()),
        owner: username,
        title: req.title,
        description: req.description,
    };
    let item = todo.to_item();
    state.todos.write().await.push(todo);
    Ok((StatusCode::CREATED, Json(Envelope::new(item))))
}

async fn get_todo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Envelope<TodoItem>>, ApiFailure> {
    let username = authenticate(&state, &headers).await?;
    let todos = state.todos.read().await;
    todos
        .iter()
        .find(|todo| todo.owner == username && todo.id.0 == id)
        .map(|todo| Json(Envelope::new(todo.to_item())))
        .ok_or_else(|| not_found("todo not found"))
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<TodoWriteRequest>,
) -> Result<Json<Envelope<TodoItem>>, ApiFailure> {
    let username = authenticate(&state, &headers).await?;
    if req.title.trim().is_empty() || req.description.trim().is_empty() {
        return Err(validation("both title and description are required"));
    }

    let mut todos = state.todos.write().await;
    let todo = todos
        .iter_mut()
        .find(|todo| todo.owner == username && todo.id.0 == id)
        .ok_or_else(|| not_found("todo not found"))?;
    todo.title = req.title;
    todo.description = req.description;
    Ok(Json(Envelope::new(todo.to_item())))
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    let username = authenticate(&state, &headers).await?;
    let mut todos = state.todos.write().await;
    let position = todos
        .iter()
        .position(|todo| todo.owner == username && todo.id.0 == id)
        .ok_or_else(|| not_found("todo not found"))?;
    todos.remove(position);
    Ok(StatusCode::NO_CONTENT)
}

async fn profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Envelope<UserProfile>>, ApiFailure> {
    let username = authenticate(&state, &headers).await?;
    let users = state.users.read().await;
    let record = users
        .get(&username)
        .ok_or_else(|| unauthorized("invalid or expired token"))?;
    Ok(Json(Envelope::new(UserProfile {
        username: username.clone(),
        email: record.email.clone(),
        avatar: None,
    })))
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<String, ApiFailure> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| unauthorized("missing bearer token"))?;
    state
        .sessions
        .read()
        .await
        .get(token)
        .cloned()
        .ok_or_else(|| unauthorized("invalid or expired token"))
}

fn unauthorized(message: &str) -> ApiFailure {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiError::new(ErrorCode::Unauthorized, message)),
    )
}

fn validation(message: &str) -> ApiFailure {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::new(ErrorCode::Validation, message)),
    )
}

fn not_found(message: &str) -> ApiFailure {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(ErrorCode::NotFound, message)),
    )
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
