use axum::{Json, body::Body, http::StatusCode, response::{IntoResponse, Response}};
use serde::{Deserialize, Serialize};

use crate::storage::StoredObject;
use crate::todo::{CreateTodoInput, Snapshot, TodoItem};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub content: Option<String>,
}

impl From<CreateTodoRequest> for CreateTodoInput {
    fn from(req: CreateTodoRequest) -> Self {
        CreateTodoInput::new(req.content)
    }
}

impl From<&CreateTodoInput> for CreateTodoRequest {
    fn from(input: &CreateTodoInput) -> Self {
        Self {
            content: input.content.clone(),
        }
    }
}

/// Body of `GET /api/todos` and of every line on the observe stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoListResponse {
    pub items: Vec<TodoItem>,
}

impl From<Snapshot> for TodoListResponse {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            items: snapshot.items,
        }
    }
}

impl From<TodoListResponse> for Snapshot {
    fn from(response: TodoListResponse) -> Self {
        Snapshot::new(response.items)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutObjectResponse {
    pub key: String,
    pub size: u64,
}

impl From<&StoredObject> for PutObjectResponse {
    fn from(stored: &StoredObject) -> Self {
        Self {
            key: stored.key.clone(),
            size: stored.size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectListResponse {
    pub objects: Vec<StoredObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    pub fn internal(e: impl std::fmt::Display) -> Response<Body> {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(Self::new(e.to_string()))).into_response()
    }

    pub fn not_found(message: impl Into<String>) -> Response<Body> {
        (StatusCode::NOT_FOUND, Json(Self::new(message))).into_response()
    }

    pub fn bad_request(message: impl Into<String>) -> Response<Body> {
        (StatusCode::BAD_REQUEST, Json(Self::new(message))).into_response()
    }
}

/// One NDJSON line of the observe stream.
pub fn encode_snapshot_line(snapshot: &Snapshot) -> serde_json::Result<Vec<u8>> {
    let mut line = serde_json::to_vec(&TodoListResponse {
        items: snapshot.items.clone(),
    })?;
    line.push(b'\n');
    Ok(line)
}
