use std::convert::Infallible;

use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use futures_util::stream;
use tracing::{debug, warn};

use super::models::{
    CreateTodoRequest, ErrorResponse, ObjectListResponse, PutObjectResponse, TodoListResponse,
    encode_snapshot_line,
};
use crate::backend::{BackendError, LocalBackend};

fn error_response(e: BackendError) -> axum::response::Response {
    match e {
        BackendError::NotFound(message) => ErrorResponse::not_found(message),
        other => ErrorResponse::internal(other),
    }
}

pub async fn list_todos(State(backend): State<LocalBackend>) -> impl IntoResponse {
    let response = TodoListResponse::from(backend.snapshot());
    (StatusCode::OK, Json(response))
}

pub async fn create_todo(
    State(backend): State<LocalBackend>,
    Json(req): Json<CreateTodoRequest>,
) -> impl IntoResponse {
    match backend.insert_todo(req.into()) {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Streams the current snapshot, then one more line per change, as NDJSON.
/// The stream lives until the client disconnects.
pub async fn observe_todos(State(backend): State<LocalBackend>) -> impl IntoResponse {
    let updates = backend.watch();
    debug!("observer connected");

    let lines = stream::unfold((updates, true), |(mut updates, first)| async move {
        if !first && updates.changed().await.is_err() {
            return None;
        }
        let snapshot = updates.borrow_and_update().clone();
        let line = encode_snapshot_line(&snapshot).unwrap_or_else(|e| {
            warn!(error = %e, "failed to encode snapshot");
            Vec::new()
        });
        Some((Ok::<_, Infallible>(line), (updates, false)))
    });

    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(lines),
    )
}

pub async fn put_object(
    State(backend): State<LocalBackend>,
    Path(key): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    if key.is_empty() {
        return ErrorResponse::bad_request("Object key must not be empty");
    }

    match backend.store_object(&key, &body) {
        Ok(stored) => (StatusCode::CREATED, Json(PutObjectResponse::from(&stored))).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_object(
    State(backend): State<LocalBackend>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    match backend.get_object(&key) {
        Ok(Some(data)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            data,
        )
            .into_response(),
        Ok(None) => ErrorResponse::not_found(format!("No object with key {key}")),
        Err(e) => error_response(e),
    }
}

pub async fn list_objects(State(backend): State<LocalBackend>) -> impl IntoResponse {
    match backend.list_objects() {
        Ok(objects) => (StatusCode::OK, Json(ObjectListResponse { objects })).into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::super::create_router;
    use super::*;
    use futures_util::StreamExt;
    use pretty_assertions::assert_eq;

    /// Serves a fresh router on an ephemeral port and returns its base URL.
    async fn spawn_server(backend: LocalBackend) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(backend)).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let base = spawn_server(LocalBackend::in_memory().unwrap()).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/api/todos"))
            .json(&CreateTodoRequest {
                content: Some("Buy milk".to_string()),
            })
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let list: TodoListResponse = client
            .get(format!("{base}/api/todos"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].content.as_deref(), Some("Buy milk"));
    }

    #[tokio::test]
    async fn test_put_and_get_object_with_nested_key() {
        let base = spawn_server(LocalBackend::in_memory().unwrap()).await;
        let client = reqwest::Client::new();
        let url = format!("{base}/api/objects/uploads/1700000000000-report.pdf");

        let response = client.put(&url).body("pdf-bytes").send().await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let put: PutObjectResponse = response.json().await.unwrap();
        assert_eq!(put.key, "uploads/1700000000000-report.pdf");
        assert_eq!(put.size, 9);

        let bytes = client.get(&url).send().await.unwrap().bytes().await.unwrap();
        assert_eq!(&bytes[..], b"pdf-bytes");

        let listing: ObjectListResponse = client
            .get(format!("{base}/api/objects"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listing.objects.len(), 1);
        assert_eq!(listing.objects[0].key, "uploads/1700000000000-report.pdf");
    }

    #[tokio::test]
    async fn test_get_missing_object_is_404() {
        let base = spawn_server(LocalBackend::in_memory().unwrap()).await;

        let response = reqwest::get(format!("{base}/api/objects/nope")).await.unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
        let error: ErrorResponse = response.json().await.unwrap();
        assert!(error.error.contains("nope"));
    }

    #[tokio::test]
    async fn test_observe_streams_current_then_changes() {
        let backend = LocalBackend::in_memory().unwrap();
        let base = spawn_server(backend.clone()).await;

        let response = reqwest::get(format!("{base}/api/todos/observe")).await.unwrap();
        assert_eq!(
            response.headers()[reqwest::header::CONTENT_TYPE],
            "application/x-ndjson"
        );
        let mut frames = response.bytes_stream();

        let first = frames.next().await.unwrap().unwrap();
        let first: TodoListResponse = serde_json::from_slice(&first).unwrap();
        assert!(first.items.is_empty());

        backend
            .insert_todo(crate::todo::CreateTodoInput::new(Some("later".to_string())))
            .unwrap();

        let second = frames.next().await.unwrap().unwrap();
        let second: TodoListResponse = serde_json::from_slice(&second).unwrap();
        assert_eq!(second.items.len(), 1);
    }
}
