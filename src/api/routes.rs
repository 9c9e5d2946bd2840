use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::backend::LocalBackend;

/// Largest object accepted by `PUT /api/objects/{*key}`.
pub const MAX_OBJECT_BYTES: usize = 256 * 1024 * 1024;

async fn health_check() -> &'static str {
    "ok"
}

pub fn create_router(backend: LocalBackend) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/api/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route("/api/todos/observe", get(handlers::observe_todos))
        .route("/api/objects", get(handlers::list_objects))
        .route(
            "/api/objects/{*key}",
            get(handlers::get_object).put(handlers::put_object),
        )
        .layer(DefaultBodyLimit::max(MAX_OBJECT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(backend)
}
