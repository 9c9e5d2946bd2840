//! End-to-end checks: the axum router on an ephemeral port, driven through
//! `HttpBackend` the same way the TUI drives it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use cloud_todo::api::create_router;
use cloud_todo::backend::{
    BackendError, HttpBackend, LocalBackend, ObjectStorage, TodoModel, TransferProgress,
};
use cloud_todo::todo::{CreateTodoInput, TodoView};
use cloud_todo::upload::{SelectedFile, UploadPhase, UploadWidget};
use pretty_assertions::assert_eq;

async fn spawn_server(backend: LocalBackend) -> HttpBackend {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_router(backend)).await.unwrap();
    });
    HttpBackend::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn created_todo_appears_in_live_query() {
    let http = spawn_server(LocalBackend::in_memory().unwrap()).await;
    assert!(http.health().await);

    let mut view = TodoView::new();
    view.mount(&http).await.unwrap();
    assert!(view.next_snapshot().await.unwrap().is_empty());

    let created = view
        .create(&http, Some("Buy milk".to_string()))
        .await
        .unwrap();
    assert!(view.items().is_empty());

    let items = view.next_snapshot().await.unwrap().to_vec();
    assert_eq!(items, vec![created]);
}

#[tokio::test]
async fn writes_from_another_client_reach_the_view() {
    let local = LocalBackend::in_memory().unwrap();
    let http = spawn_server(local.clone()).await;

    let mut view = TodoView::new();
    view.mount(&http).await.unwrap();
    view.next_snapshot().await.unwrap();

    local
        .create(CreateTodoInput::new(Some("from elsewhere".to_string())))
        .await
        .unwrap();

    let items = view.next_snapshot().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].display_content(), "from elsewhere");
}

#[tokio::test]
async fn put_reports_progress_up_to_total_and_stores_exact_key() {
    let local = LocalBackend::in_memory().unwrap();
    let http = spawn_server(local.clone()).await;
    let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let seen: Arc<Mutex<Vec<TransferProgress>>> = Arc::default();
    let sink = Arc::clone(&seen);

    http.put(
        "uploads/1718000000000-big report.bin",
        payload.clone(),
        Box::new(move |p| sink.lock().unwrap().push(p)),
    )
    .await
    .unwrap();

    let seen = seen.lock().unwrap();
    assert!(seen.len() > 1);
    assert!(seen.windows(2).all(|w| w[0].loaded <= w[1].loaded));
    assert_eq!(
        seen.last().copied(),
        Some(TransferProgress {
            loaded: payload.len() as u64,
            total: payload.len() as u64
        })
    );
    assert_eq!(
        local.get_object("uploads/1718000000000-big report.bin").unwrap(),
        Some(payload)
    );
}

#[tokio::test]
async fn upload_widget_over_http() {
    let local = LocalBackend::in_memory().unwrap();
    let http = spawn_server(local.clone()).await;
    let mut widget = UploadWidget::new();
    widget.select_file(SelectedFile::new("report.pdf", b"%PDF-1.7".to_vec()));

    let key = widget.submit(&http).unwrap();
    while widget.next_event().await.is_some() {}

    assert_eq!(widget.phase(), UploadPhase::Succeeded);
    assert_eq!(widget.state().completed_key.as_deref(), Some(key.as_str()));
    assert_eq!(local.get_object(&key).unwrap(), Some(b"%PDF-1.7".to_vec()));
}

#[tokio::test]
async fn empty_key_is_rejected() {
    let http = spawn_server(LocalBackend::in_memory().unwrap()).await;

    let err = http
        .put("", b"x".to_vec(), Box::new(|_| {}))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BackendError::Rejected { .. } | BackendError::NotFound(_)
    ));
}

#[tokio::test]
async fn dot_segments_in_prefix_keep_the_reported_key() {
    let local = LocalBackend::in_memory().unwrap();
    let http = spawn_server(local.clone()).await;
    let mut widget = UploadWidget::new().with_key_prefix("docs/./");
    widget.select_file(SelectedFile::new("a.txt", b"abc".to_vec()));

    let key = widget.submit(&http).unwrap();
    while widget.next_event().await.is_some() {}

    assert!(key.starts_with("docs/./"));
    assert_eq!(widget.state().completed_key.as_deref(), Some(key.as_str()));
    assert_eq!(local.get_object(&key).unwrap(), Some(b"abc".to_vec()));
    let keys: Vec<String> = local.list_objects().unwrap().into_iter().map(|o| o.key).collect();
    assert_eq!(keys, vec![key]);
}
