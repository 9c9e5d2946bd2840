//! The seam between the front-end units and whatever backend serves them.
//!
//! [`TodoModel`] is the typed data client (live query + create) and
//! [`ObjectStorage`] is the key-addressed blob store. [`LocalBackend`] serves
//! both in-process from SQLite, [`HttpBackend`] talks to `cloudtodo serve`,
//! and [`Backend`] picks one at runtime.

pub mod error;
pub mod http;
pub mod local;

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::todo::{CreateTodoInput, Snapshot, TodoItem};

pub use error::BackendError;
pub use http::HttpBackend;
pub use local::LocalBackend;

/// Snapshots buffered per subscription before the forwarder waits.
pub(crate) const SUBSCRIPTION_BUFFER: usize = 16;

/// Bytes transferred so far out of the payload size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub loaded: u64,
    pub total: u64,
}

pub type ProgressCallback = Box<dyn FnMut(TransferProgress) + Send + Sync>;

pub trait TodoModel {
    /// Opens a live query over all todos. The first snapshot is the current
    /// state; another follows every change made by any client.
    fn observe_query(&self) -> impl Future<Output = Result<Subscription, BackendError>> + Send;

    fn create(
        &self,
        input: CreateTodoInput,
    ) -> impl Future<Output = Result<TodoItem, BackendError>> + Send;
}

pub trait ObjectStorage {
    /// Stores `payload` under `key`, overwriting any existing object. The
    /// callback sees cumulative progress; how often it fires is up to the
    /// implementation.
    fn put(
        &self,
        key: &str,
        payload: Vec<u8>,
        progress: ProgressCallback,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// Handle on a live query. Dropping it unsubscribes.
pub struct Subscription {
    snapshots: mpsc::Receiver<Snapshot>,
    forwarder: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Wraps a receiver fed by a task that is stopped when the handle drops.
    pub fn new(snapshots: mpsc::Receiver<Snapshot>, forwarder: JoinHandle<()>) -> Self {
        Self {
            snapshots,
            forwarder: Some(forwarder),
        }
    }

    /// Wraps a receiver whose producer notices the drop through the closed channel.
    pub fn from_receiver(snapshots: mpsc::Receiver<Snapshot>) -> Self {
        Self {
            snapshots,
            forwarder: None,
        }
    }

    pub fn try_next(&mut self) -> Option<Snapshot> {
        self.snapshots.try_recv().ok()
    }

    pub async fn next(&mut self) -> Option<Snapshot> {
        self.snapshots.recv().await
    }

    /// True when nothing is buffered and no more snapshots will arrive.
    pub fn is_finished(&self) -> bool {
        self.snapshots.is_empty() && self.snapshots.is_closed()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.snapshots.close();
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
    }
}

/// Backend chosen at startup: in-process for `--offline`, HTTP otherwise.
#[derive(Clone)]
pub enum Backend {
    Local(LocalBackend),
    Http(HttpBackend),
}

impl Backend {
    pub fn describe(&self) -> String {
        match self {
            Backend::Local(_) => "offline".to_string(),
            Backend::Http(http) => http.base_url().to_string(),
        }
    }
}

impl TodoModel for Backend {
    async fn observe_query(&self) -> Result<Subscription, BackendError> {
        match self {
            Backend::Local(local) => local.observe_query().await,
            Backend::Http(http) => http.observe_query().await,
        }
    }

    async fn create(&self, input: CreateTodoInput) -> Result<TodoItem, BackendError> {
        match self {
            Backend::Local(local) => local.create(input).await,
            Backend::Http(http) => http.create(input).await,
        }
    }
}

impl ObjectStorage for Backend {
    async fn put(
        &self,
        key: &str,
        payload: Vec<u8>,
        progress: ProgressCallback,
    ) -> Result<(), BackendError> {
        match self {
            Backend::Local(local) => local.put(key, payload, progress).await,
            Backend::Http(http) => http.put(key, payload, progress).await,
        }
    }
}
