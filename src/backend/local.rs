use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use super::{
    BackendError, ObjectStorage, ProgressCallback, Subscription, SUBSCRIPTION_BUFFER, TodoModel,
    TransferProgress,
};
use crate::storage::{Database, StoredObject};
use crate::todo::{CreateTodoInput, Snapshot, TodoItem};

/// Chunk size used to report progress while copying a payload into the store.
const CHUNK_SIZE: usize = 64 * 1024;

/// In-process backend over SQLite. Every write publishes a fresh snapshot to
/// all live queries.
#[derive(Clone)]
pub struct LocalBackend {
    inner: Arc<Inner>,
}

struct Inner {
    db: Mutex<Database>,
    snapshots: watch::Sender<Snapshot>,
}

impl LocalBackend {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let db = Database::open(path)?;
        info!(path = %path.display(), "local backend opened");
        Self::from_database(db)
    }

    pub fn in_memory() -> anyhow::Result<Self> {
        Self::from_database(Database::open_in_memory()?)
    }

    fn from_database(db: Database) -> anyhow::Result<Self> {
        let initial = Snapshot::new(db.load_todos()?);
        let (snapshots, _) = watch::channel(initial);
        Ok(Self {
            inner: Arc::new(Inner {
                db: Mutex::new(db),
                snapshots,
            }),
        })
    }

    fn db(&self) -> Result<MutexGuard<'_, Database>, BackendError> {
        self.inner
            .db
            .lock()
            .map_err(|_| BackendError::Storage("database lock poisoned".to_string()))
    }

    pub fn snapshot(&self) -> Snapshot {
        self.inner.snapshots.borrow().clone()
    }

    /// Receiver that always holds the latest snapshot, for streaming it out.
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.inner.snapshots.subscribe()
    }

    pub fn insert_todo(&self, input: CreateTodoInput) -> Result<TodoItem, BackendError> {
        let item = TodoItem::new(input.content);
        let db = self.db()?;
        db.insert_todo(&item)?;
        let items = db.load_todos()?;

        // Hand back the row as stored, so it compares equal to snapshot items.
        let stored = items
            .iter()
            .find(|stored| stored.id == item.id)
            .cloned()
            .unwrap_or(item);

        debug!(id = %stored.id, total = items.len(), "todo inserted");
        // Published under the lock so snapshots go out in write order.
        self.inner.snapshots.send_replace(Snapshot::new(items));
        drop(db);
        Ok(stored)
    }

    pub fn store_object(&self, key: &str, data: &[u8]) -> Result<StoredObject, BackendError> {
        let stored = self.db()?.put_object(key, data)?;
        info!(key = %stored.key, size = stored.size, "object stored");
        Ok(stored)
    }

    pub fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.db()?.get_object(key)?)
    }

    pub fn list_objects(&self) -> Result<Vec<StoredObject>, BackendError> {
        Ok(self.db()?.list_objects()?)
    }
}

impl TodoModel for LocalBackend {
    async fn observe_query(&self) -> Result<Subscription, BackendError> {
        let mut updates = self.watch();
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);

        let forwarder = tokio::spawn(async move {
            loop {
                let snapshot = updates.borrow_and_update().clone();
                if tx.send(snapshot).await.is_err() {
                    break;
                }
                if updates.changed().await.is_err() {
                    break;
                }
            }
            debug!("local subscription forwarder stopped");
        });

        Ok(Subscription::new(rx, forwarder))
    }

    async fn create(&self, input: CreateTodoInput) -> Result<TodoItem, BackendError> {
        self.insert_todo(input)
    }
}

impl ObjectStorage for LocalBackend {
    async fn put(
        &self,
        key: &str,
        payload: Vec<u8>,
        mut progress: ProgressCallback,
    ) -> Result<(), BackendError> {
        let total = payload.len() as u64;
        let mut loaded = 0;

        if payload.is_empty() {
            progress(TransferProgress { loaded, total });
        }
        for chunk in payload.chunks(CHUNK_SIZE) {
            loaded += chunk.len() as u64;
            progress(TransferProgress { loaded, total });
            tokio::task::yield_now().await;
        }

        self.store_object(key, &payload)?;
        Ok(())
    }
}
