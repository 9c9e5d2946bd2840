use std::future::Future;

use tracing::{debug, info, warn};

use super::{CreateTodoInput, Snapshot, TodoItem};
use crate::backend::{BackendError, Subscription, TodoModel};

/// Read replica of the todo collection.
///
/// The list is only ever replaced wholesale by the newest snapshot from the
/// live query; `create` never touches it. Dropping the view (or calling
/// [`TodoView::unmount`]) releases the subscription.
#[derive(Default)]
pub struct TodoView {
    items: Vec<TodoItem>,
    subscription: Option<Subscription>,
    snapshots_seen: u64,
}

impl TodoView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// True once the backend has stopped delivering snapshots.
    pub fn is_disconnected(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(Subscription::is_finished)
    }

    pub fn snapshots_seen(&self) -> u64 {
        self.snapshots_seen
    }

    /// Opens the live query. A previous subscription, if any, is released first.
    pub async fn mount<M: TodoModel>(&mut self, model: &M) -> Result<(), BackendError> {
        self.unmount();
        let subscription = model.observe_query().await?;
        info!("todo view subscribed to live query");
        self.subscription = Some(subscription);
        Ok(())
    }

    pub fn unmount(&mut self) {
        if self.subscription.take().is_some() {
            info!("todo view unsubscribed from live query");
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        debug!(items = snapshot.items.len(), "applying snapshot");
        self.items = snapshot.items;
        self.snapshots_seen += 1;
    }

    /// Drains every snapshot that is already waiting and applies the newest.
    /// Returns whether the list changed.
    pub fn poll(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };

        let mut latest = None;
        while let Some(snapshot) = subscription.try_next() {
            latest = Some(snapshot);
        }

        match latest {
            Some(snapshot) => {
                self.apply_snapshot(snapshot);
                true
            }
            None => false,
        }
    }

    /// Waits for the next snapshot and applies it. `None` when unmounted or
    /// when the subscription has ended.
    pub async fn next_snapshot(&mut self) -> Option<&[TodoItem]> {
        let snapshot = self.subscription.as_mut()?.next().await?;
        self.apply_snapshot(snapshot);
        Some(&self.items)
    }

    /// Submits a create request. The new item shows up only through a later
    /// snapshot, so the caller decides what to do with the returned result.
    ///
    /// The returned future owns a clone of `model`, so it can be spawned
    /// while the view keeps rendering.
    pub fn create<M>(
        &self,
        model: &M,
        content: Option<String>,
    ) -> impl Future<Output = Result<TodoItem, BackendError>> + Send + use<M>
    where
        M: TodoModel + Clone + Send + Sync + 'static,
    {
        let model = model.clone();
        async move {
            let result = model.create(CreateTodoInput::new(content)).await;
            match &result {
                Ok(item) => debug!(id = %item.id, "todo created"),
                Err(e) => warn!(error = %e, "todo create failed"),
            }
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Subscription;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    /// Model whose snapshots are pushed by the test and whose creates are recorded.
    #[derive(Clone, Default)]
    struct ScriptedModel {
        feed: Arc<Mutex<Option<mpsc::Sender<Snapshot>>>>,
        created: Arc<Mutex<Vec<CreateTodoInput>>>,
        fail_creates: bool,
    }

    impl ScriptedModel {
        async fn push(&self, snapshot: Snapshot) {
            let tx = self.feed.lock().unwrap().clone().expect("not subscribed");
            tx.send(snapshot).await.unwrap();
        }
    }

    impl TodoModel for ScriptedModel {
        async fn observe_query(&self) -> Result<Subscription, BackendError> {
            let (tx, rx) = mpsc::channel(8);
            *self.feed.lock().unwrap() = Some(tx);
            Ok(Subscription::from_receiver(rx))
        }

        async fn create(&self, input: CreateTodoInput) -> Result<TodoItem, BackendError> {
            self.created.lock().unwrap().push(input.clone());
            if self.fail_creates {
                return Err(BackendError::Network("connection refused".to_string()));
            }
            Ok(TodoItem::new(input.content))
        }
    }

    fn item(content: &str) -> TodoItem {
        TodoItem::new(Some(content.to_string()))
    }

    #[tokio::test]
    async fn test_list_tracks_latest_snapshot_exactly() {
        let model = ScriptedModel::default();
        let mut view = TodoView::new();
        view.mount(&model).await.unwrap();

        let a = item("a");
        let b = item("b");
        let c = item("c");

        let sequence = vec![
            Snapshot::new(vec![a.clone()]),
            Snapshot::new(vec![b.clone(), a.clone()]),
            Snapshot::new(vec![]),
            Snapshot::new(vec![c.clone(), a.clone(), b.clone()]),
        ];

        for snapshot in sequence {
            model.push(snapshot.clone()).await;
            let items = view.next_snapshot().await.unwrap().to_vec();
            assert_eq!(items, snapshot.items);
        }
        assert_eq!(view.snapshots_seen(), 4);
    }

    #[tokio::test]
    async fn test_poll_keeps_only_newest_pending_snapshot() {
        let model = ScriptedModel::default();
        let mut view = TodoView::new();
        view.mount(&model).await.unwrap();

        let newest = Snapshot::new(vec![item("x"), item("y")]);
        model.push(Snapshot::new(vec![item("stale")])).await;
        model.push(newest.clone()).await;

        assert!(view.poll());
        assert_eq!(view.items(), newest.items.as_slice());
        assert!(!view.poll());
    }

    #[tokio::test]
    async fn test_create_sends_one_request_without_touching_list() {
        let model = ScriptedModel::default();
        let mut view = TodoView::new();
        view.mount(&model).await.unwrap();
        model.push(Snapshot::new(vec![item("existing")])).await;
        view.next_snapshot().await.unwrap();
        let before = view.items().to_vec();

        let created = view
            .create(&model, Some("Buy milk".to_string()))
            .await
            .unwrap();

        assert_eq!(created.content.as_deref(), Some("Buy milk"));
        assert_eq!(
            *model.created.lock().unwrap(),
            vec![CreateTodoInput::new(Some("Buy milk".to_string()))]
        );
        assert_eq!(view.items(), before.as_slice());

        model
            .push(Snapshot::new(vec![before[0].clone(), created.clone()]))
            .await;
        view.next_snapshot().await.unwrap();
        assert_eq!(view.items().len(), 2);
        assert_eq!(view.items()[1], created);
    }

    #[tokio::test]
    async fn test_create_with_cancelled_prompt_sends_none() {
        let model = ScriptedModel::default();
        let view = TodoView::new();

        view.create(&model, None).await.unwrap();

        assert_eq!(*model.created.lock().unwrap(), vec![CreateTodoInput::new(None)]);
    }

    #[tokio::test]
    async fn test_create_failure_is_returned() {
        let model = ScriptedModel {
            fail_creates: true,
            ..Default::default()
        };
        let view = TodoView::new();

        let err = view.create(&model, Some("x".to_string())).await.unwrap_err();

        assert_eq!(err, BackendError::Network("connection refused".to_string()));
        assert!(view.items().is_empty());
    }

    #[tokio::test]
    async fn test_unmount_releases_subscription() {
        let model = ScriptedModel::default();
        let mut view = TodoView::new();
        view.mount(&model).await.unwrap();
        assert!(view.is_mounted());

        view.unmount();

        assert!(!view.is_mounted());
        let tx = model.feed.lock().unwrap().clone().unwrap();
        assert!(tx.is_closed());
        assert!(view.next_snapshot().await.is_none());
    }
}
