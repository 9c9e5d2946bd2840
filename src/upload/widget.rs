use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, warn};

use super::key::{generate_object_key, percent_of};
use super::state::{SelectedFile, UploadPhase, UploadState};
use super::{DEFAULT_KEY_PREFIX, DEFAULT_TITLE, FAILURE_PREFIX, NO_FILE_MESSAGE};
use crate::backend::{BackendError, ObjectStorage, ProgressCallback, TransferProgress};

pub type SuccessCallback = Box<dyn FnMut(&str) + Send>;
pub type ErrorCallback = Box<dyn FnMut(&BackendError) + Send>;

/// Messages sent from the transfer task back to the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Progress(TransferProgress),
    Completed { key: String },
    Failed { error: BackendError },
}

/// Collects one file and sends it to object storage, one transfer at a time.
///
/// `submit` spawns the transfer on the tokio runtime; its progress and
/// outcome come back as [`UploadEvent`]s that the owner feeds in with
/// [`UploadWidget::poll`] (UI loop) or [`UploadWidget::next_event`].
pub struct UploadWidget {
    title: String,
    key_prefix: String,
    state: UploadState,
    events: Option<mpsc::UnboundedReceiver<UploadEvent>>,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
}

impl Default for UploadWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadWidget {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            state: UploadState::default(),
            events: None,
            on_success: None,
            on_error: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn on_success(mut self, callback: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl FnMut(&BackendError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn phase(&self) -> UploadPhase {
        self.state.phase()
    }

    pub fn is_uploading(&self) -> bool {
        self.state.uploading
    }

    /// Picks the file for the next submit and clears the previous outcome.
    /// Ignored while a transfer is running; returns whether it was taken.
    pub fn select_file(&mut self, file: SelectedFile) -> bool {
        if self.state.uploading {
            debug!("file selection ignored while uploading");
            return false;
        }

        debug!(name = %file.name, size = file.size(), "file selected");
        self.state.selected_file = Some(file);
        self.state.error_message = None;
        self.state.completed_key = None;
        self.state.transferred = None;
        true
    }

    pub fn submit<S>(&mut self, storage: &S) -> Option<String>
    where
        S: ObjectStorage + Clone + Send + Sync + 'static,
    {
        self.submit_at(storage, Utc::now())
    }

    /// Starts a transfer keyed by `now`. Returns the generated key, or `None`
    /// when nothing was started (no file selected, or already uploading).
    pub fn submit_at<S>(&mut self, storage: &S, now: DateTime<Utc>) -> Option<String>
    where
        S: ObjectStorage + Clone + Send + Sync + 'static,
    {
        if self.state.uploading {
            debug!("submit ignored while uploading");
            return None;
        }

        let Some(file) = self.state.selected_file.as_ref() else {
            self.state.error_message = Some(NO_FILE_MESSAGE.to_string());
            return None;
        };

        let key = generate_object_key(&self.key_prefix, now, &file.name);
        let payload = file.data.clone();

        self.state.uploading = true;
        self.state.progress_percent = 0;
        self.state.error_message = None;
        self.state.transferred = None;

        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(rx);

        info!(key = %key, size = payload.len(), "upload started");

        let storage = storage.clone();
        let task_key = key.clone();
        tokio::spawn(async move {
            let progress_tx = tx.clone();
            let progress: ProgressCallback = Box::new(move |p| {
                let _ = progress_tx.send(UploadEvent::Progress(p));
            });

            let outcome = match storage.put(&task_key, payload, progress).await {
                Ok(()) => UploadEvent::Completed { key: task_key },
                Err(error) => UploadEvent::Failed { error },
            };
            let _ = tx.send(outcome);
        });

        Some(key)
    }

    pub fn handle_event(&mut self, event: UploadEvent) {
        match event {
            UploadEvent::Progress(progress) => {
                if !self.state.uploading {
                    return;
                }
                self.state.progress_percent = percent_of(progress.loaded, progress.total);
                self.state.transferred = Some(progress);
            }
            UploadEvent::Completed { key } => {
                info!(key = %key, "upload finished");
                self.events = None;
                self.state.uploading = false;
                self.state.error_message = None;
                self.state.completed_key = Some(key.clone());
                if let Some(callback) = self.on_success.as_mut() {
                    callback(&key);
                }
            }
            UploadEvent::Failed { error } => {
                warn!(error = %error, "upload failed");
                self.events = None;
                self.state.uploading = false;
                self.state.completed_key = None;
                self.state.error_message = Some(format!("{FAILURE_PREFIX}{error}"));
                if let Some(callback) = self.on_error.as_mut() {
                    callback(&error);
                }
            }
        }
    }

    /// Applies every event that has already arrived. Returns whether the
    /// state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            let Some(events) = self.events.as_mut() else {
                return changed;
            };
            match events.try_recv() {
                Ok(event) => {
                    self.handle_event(event);
                    changed = true;
                }
                Err(TryRecvError::Empty) => return changed,
                Err(TryRecvError::Disconnected) => {
                    self.handle_event(UploadEvent::Failed {
                        error: BackendError::Network("upload task ended unexpectedly".to_string()),
                    });
                    return true;
                }
            }
        }
    }

    /// Waits for the next event from the running transfer and applies it.
    pub async fn next_event(&mut self) -> Option<UploadEvent> {
        let event = self.events.as_mut()?.recv().await?;
        self.handle_event(event.clone());
        Some(event)
    }
}
