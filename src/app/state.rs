use super::mode::{Mode, Tab};
use crate::ui::theme::Theme;
use cloud_todo::backend::{Backend, BackendError};
use cloud_todo::config::Config;
use cloud_todo::todo::{TodoItem, TodoView};
use cloud_todo::upload::{SelectedFile, UploadWidget};
use cloud_todo::utils::input::InputBuffer;
use ratatui::widgets::ListState;
use std::path::Path;
use std::sync::mpsc;
use std::time::Instant;
use tokio::runtime::Handle;
use tracing::{info, warn};

/// How long a status-bar message stays visible
const STATUS_MESSAGE_SECS: u64 = 3;

pub struct AppState {
    pub mode: Mode,
    pub tab: Tab,
    pub theme: Theme,
    pub todo_view: TodoView,
    pub upload: UploadWidget,
    pub backend: Backend,
    pub input: InputBuffer,
    pub cursor_position: usize,
    pub list_state: ListState,
    pub status_message: Option<(String, Instant)>,
    pub should_quit: bool,
    /// Creates sent but not yet answered
    pub pending_creates: usize,
    runtime: Handle,
    create_tx: mpsc::Sender<Result<TodoItem, BackendError>>,
    create_rx: mpsc::Receiver<Result<TodoItem, BackendError>>,
    /// Messages from the upload widget's callbacks
    upload_notice_rx: mpsc::Receiver<String>,
}

impl AppState {
    pub fn new(backend: Backend, runtime: Handle, theme: Theme, config: &Config) -> Self {
        let (create_tx, create_rx) = mpsc::channel();
        let (notice_tx, upload_notice_rx) = mpsc::channel();
        let error_tx = notice_tx.clone();

        let upload = UploadWidget::new()
            .with_title(config.upload_title.clone())
            .with_key_prefix(config.upload_prefix.clone())
            .on_success(move |key| {
                let _ = notice_tx.send(format!("Uploaded {key}"));
            })
            .on_error(move |e| {
                let _ = error_tx.send(format!("Upload failed: {e}"));
            });

        Self {
            mode: Mode::Navigate,
            tab: Tab::Todos,
            theme,
            todo_view: TodoView::new(),
            upload,
            backend,
            input: InputBuffer::new(),
            cursor_position: 0,
            list_state: ListState::default(),
            status_message: None,
            should_quit: false,
            pending_creates: 0,
            runtime,
            create_tx,
            create_rx,
            upload_notice_rx,
        }
    }

    /// Opens the live query. Must run inside the runtime.
    pub async fn mount(&mut self) -> Result<(), BackendError> {
        self.todo_view.mount(&self.backend).await
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    pub fn clear_expired_status_message(&mut self) {
        if let Some((_, time)) = &self.status_message
            && time.elapsed().as_secs() > STATUS_MESSAGE_SECS
        {
            self.status_message = None;
        }
    }

    pub fn items(&self) -> &[TodoItem] {
        self.todo_view.items()
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor_position + 1 < self.items().len() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_up(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.mode = Mode::Navigate;
    }

    pub fn open_todo_prompt(&mut self) {
        self.input.clear();
        self.mode = Mode::TodoPrompt;
    }

    pub fn open_file_prompt(&mut self) {
        if self.upload.is_uploading() {
            self.set_status_message("Wait for the current upload to finish".to_string());
            return;
        }
        self.input.clear();
        self.mode = Mode::FilePath;
    }

    /// Sends a create request in the background; `None` means the prompt
    /// was cancelled. The list only changes when the next snapshot arrives.
    pub fn submit_todo(&mut self, content: Option<String>) {
        let request = self.todo_view.create(&self.backend, content);
        let tx = self.create_tx.clone();
        self.pending_creates += 1;
        self.runtime.spawn(async move {
            let _ = tx.send(request.await);
        });
    }

    pub fn select_file_path(&mut self, path: &Path) {
        match SelectedFile::from_path(path) {
            Ok(file) => {
                let name = file.name.clone();
                if self.upload.select_file(file) {
                    info!(name = %name, "file chosen for upload");
                    self.set_status_message(format!("Selected {name}"));
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read file");
                self.set_status_message(format!("{e:#}"));
            }
        }
    }

    pub fn submit_upload(&mut self) {
        let started = {
            // The transfer task is spawned onto our runtime.
            let _runtime = self.runtime.enter();
            self.upload.submit(&self.backend)
        };
        if let Some(key) = started {
            self.set_status_message(format!("Uploading {key}"));
        }
    }

    /// Applies everything that arrived since the last frame.
    pub fn tick(&mut self) {
        self.todo_view.poll();
        self.upload.poll();

        while let Ok(result) = self.create_rx.try_recv() {
            self.pending_creates = self.pending_creates.saturating_sub(1);
            match result {
                Ok(_) => self.set_status_message("Todo created".to_string()),
                Err(e) => self.set_status_message(format!("Could not create todo: {e}")),
            }
        }

        while let Ok(notice) = self.upload_notice_rx.try_recv() {
            self.set_status_message(notice);
        }

        let len = self.items().len();
        if self.cursor_position >= len {
            self.cursor_position = len.saturating_sub(1);
        }

        self.clear_expired_status_message();
    }
}
