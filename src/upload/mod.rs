//! Single-file upload widget: form state, key generation and the transfer task.

pub mod key;
pub mod state;
pub mod widget;

pub use key::{generate_object_key, percent_of};
pub use state::{SelectedFile, UploadPhase, UploadState};
pub use widget::{UploadEvent, UploadWidget};

pub const DEFAULT_KEY_PREFIX: &str = "uploads/";
pub const DEFAULT_TITLE: &str = "File Upload";
pub const NO_FILE_MESSAGE: &str = "Please select a file first";
pub const FAILURE_PREFIX: &str = "Upload failed: ";
