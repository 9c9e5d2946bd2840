use anyhow::{Context, Result, anyhow};
use std::fmt;
use std::path::Path;

use crate::backend::TransferProgress;

/// A file picked for upload: its original name and contents.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .ok_or_else(|| anyhow!("{} is not a file", path.display()))?
            .to_string_lossy()
            .into_owned();
        let data = std::fs::read(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Ok(Self { name, data })
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("size", &self.data.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Ready,
    Uploading,
    Succeeded,
    Failed,
}

impl fmt::Display for UploadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadPhase::Idle => write!(f, "IDLE"),
            UploadPhase::Ready => write!(f, "READY"),
            UploadPhase::Uploading => write!(f, "UPLOADING"),
            UploadPhase::Succeeded => write!(f, "DONE"),
            UploadPhase::Failed => write!(f, "FAILED"),
        }
    }
}

/// Form state of one upload widget. `progress_percent` only means anything
/// while `uploading` is set; after an attempt resolves at most one of
/// `error_message` and `completed_key` is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadState {
    pub selected_file: Option<SelectedFile>,
    pub uploading: bool,
    pub progress_percent: u8,
    pub error_message: Option<String>,
    pub completed_key: Option<String>,
    /// Last raw byte counts reported by storage
    pub transferred: Option<TransferProgress>,
}

impl UploadState {
    pub fn phase(&self) -> UploadPhase {
        if self.uploading {
            UploadPhase::Uploading
        } else if self.completed_key.is_some() {
            UploadPhase::Succeeded
        } else if self.selected_file.is_none() {
            UploadPhase::Idle
        } else if self.error_message.is_some() {
            UploadPhase::Failed
        } else {
            UploadPhase::Ready
        }
    }

    /// Mirrors the submit control: enabled with a file and no transfer running.
    pub fn can_submit(&self) -> bool {
        self.selected_file.is_some() && !self.uploading
    }
}
