use thiserror::Error;

/// Failure crossing the backend seam.
///
/// `Display` is the bare message so UI code can prefix it with its own
/// context ("Upload failed: ...").
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("{0}")]
    Storage(String),
    #[error("{0}")]
    Decode(String),
    #[error("{0}")]
    InvalidKey(String),
}

impl BackendError {
    /// Maps a non-success HTTP status and the server's message to a variant.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::PermissionDenied(message),
            404 => Self::NotFound(message),
            _ => Self::Rejected { status, message },
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        match err.status() {
            Some(status) => Self::from_status(status.as_u16(), err.to_string()),
            None => Self::Network(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_bare_message() {
        let err = BackendError::Network("network timeout".to_string());
        assert_eq!(err.to_string(), "network timeout");
        assert_eq!(format!("Upload failed: {err}"), "Upload failed: network timeout");
    }

    #[test]
    fn test_from_status() {
        assert_eq!(
            BackendError::from_status(403, "denied"),
            BackendError::PermissionDenied("denied".to_string())
        );
        assert_eq!(
            BackendError::from_status(404, "missing"),
            BackendError::NotFound("missing".to_string())
        );
        assert_eq!(
            BackendError::from_status(413, "too large"),
            BackendError::Rejected {
                status: 413,
                message: "too large".to_string()
            }
        );
    }
}
