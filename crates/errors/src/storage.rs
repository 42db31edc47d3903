//! Artifact store and local file errors

use std::borrow::Cow;
use std::io::ErrorKind as IoKind;
use std::path::Path;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("no space left for artifacts under {path}")]
    StoreFull { path: String },

    #[error("access denied to {path}")]
    AccessDenied { path: String },

    #[error("nothing stored at {path}")]
    Missing { path: String },

    #[error("{path} already exists")]
    Exists { path: String },

    #[error("store I/O failed: {message}")]
    Io { message: String },

    #[error("unusable digest: {message}")]
    BadDigest { message: String },

    #[error("store key {key:?} is empty or leaves the store root")]
    InvalidKey { key: String },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

impl StorageError {
    /// Classify an I/O failure on `path`
    #[must_use]
    pub fn at_path(err: &std::io::Error, path: &Path) -> Self {
        let path_text = path.display().to_string();
        match err.kind() {
            IoKind::NotFound => Self::Missing { path: path_text },
            IoKind::PermissionDenied => Self::AccessDenied { path: path_text },
            IoKind::AlreadyExists => Self::Exists { path: path_text },
            IoKind::StorageFull => Self::StoreFull { path: path_text },
            _ => Self::Io {
                message: format!("{path_text}: {err}"),
            },
        }
    }
}

impl UserFacingError for StorageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::StoreFull { .. } => Some("Free up space under sync.store_path and retry."),
            Self::AccessDenied { .. } => Some("Make sync.store_path writable by the current user."),
            Self::Missing { .. } => Some("Check the manifest key printed by `provmirror fetch`."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::StoreFull { .. } => "storage.full",
            Self::AccessDenied { .. } => "storage.access_denied",
            Self::Missing { .. } => "storage.missing",
            Self::Exists { .. } => "storage.exists",
            Self::Io { .. } => "storage.io",
            Self::BadDigest { .. } => "storage.bad_digest",
            Self::InvalidKey { .. } => "storage.invalid_key",
        };
        Some(code)
    }
}
