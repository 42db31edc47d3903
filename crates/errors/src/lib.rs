#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for provmirror
//!
//! This crate provides fine-grained error types organized by domain.
//! Every domain error collapses into one of the coarse [`ErrorKind`]s that
//! drive control flow: `NotFound` and `Conflict` from the registries,
//! `Transport` for network faults, `Validation` for bad input, and
//! `Internal` for local failures.

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod network;
pub mod ops;
pub mod registry;
pub mod storage;
pub mod structured;

pub use config::ConfigError;
pub use network::NetworkError;
pub use ops::OpsError;
pub use registry::RegistryError;
pub use storage::StorageError;
pub use structured::{ErrorContext, Stage};

/// Coarse classification of every error the engine can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The resource is absent
    NotFound,
    /// A resource already exists where it was created unconditionally
    Conflict,
    /// Network failure, timeout or unexpected remote status
    Transport,
    /// Malformed or missing input, detected before any remote call
    Validation,
    /// Local I/O or serialization failure
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Transport => "transport",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }
}

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("ops error: {0}")]
    Ops(#[from] OpsError),

    #[error("{stage} failed [{context}]: {source}")]
    Stage {
        stage: Stage,
        context: ErrorContext,
        #[source]
        source: Box<Error>,
    },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Attach the failing stage and the identifying tuple.
    ///
    /// An error that already carries a stage keeps its innermost stage; only
    /// missing context fields are filled in from `context`.
    #[must_use]
    pub fn in_stage(self, stage: Stage, context: ErrorContext) -> Self {
        match self {
            Self::Stage {
                stage: inner,
                context: existing,
                source,
            } => Self::Stage {
                stage: inner,
                context: existing.merge(context),
                source,
            },
            other => Self::Stage {
                stage,
                context,
                source: Box::new(other),
            },
        }
    }

    /// Classify the error into the engine's taxonomy
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Transport,
            Self::Registry(err) => err.kind(),
            Self::Config(_) => ErrorKind::Validation,
            Self::Ops(err) => err.kind(),
            Self::Stage { source, .. } => source.kind(),
            Self::Storage(_) | Self::Internal(_) | Self::Io { .. } => ErrorKind::Internal,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// The stage this error was attributed to, if any
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The identifying tuple attached to this error, if any
    #[must_use]
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Stage { context, .. } => Some(context),
            _ => None,
        }
    }

    /// The innermost error with stage wrappers removed
    #[must_use]
    pub fn root(&self) -> &Error {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Response body returned by the remote, when the failure carried one
    #[must_use]
    pub fn remote_body(&self) -> Option<&str> {
        match self.root() {
            Self::Network(NetworkError::HttpError { body, .. })
            | Self::Registry(RegistryError::Conflict { body, .. }) => {
                body.as_deref().filter(|b| !b.is_empty())
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

/// Result type alias for provmirror operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for analytics / structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Network(err) => err.user_message(),
            Error::Registry(err) => err.user_message(),
            Error::Ops(err) => err.user_message(),
            Error::Stage { source, .. } => source.user_message(),
            Error::Io { message, .. } => Cow::Owned(message.clone()),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Network(err) => err.user_hint(),
            Error::Registry(err) => err.user_hint(),
            Error::Storage(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            Error::Ops(err) => err.user_hint(),
            Error::Stage { source, .. } => source.user_hint(),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(err) => err.is_retryable(),
            Error::Registry(err) => err.is_retryable(),
            Error::Storage(err) => err.is_retryable(),
            Error::Stage { source, .. } => source.is_retryable(),
            Error::Io { .. } => true,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Network(err) => err.user_code(),
            Error::Registry(err) => err.user_code(),
            Error::Storage(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::Ops(err) => err.user_code(),
            Error::Stage { source, .. } => source.user_code(),
            Error::Internal(_) => Some("error.internal"),
            Error::Io { .. } => Some("error.io"),
        }
    }
}
