//! Registry protocol error types

use std::borrow::Cow;

use crate::{ErrorKind, UserFacingError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("not found: {resource}")]
    NotFound { resource: String },

    #[error("already exists: {resource}")]
    Conflict {
        resource: String,
        body: Option<String>,
    },

    #[error("invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },
}

impl RegistryError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::InvalidResponse { .. } => ErrorKind::Transport,
        }
    }
}

impl UserFacingError for RegistryError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("Check the provider name, namespace, version and platform list.")
            }
            Self::Conflict { .. } => Some(
                "The version already exists in the private registry. Delete it there before re-publishing.",
            ),
            Self::InvalidResponse { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "registry.not_found",
            Self::Conflict { .. } => "registry.conflict",
            Self::InvalidResponse { .. } => "registry.invalid_response",
        };
        Some(code)
    }
}
