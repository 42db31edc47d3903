//! Operation orchestration error types

use std::borrow::Cow;

use crate::{ErrorKind, UserFacingError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum OpsError {
    #[error("version of {provider} is still \"latest\"; resolve it before syncing")]
    UnresolvedVersion { provider: String },

    #[error("no platforms requested for {provider}")]
    NoPlatforms { provider: String },

    #[error("manifest for {provider} is incomplete: {message}")]
    IncompleteManifest { provider: String, message: String },

    #[error("no signing key id configured for {provider}")]
    MissingSigningKey { provider: String },

    #[error("could not export key {key_id} from the local keyring: {message}")]
    KeyExportFailed { key_id: String, message: String },

    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

impl OpsError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SerializationError { .. } => ErrorKind::Internal,
            _ => ErrorKind::Validation,
        }
    }
}

impl UserFacingError for OpsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingSigningKey { .. } => {
                Some("Add \"gpg-key-id\" to the provider entry of the sync document.")
            }
            Self::KeyExportFailed { .. } => {
                Some("Make sure the key is imported (gpg --import key.asc) or pass --file.")
            }
            Self::NoPlatforms { .. } => Some("List at least one {os, arch} pair under platforms."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::UnresolvedVersion { .. } => "ops.unresolved_version",
            Self::NoPlatforms { .. } => "ops.no_platforms",
            Self::IncompleteManifest { .. } => "ops.incomplete_manifest",
            Self::MissingSigningKey { .. } => "ops.missing_signing_key",
            Self::KeyExportFailed { .. } => "ops.key_export_failed",
            Self::SerializationError { .. } => "ops.serialization_error",
        };
        Some(code)
    }
}
