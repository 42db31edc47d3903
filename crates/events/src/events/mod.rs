use serde::{Deserialize, Serialize};

use crate::{EventLevel, EventSource};
use provmirror_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod general;
pub mod retention;
pub mod sync;

pub use general::GeneralEvent;
pub use retention::RetentionEvent;
pub use sync::SyncEvent;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Warnings, errors and debug notes not tied to a run stage
    General(GeneralEvent),

    /// Fetch and publish of provider versions
    Sync(SyncEvent),

    /// Pruning of old provider versions
    Retention(RetentionEvent),
}

impl AppEvent {
    /// Identify the source domain for this event.
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::General,
            Self::Sync(_) => EventSource::Sync,
            Self::Retention(_) => EventSource::Retention,
        }
    }

    /// Determine the appropriate log level for this event
    #[must_use]
    pub fn log_level(&self) -> EventLevel {
        match self {
            Self::General(GeneralEvent::Error { .. })
            | Self::Sync(SyncEvent::Failed { .. })
            | Self::Retention(RetentionEvent::DeleteFailed { .. }) => EventLevel::Error,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Retention(RetentionEvent::UnparseableVersion { .. }) => EventLevel::Warn,

            Self::General(GeneralEvent::Debug { .. })
            | Self::Sync(SyncEvent::ArtifactStored { .. } | SyncEvent::ArtifactUploaded { .. }) => {
                EventLevel::Debug
            }

            _ => EventLevel::Info,
        }
    }

    /// Get the log target for this event
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "provmirror::events::general",
            Self::Sync(_) => "provmirror::events::sync",
            Self::Retention(_) => "provmirror::events::retention",
        }
    }
}
