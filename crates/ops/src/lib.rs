#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Operations orchestration for provmirror
//!
//! This crate sits between the CLI and the registry, store and config
//! crates. It fetches provider releases from the source registry into an
//! artifact store, publishes them to the private registry, prunes old
//! versions, and manages the organization's GPG keys. Every operation
//! reports progress through the event channel of its [`OpsCtx`].

mod context;
mod fetcher;
pub mod keys;
mod pipeline;
mod publisher;
mod report;
pub mod retention;
mod types;

pub use context::{OpsContextBuilder, OpsCtx};
pub use fetcher::fetch;
pub use keys::{create_key, fetch_signing_keys, save_signing_keys, update_key, KeySource};
pub use pipeline::{
    check_version, fetch_to_store, publish_from_store, resolve_version, run, sync_all,
};
pub use publisher::publish;
pub use report::failure_report;
pub use retention::{cleanup_all, cleanup_provider};
pub use types::{
    CleanupSummary, ProviderCleanup, RetentionOutcome, SyncEntryReport, SyncReport, SyncStatus,
    VersionCheck,
};

use provmirror_errors::{Error, OpsError};
use provmirror_registry::{GpgKeyRecord, GpgPublicKey};
use provmirror_types::PublishResult;

/// Operation result that can be serialized for CLI output
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    /// A single version was published
    Published(PublishResult),
    /// Report of a sync document run
    SyncReport(SyncReport),
    /// Manifest written by a fetch-only run
    ManifestStored { key: String },
    VersionCheck(VersionCheck),
    /// Organization-wide or filtered retention run
    Cleanup(CleanupSummary),
    /// Keys registered with the private registry
    KeyList(Vec<GpgKeyRecord>),
    Key(GpgKeyRecord),
    /// Signing keys of a public release, with the files they were saved to
    SigningKeys {
        keys: Vec<GpgPublicKey>,
        saved_to: Vec<String>,
    },
    /// Generic success message
    Success(String),
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the result cannot be encoded.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| {
            OpsError::SerializationError {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Check if this is a success result
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            OperationResult::SyncReport(report) => report.failed() == 0,
            OperationResult::Cleanup(summary) => {
                summary.failures() == 0
                    && summary.results.iter().all(|r| match r {
                        ProviderCleanup::Cleaned(outcome) => outcome.failed_versions.is_empty(),
                        ProviderCleanup::Failed { .. } => false,
                    })
            }
            OperationResult::Published(_)
            | OperationResult::ManifestStored { .. }
            | OperationResult::VersionCheck(_)
            | OperationResult::KeyList(_)
            | OperationResult::Key(_)
            | OperationResult::SigningKeys { .. }
            | OperationResult::Success(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_serialize_with_type_tag() {
        let result = OperationResult::Published(PublishResult {
            platforms_published: 3,
            registry_location: "https://app.terraform.io/app/acme/registry/private/providers/acme/aws/6.26.0".into(),
        });
        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "Published");
        assert_eq!(json["data"]["platformsPublished"], 3);
    }

    #[test]
    fn failed_sync_entries_make_the_result_unsuccessful() {
        let report = SyncReport {
            entries: vec![SyncEntryReport {
                provider: "aws".into(),
                namespace: "hashicorp".into(),
                requested_version: "6.26.0".into(),
                resolved_version: Some("6.26.0".into()),
                platforms: vec!["linux/amd64".into()],
                status: SyncStatus::Failed {
                    stage: Some("fetch".into()),
                    error: provmirror_events::FailureContext::new(
                        None::<String>,
                        "boom",
                        None::<String>,
                        false,
                    ),
                    remote_body: None,
                },
            }],
        };
        assert!(!OperationResult::SyncReport(report).is_success());
        assert!(OperationResult::SyncReport(SyncReport::default()).is_success());
    }
}
