//! Report types returned by operations

use provmirror_events::FailureContext;
use provmirror_types::PublishResult;
use serde::Serialize;

/// Result of a retention run over one provider
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RetentionOutcome {
    pub provider: String,
    pub total_versions: usize,
    /// Deleted, already absent, or (dry run) would be deleted
    pub deleted_versions: Vec<String>,
    /// Newest first
    pub kept_versions: Vec<String>,
    pub failed_versions: Vec<String>,
    pub dry_run: bool,
}

impl RetentionOutcome {
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.deleted_versions.len()
    }
}

/// Retention result for one provider of an organization-wide run
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ProviderCleanup {
    Cleaned(RetentionOutcome),
    Failed {
        provider: String,
        error: FailureContext,
    },
}

impl ProviderCleanup {
    #[must_use]
    pub fn provider(&self) -> &str {
        match self {
            Self::Cleaned(outcome) => &outcome.provider,
            Self::Failed { provider, .. } => provider,
        }
    }
}

/// Result of a retention run over an organization
#[derive(Clone, Debug, Serialize)]
pub struct CleanupSummary {
    pub dry_run: bool,
    pub keep_count: usize,
    pub providers_checked: usize,
    pub providers_cleaned: usize,
    pub total_versions_deleted: usize,
    pub results: Vec<ProviderCleanup>,
}

impl CleanupSummary {
    #[must_use]
    pub fn new(keep_count: usize, dry_run: bool, results: Vec<ProviderCleanup>) -> Self {
        let outcomes = results.iter().filter_map(|r| match r {
            ProviderCleanup::Cleaned(outcome) => Some(outcome),
            ProviderCleanup::Failed { .. } => None,
        });
        let (providers_cleaned, total_versions_deleted) =
            outcomes.fold((0, 0), |(cleaned, deleted), outcome| {
                let count = outcome.deleted_count();
                (cleaned + usize::from(count > 0), deleted + count)
            });

        Self {
            dry_run,
            keep_count,
            providers_checked: results.len(),
            providers_cleaned,
            total_versions_deleted,
            results,
        }
    }

    #[must_use]
    pub fn failures(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, ProviderCleanup::Failed { .. }))
            .count()
    }
}

/// What happened to one entry of a sync document
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncStatus {
    Published(PublishResult),
    /// The version already exists in the private registry
    Skipped,
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        stage: Option<String>,
        error: FailureContext,
        /// Response body the remote sent with the failure
        #[serde(skip_serializing_if = "Option::is_none")]
        remote_body: Option<String>,
    },
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEntryReport {
    pub provider: String,
    pub namespace: String,
    pub requested_version: String,
    /// Absent when the failure happened while resolving `latest`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_version: Option<String>,
    /// `os/arch` pairs of the entry
    pub platforms: Vec<String>,
    #[serde(flatten)]
    pub status: SyncStatus,
}

impl SyncEntryReport {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self.status, SyncStatus::Failed { .. })
    }
}

/// Result of syncing a whole provider document
#[derive(Clone, Debug, Default, Serialize)]
pub struct SyncReport {
    pub entries: Vec<SyncEntryReport>,
}

impl SyncReport {
    #[must_use]
    pub fn published(&self) -> usize {
        self.count(|s| matches!(s, SyncStatus::Published(_)))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, SyncStatus::Skipped))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| e.is_failure()).count()
    }

    fn count(&self, predicate: impl Fn(&SyncStatus) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.status)).count()
    }
}

/// Whether a version is already published
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionCheck {
    pub organization: String,
    pub provider: String,
    pub version: String,
    pub version_exists: bool,
}
