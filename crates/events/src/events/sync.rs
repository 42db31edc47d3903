use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Fetch and publish progress for one provider version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// `latest` was resolved against the source registry
    VersionResolved { provider: String, version: String },

    /// The version is already published; the entry is skipped
    VersionExists {
        organization: String,
        provider: String,
        version: String,
    },

    FetchStarted {
        provider: String,
        version: String,
        platforms: usize,
    },

    /// One artifact landed in the artifact store
    ArtifactStored {
        filename: String,
        location: String,
        bytes: u64,
    },

    FetchCompleted {
        provider: String,
        version: String,
        binaries: usize,
    },

    /// A manifest was persisted for a later publish
    ManifestStored { key: String },

    PublishStarted {
        organization: String,
        provider: String,
        version: String,
    },

    /// The provider resource did not exist and was created
    ProviderCreated {
        organization: String,
        provider: String,
    },

    VersionCreated {
        organization: String,
        provider: String,
        version: String,
    },

    /// Bytes were PUT to a presigned upload target
    ArtifactUploaded { filename: String, bytes: u64 },

    PlatformPublished {
        provider: String,
        version: String,
        platform: String,
        shasum: String,
    },

    PublishCompleted {
        organization: String,
        provider: String,
        version: String,
        platforms_published: usize,
        registry_location: String,
    },

    Failed {
        provider: String,
        version: String,
        stage: Option<String>,
        failure: FailureContext,
    },
}
