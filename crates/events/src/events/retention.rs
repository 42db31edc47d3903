use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Progress of a retention run over one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RetentionEvent {
    Started {
        provider: String,
        keep_count: usize,
        dry_run: bool,
    },

    Planned {
        provider: String,
        total: usize,
        keep: usize,
        delete: usize,
    },

    /// The version string did not parse and sorts as 0.0.0
    UnparseableVersion { provider: String, version: String },

    VersionDeleted { provider: String, version: String },

    /// The registry answered 404; counted as deleted
    VersionAlreadyAbsent { provider: String, version: String },

    WouldDelete { provider: String, version: String },

    DeleteFailed {
        provider: String,
        version: String,
        failure: FailureContext,
    },

    Completed {
        provider: String,
        deleted: usize,
        failed: usize,
        dry_run: bool,
    },
}
