//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields so
//! a JSON subscriber can ship them to a log pipeline unchanged.

use provmirror_events::{AppEvent, EventMessage, GeneralEvent, RetentionEvent, SyncEvent};
use tracing::{debug, error, info, trace, warn};

/// Log an `AppEvent` at its level with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let event = &message.event;
    let meta = &message.meta;
    let source = meta.source.as_str();
    let correlation = meta.correlation_id.as_deref();

    match event {
        AppEvent::Sync(sync_event) => match sync_event {
            SyncEvent::VersionResolved { provider, version } => {
                info!(source, correlation, provider = %provider, version = %version, "Resolved latest version");
            }
            SyncEvent::VersionExists {
                organization,
                provider,
                version,
            } => {
                info!(
                    source,
                    correlation,
                    organization = %organization,
                    provider = %provider,
                    version = %version,
                    "Version already published; skipping"
                );
            }
            SyncEvent::FetchStarted {
                provider,
                version,
                platforms,
            } => {
                info!(source, correlation, provider = %provider, version = %version, platforms, "Fetch started");
            }
            SyncEvent::ArtifactStored {
                filename,
                location,
                bytes,
            } => {
                debug!(source, correlation, filename = %filename, location = %location, bytes, "Artifact stored");
            }
            SyncEvent::FetchCompleted {
                provider,
                version,
                binaries,
            } => {
                info!(source, correlation, provider = %provider, version = %version, binaries, "Fetch completed");
            }
            SyncEvent::ManifestStored { key } => {
                info!(source, correlation, key = %key, "Manifest stored");
            }
            SyncEvent::PublishStarted {
                organization,
                provider,
                version,
            } => {
                info!(
                    source,
                    correlation,
                    organization = %organization,
                    provider = %provider,
                    version = %version,
                    "Publish started"
                );
            }
            SyncEvent::ProviderCreated {
                organization,
                provider,
            } => {
                info!(source, correlation, organization = %organization, provider = %provider, "Provider created");
            }
            SyncEvent::VersionCreated {
                organization,
                provider,
                version,
            } => {
                info!(
                    source,
                    correlation,
                    organization = %organization,
                    provider = %provider,
                    version = %version,
                    "Version created"
                );
            }
            SyncEvent::ArtifactUploaded { filename, bytes } => {
                debug!(source, correlation, filename = %filename, bytes, "Artifact uploaded");
            }
            SyncEvent::PlatformPublished {
                provider,
                version,
                platform,
                shasum,
            } => {
                info!(
                    source,
                    correlation,
                    provider = %provider,
                    version = %version,
                    platform = %platform,
                    shasum = %shasum,
                    "Platform published"
                );
            }
            SyncEvent::PublishCompleted {
                organization,
                provider,
                version,
                platforms_published,
                registry_location,
            } => {
                info!(
                    source,
                    correlation,
                    organization = %organization,
                    provider = %provider,
                    version = %version,
                    platforms_published,
                    registry_location = %registry_location,
                    "Publish completed"
                );
            }
            SyncEvent::Failed {
                provider,
                version,
                stage,
                failure,
            } => {
                error!(
                    source,
                    correlation,
                    provider = %provider,
                    version = %version,
                    stage = ?stage,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Sync failed"
                );
            }
        },

        AppEvent::Retention(retention_event) => match retention_event {
            RetentionEvent::Started {
                provider,
                keep_count,
                dry_run,
            } => {
                info!(source, correlation, provider = %provider, keep_count, dry_run, "Retention started");
            }
            RetentionEvent::Planned {
                provider,
                total,
                keep,
                delete,
            } => {
                info!(source, correlation, provider = %provider, total, keep, delete, "Retention planned");
            }
            RetentionEvent::UnparseableVersion { provider, version } => {
                warn!(
                    source,
                    correlation,
                    provider = %provider,
                    version = %version,
                    "Version does not parse; sorting it as 0.0.0"
                );
            }
            RetentionEvent::VersionDeleted { provider, version } => {
                info!(source, correlation, provider = %provider, version = %version, "Version deleted");
            }
            RetentionEvent::VersionAlreadyAbsent { provider, version } => {
                info!(source, correlation, provider = %provider, version = %version, "Version already absent");
            }
            RetentionEvent::WouldDelete { provider, version } => {
                info!(source, correlation, provider = %provider, version = %version, "Would delete version");
            }
            RetentionEvent::DeleteFailed {
                provider,
                version,
                failure,
            } => {
                error!(
                    source,
                    correlation,
                    provider = %provider,
                    version = %version,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    "Version delete failed"
                );
            }
            RetentionEvent::Completed {
                provider,
                deleted,
                failed,
                dry_run,
            } => {
                info!(source, correlation, provider = %provider, deleted, failed, dry_run, "Retention completed");
            }
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::Warning { message, context } => {
                warn!(source, correlation, message = %message, context = ?context, "Warning");
            }
            GeneralEvent::Error { message } => {
                error!(source, correlation, message = %message, "Error");
            }
            GeneralEvent::Debug { message } => {
                debug!(source, correlation, message = %message, "Debug");
            }
        },
    }

    trace!(source, correlation, event = ?event, "Application event");
}
