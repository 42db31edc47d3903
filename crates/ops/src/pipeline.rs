//! Synchronization pipeline
//!
//! A run is keyed by (organization, provider, version) and keeps no state
//! between runs. The single-process form fetches into a temporary store
//! that is removed when the run ends; the split form persists a manifest
//! to the configured store so a later process can publish it.

use provmirror_config::{ProviderEntry, ProviderSyncDocument};
use provmirror_errors::{Error, ErrorContext, Stage};
use provmirror_events::{AppEvent, EventEmitter, FailureContext, SyncEvent};
use provmirror_store::{load_manifest, save_manifest, LocalStore};
use provmirror_types::{PlatformTarget, PublishResult, StoredManifest, VersionSpec};

use crate::fetcher::{fetch, validate_request};
use crate::publisher::{publish, require_key_id};
use crate::types::{SyncEntryReport, SyncReport, SyncStatus, VersionCheck};
use crate::OpsCtx;

/// Replace `latest` with the newest version on the source registry
///
/// # Errors
///
/// Returns `NotFound` if the source registry has no version for the
/// provider, or a transport error.
pub async fn resolve_version(ctx: &OpsCtx, spec: &VersionSpec) -> Result<VersionSpec, Error> {
    if !spec.is_latest() {
        return Ok(spec.clone());
    }

    let version = ctx
        .source
        .latest_version(&spec.provider)
        .await
        .map_err(|err| {
            err.in_stage(
                Stage::ResolveVersion,
                ErrorContext::new().with_provider(spec.provider.to_string()),
            )
        })?;
    ctx.emit(AppEvent::Sync(SyncEvent::VersionResolved {
        provider: spec.provider.to_string(),
        version: version.clone(),
    }));
    Ok(spec.clone().resolved(version))
}

/// Whether `provider` `version` is already published for the organization
///
/// # Errors
///
/// Returns an error for anything other than a found or not-found answer.
pub async fn check_version(ctx: &OpsCtx, provider: &str, version: &str) -> Result<VersionCheck, Error> {
    let version_exists = ctx
        .registry
        .version_exists(&ctx.publish_target(provider), version)
        .await
        .map_err(|err| err.in_stage(Stage::CheckVersion, ctx.error_context(provider, version)))?;

    Ok(VersionCheck {
        organization: ctx.organization.clone(),
        provider: provider.to_string(),
        version: version.to_string(),
        version_exists,
    })
}

/// Fetch and publish one concrete version through a temporary store
///
/// # Errors
///
/// Returns a validation error for `latest`, an empty platform list or a
/// missing signing key id before any remote call, and otherwise the first
/// fetch or publish failure. A failed fetch never reaches the registry.
pub async fn run(
    ctx: &OpsCtx,
    spec: &VersionSpec,
    platforms: &[PlatformTarget],
    key_id: Option<&str>,
) -> Result<PublishResult, Error> {
    let target = ctx.publish_target(&spec.provider.name);
    validate_request(spec, platforms)?;
    require_key_id(&target, key_id)?;

    let (store, _workdir) = LocalStore::temporary()?;
    let manifest = fetch(ctx, &store, spec, platforms).await?;
    publish(ctx, &store, &target, &spec.version, key_id, &manifest).await
}

/// Fetch into the configured store and persist the manifest
///
/// Returns the key of the stored manifest.
///
/// # Errors
///
/// Returns a validation error for a missing signing key id before any
/// remote call, the fetch failure, or an error if the manifest cannot be
/// written.
pub async fn fetch_to_store(
    ctx: &OpsCtx,
    spec: &VersionSpec,
    platforms: &[PlatformTarget],
    key_id: Option<&str>,
) -> Result<String, Error> {
    validate_request(spec, platforms)?;
    require_key_id(&ctx.publish_target(&spec.provider.name), key_id)?;

    let manifest = fetch(ctx, ctx.store.as_ref(), spec, platforms).await?;

    let stored = StoredManifest {
        provider: spec.provider.name.clone(),
        namespace: spec.provider.namespace.clone(),
        version: spec.version.clone(),
        gpg_key_id: key_id.map(ToOwned::to_owned),
        manifest,
    };
    let key = save_manifest(ctx.store.as_ref(), &stored)
        .await
        .map_err(|err| {
            err.in_stage(
                Stage::PersistManifest,
                ctx.error_context(&stored.provider, &stored.version),
            )
        })?;
    ctx.emit(AppEvent::Sync(SyncEvent::ManifestStored { key: key.clone() }));
    Ok(key)
}

/// Publish a manifest previously written by [`fetch_to_store`]
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or publishing fails.
pub async fn publish_from_store(ctx: &OpsCtx, manifest_key: &str) -> Result<PublishResult, Error> {
    let stored = load_manifest(ctx.store.as_ref(), manifest_key)
        .await
        .map_err(|err| {
            err.in_stage(
                Stage::LoadManifest,
                ErrorContext::new().with_organization(&ctx.organization),
            )
        })?;

    publish(
        ctx,
        ctx.store.as_ref(),
        &ctx.publish_target(&stored.provider),
        &stored.version,
        stored.gpg_key_id.as_deref(),
        &stored.manifest,
    )
    .await
}

/// Resolve, check and sync every entry of a provider document
///
/// Entries are processed in order. A failing entry is recorded in the
/// report and does not stop the others.
pub async fn sync_all(ctx: &OpsCtx, document: &ProviderSyncDocument) -> SyncReport {
    let mut report = SyncReport::default();
    for entry in &document.providers {
        report.entries.push(sync_entry(ctx, entry).await);
    }
    ctx.emit_debug(format!(
        "sync finished: {} published, {} skipped, {} failed",
        report.published(),
        report.skipped(),
        report.failed()
    ));
    report
}

async fn sync_entry(ctx: &OpsCtx, entry: &ProviderEntry) -> SyncEntryReport {
    let mut report = SyncEntryReport {
        provider: entry.provider.clone(),
        namespace: entry.namespace.clone(),
        requested_version: entry.version.clone(),
        resolved_version: None,
        platforms: entry.platforms.iter().map(ToString::to_string).collect(),
        status: SyncStatus::Skipped,
    };

    let status = match sync_one(ctx, entry, &mut report.resolved_version).await {
        Ok(Some(result)) => SyncStatus::Published(result),
        Ok(None) => SyncStatus::Skipped,
        Err(err) => {
            let stage = err.stage().map(|s| s.to_string());
            let failure = FailureContext::from_error(&err);
            ctx.emit(AppEvent::Sync(SyncEvent::Failed {
                provider: entry.provider_ref().to_string(),
                version: report
                    .resolved_version
                    .clone()
                    .unwrap_or_else(|| entry.version.clone()),
                stage: stage.clone(),
                failure: failure.clone(),
            }));
            SyncStatus::Failed {
                stage,
                error: failure,
                remote_body: err.remote_body().map(ToOwned::to_owned),
            }
        }
    };
    report.status = status;
    report
}

/// `Ok(None)` when the version already exists
async fn sync_one(
    ctx: &OpsCtx,
    entry: &ProviderEntry,
    resolved: &mut Option<String>,
) -> Result<Option<PublishResult>, Error> {
    require_key_id(&ctx.publish_target(&entry.provider), entry.gpg_key_id.as_deref())?;

    let spec = resolve_version(ctx, &entry.version_spec()).await?;
    *resolved = Some(spec.version.clone());

    let check = check_version(ctx, &entry.provider, &spec.version).await?;
    if check.version_exists {
        ctx.emit(AppEvent::Sync(SyncEvent::VersionExists {
            organization: check.organization,
            provider: check.provider,
            version: check.version,
        }));
        return Ok(None);
    }

    run(ctx, &spec, &entry.platforms, entry.gpg_key_id.as_deref())
        .await
        .map(Some)
}
