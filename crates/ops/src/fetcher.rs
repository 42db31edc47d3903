//! Artifact fetcher
//!
//! Resolves one download descriptor per platform, in request order. The
//! checksum manifest and its signature are shared by every platform of a
//! release, so each is downloaded the first time a descriptor names it and
//! never again. Binaries are then streamed into the store with bounded
//! fan-out.

use futures::{stream, StreamExt, TryStreamExt};
use provmirror_errors::{Error, OpsError, Stage};
use provmirror_events::{AppEvent, EventEmitter, SyncEvent};
use provmirror_store::ArtifactStore;
use provmirror_types::{
    binary_filename, checksums_filename, signature_filename, store_prefix, ArtifactLocation,
    ArtifactManifest, ArtifactRef, BinaryRef, ManifestBuilder, PlatformTarget, VersionSpec,
};

use crate::OpsCtx;

/// Fetch every artifact of a concrete version into `store`
///
/// # Errors
///
/// Returns a validation error for an unresolved version or an empty
/// platform list before any remote call. The first download failure
/// aborts the fetch and removes the objects this attempt stored.
pub async fn fetch(
    ctx: &OpsCtx,
    store: &dyn ArtifactStore,
    spec: &VersionSpec,
    platforms: &[PlatformTarget],
) -> Result<ArtifactManifest, Error> {
    validate_request(spec, platforms)?;

    ctx.emit(AppEvent::Sync(SyncEvent::FetchStarted {
        provider: spec.provider.to_string(),
        version: spec.version.clone(),
        platforms: platforms.len(),
    }));

    let prefix = store_prefix(&spec.provider.name, &spec.version);
    let existing = store.list_prefix(&prefix).await?;

    match fetch_into(ctx, store, spec, platforms).await {
        Ok(manifest) => {
            ctx.emit(AppEvent::Sync(SyncEvent::FetchCompleted {
                provider: spec.provider.to_string(),
                version: spec.version.clone(),
                binaries: manifest.binaries.len(),
            }));
            Ok(manifest)
        }
        Err(err) => {
            if let Err(cleanup) = discard_attempt(store, &prefix, &existing).await {
                ctx.emit_warning_with_context(
                    format!("could not remove partial fetch under {prefix}"),
                    cleanup.to_string(),
                );
            }
            Err(err)
        }
    }
}

/// Remove what a failed attempt added under `prefix`
///
/// Objects stored by an earlier fetch of the same version stay.
async fn discard_attempt(
    store: &dyn ArtifactStore,
    prefix: &str,
    existing: &[String],
) -> Result<(), Error> {
    if existing.is_empty() {
        return store.remove_prefix(prefix).await;
    }
    for key in store.list_prefix(prefix).await? {
        if !existing.contains(&key) {
            store.remove(&key).await?;
        }
    }
    Ok(())
}

pub(crate) fn validate_request(spec: &VersionSpec, platforms: &[PlatformTarget]) -> Result<(), Error> {
    if spec.is_latest() || spec.version.trim().is_empty() {
        return Err(OpsError::UnresolvedVersion {
            provider: spec.provider.to_string(),
        }
        .into());
    }
    if platforms.is_empty() {
        return Err(OpsError::NoPlatforms {
            provider: spec.provider.to_string(),
        }
        .into());
    }
    Ok(())
}

async fn fetch_into(
    ctx: &OpsCtx,
    store: &dyn ArtifactStore,
    spec: &VersionSpec,
    platforms: &[PlatformTarget],
) -> Result<ArtifactManifest, Error> {
    let name = spec.provider.name.as_str();
    let version = spec.version.as_str();
    let prefix = store_prefix(name, version);
    let context = ctx.error_context(name, version);

    let mut builder = ManifestBuilder::new();
    let mut downloads = Vec::with_capacity(platforms.len());

    for platform in platforms {
        let in_platform = |err: Error| {
            err.in_stage(
                Stage::Fetch,
                context.clone().with_platform(platform.to_string()),
            )
        };

        let descriptor = ctx
            .source
            .download_descriptor(spec, platform)
            .await
            .map_err(in_platform)?;

        if !builder.has_checksums() {
            if let Some(url) = descriptor.checksums_url() {
                let filename = checksums_filename(name, version);
                let location = download(ctx, store, url, &prefix, &filename)
                    .await
                    .map_err(in_platform)?;
                builder.set_checksums(ArtifactRef { filename, location });
            }
        }

        if !builder.has_signature() {
            if let Some(url) = descriptor.signature_url() {
                let filename = signature_filename(name, version);
                let location = download(ctx, store, url, &prefix, &filename)
                    .await
                    .map_err(in_platform)?;
                builder.set_signature(ArtifactRef { filename, location });
            }
        }

        downloads.push((platform.clone(), descriptor.download_url));
    }

    let parallel = ctx.config.sync.parallel_downloads.max(1);
    let prefix = prefix.as_str();
    let context = &context;
    let binaries: Vec<BinaryRef> = stream::iter(downloads)
        .map(|(platform, url)| async move {
            let filename = binary_filename(name, version, &platform);
            let location = download(ctx, store, &url, prefix, &filename)
                .await
                .map_err(|err| {
                    err.in_stage(
                        Stage::Fetch,
                        context.clone().with_platform(platform.to_string()),
                    )
                })?;
            Ok::<_, Error>(BinaryRef {
                platform,
                filename,
                location,
            })
        })
        .buffered(parallel)
        .try_collect()
        .await?;

    for binary in binaries {
        builder.push_binary(binary);
    }
    Ok(builder.build())
}

async fn download(
    ctx: &OpsCtx,
    store: &dyn ArtifactStore,
    url: &str,
    prefix: &str,
    filename: &str,
) -> Result<ArtifactLocation, Error> {
    let body = ctx.source.open_artifact(url).await?;
    let (location, bytes) = store.put_stream(&format!("{prefix}{filename}"), body).await?;
    ctx.emit(AppEvent::Sync(SyncEvent::ArtifactStored {
        filename: filename.to_string(),
        location: location.to_string(),
        bytes,
    }));
    Ok(location)
}
