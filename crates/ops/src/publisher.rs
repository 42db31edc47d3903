//! Private registry publisher
//!
//! Publishing is a sequence of remote steps with no rollback: ensure the
//! provider, create the version, upload the checksum manifest and its
//! signature, then register and upload every platform binary. Version
//! creation is deliberately not guarded; publishing over an existing
//! version fails with `Conflict` before anything is uploaded.

use futures::{stream, StreamExt, TryStreamExt};
use provmirror_errors::{Error, ErrorContext, OpsError, Stage};
use provmirror_events::{AppEvent, EventEmitter, SyncEvent};
use provmirror_store::{digest, ArtifactStore};
use provmirror_types::{
    ArtifactLocation, ArtifactManifest, ArtifactRef, BinaryRef, PublishResult, RegistryTarget,
};

use crate::OpsCtx;

/// Publish a fetched manifest as `version` of `target`
///
/// # Errors
///
/// Returns a validation error for an incomplete manifest or a missing
/// signing key before any remote call. Any remote failure aborts the
/// remaining steps and carries the failing stage and platform.
pub async fn publish(
    ctx: &OpsCtx,
    store: &dyn ArtifactStore,
    target: &RegistryTarget,
    version: &str,
    key_id: Option<&str>,
    manifest: &ArtifactManifest,
) -> Result<PublishResult, Error> {
    let (checksums, signature, key_id) = preflight(target, key_id, manifest)?;
    let context = ErrorContext::new()
        .with_organization(&target.organization)
        .with_provider(&target.name)
        .with_version(version);
    let staged = |stage: Stage| {
        let context = context.clone();
        move |err: Error| err.in_stage(stage, context)
    };

    ctx.emit(AppEvent::Sync(SyncEvent::PublishStarted {
        organization: target.organization.clone(),
        provider: target.name.clone(),
        version: version.to_string(),
    }));

    let exists = ctx
        .registry
        .provider_exists(target)
        .await
        .map_err(staged(Stage::EnsureProvider))?;
    if !exists {
        ctx.registry
            .create_provider(target)
            .await
            .map_err(staged(Stage::EnsureProvider))?;
        ctx.emit(AppEvent::Sync(SyncEvent::ProviderCreated {
            organization: target.organization.clone(),
            provider: target.name.clone(),
        }));
    }

    let uploads = ctx
        .registry
        .create_version(target, version, key_id, &ctx.config.registry.protocols)
        .await
        .map_err(staged(Stage::CreateVersion))?;
    ctx.emit(AppEvent::Sync(SyncEvent::VersionCreated {
        organization: target.organization.clone(),
        provider: target.name.clone(),
        version: version.to_string(),
    }));

    upload(ctx, store, &uploads.checksums_upload, &checksums.filename, &checksums.location)
        .await
        .map_err(staged(Stage::UploadChecksums))?;
    upload(ctx, store, &uploads.signature_upload, &signature.filename, &signature.location)
        .await
        .map_err(staged(Stage::UploadSignature))?;

    let parallel = ctx.config.sync.parallel_uploads.max(1);
    let context = &context;
    let published: Vec<()> = stream::iter(&manifest.binaries)
        .map(|binary| publish_platform(ctx, store, target, version, binary, context))
        .buffered(parallel)
        .try_collect()
        .await?;

    let result = PublishResult {
        platforms_published: published.len(),
        registry_location: ctx.registry.registry_location(target, version),
    };
    ctx.emit(AppEvent::Sync(SyncEvent::PublishCompleted {
        organization: target.organization.clone(),
        provider: target.name.clone(),
        version: version.to_string(),
        platforms_published: result.platforms_published,
        registry_location: result.registry_location.clone(),
    }));
    Ok(result)
}

fn preflight<'a>(
    target: &RegistryTarget,
    key_id: Option<&'a str>,
    manifest: &'a ArtifactManifest,
) -> Result<(&'a ArtifactRef, &'a ArtifactRef, &'a str), Error> {
    let incomplete = |message: &str| -> Error {
        OpsError::IncompleteManifest {
            provider: target.to_string(),
            message: message.to_string(),
        }
        .into()
    };

    if manifest.binaries.is_empty() {
        return Err(incomplete("no platform binaries"));
    }
    let checksums = manifest
        .checksums
        .as_ref()
        .ok_or_else(|| incomplete("no checksum manifest"))?;
    let signature = manifest
        .signature
        .as_ref()
        .ok_or_else(|| incomplete("no checksum signature"))?;
    let key_id = require_key_id(target, key_id)?;
    Ok((checksums, signature, key_id))
}

/// The trimmed signing key id; a missing or blank id is a validation error
pub(crate) fn require_key_id<'a>(
    target: &RegistryTarget,
    key_id: Option<&'a str>,
) -> Result<&'a str, Error> {
    key_id
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            OpsError::MissingSigningKey {
                provider: target.to_string(),
            }
            .into()
        })
}

async fn publish_platform(
    ctx: &OpsCtx,
    store: &dyn ArtifactStore,
    target: &RegistryTarget,
    version: &str,
    binary: &BinaryRef,
    context: &ErrorContext,
) -> Result<(), Error> {
    let context = context.clone().with_platform(binary.platform.to_string());

    let shasum = digest(store, &binary.location)
        .await
        .map_err(|err| err.in_stage(Stage::CreatePlatform, context.clone()))?
        .to_hex();
    let upload_url = ctx
        .registry
        .create_platform(target, version, &binary.platform, &binary.filename, &shasum)
        .await
        .map_err(|err| err.in_stage(Stage::CreatePlatform, context.clone()))?;
    upload(ctx, store, &upload_url, &binary.filename, &binary.location)
        .await
        .map_err(|err| err.in_stage(Stage::UploadBinary, context))?;

    ctx.emit(AppEvent::Sync(SyncEvent::PlatformPublished {
        provider: target.name.clone(),
        version: version.to_string(),
        platform: binary.platform.to_string(),
        shasum,
    }));
    Ok(())
}

async fn upload(
    ctx: &OpsCtx,
    store: &dyn ArtifactStore,
    url: &str,
    filename: &str,
    location: &ArtifactLocation,
) -> Result<(), Error> {
    let length = store.size(location).await?;
    let body = store.open(location).await?;
    ctx.registry.upload(url, body, length).await?;
    ctx.emit(AppEvent::Sync(SyncEvent::ArtifactUploaded {
        filename: filename.to_string(),
        bytes: length,
    }));
    Ok(())
}
