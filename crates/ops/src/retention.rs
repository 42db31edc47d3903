//! Retention planning and execution
//!
//! Versions are ordered newest first by [`VersionKey`]; the first
//! `keep_count` are kept and the rest deleted. A version the registry no
//! longer has counts as deleted. Other per-version failures are recorded
//! and the run moves on.

use provmirror_errors::{Error, ErrorContext, Stage};
use provmirror_events::{AppEvent, EventEmitter, FailureContext, RetentionEvent};
use provmirror_types::{RegistryTarget, RegistryVersionRecord, RetentionPlan, VersionKey};
use std::cmp::Reverse;
use std::future::Future;

use crate::types::{CleanupSummary, ProviderCleanup, RetentionOutcome};
use crate::OpsCtx;

/// Partition versions into the newest `keep_count` and the rest
///
/// The sort is stable: versions with equal keys keep their listing order.
#[must_use]
pub fn plan(mut records: Vec<RegistryVersionRecord>, keep_count: usize) -> RetentionPlan {
    records.sort_by_cached_key(|record| Reverse(VersionKey::parse(&record.version)));
    let delete = records.split_off(keep_count.min(records.len()));
    RetentionPlan {
        keep: records,
        delete,
    }
}

/// Delete every version in `plan.delete`, in order
///
/// In a dry run `delete` is never called and every candidate is reported
/// as deleted.
pub async fn execute<E, F, Fut>(
    emitter: &E,
    provider: &str,
    plan: &RetentionPlan,
    dry_run: bool,
    mut delete: F,
) -> RetentionOutcome
where
    E: EventEmitter + ?Sized,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<(), Error>>,
{
    let mut deleted_versions = Vec::new();
    let mut failed_versions = Vec::new();

    for record in &plan.delete {
        let version = record.version.clone();
        let event = if dry_run {
            deleted_versions.push(version.clone());
            RetentionEvent::WouldDelete {
                provider: provider.to_string(),
                version,
            }
        } else {
            match delete(version.clone()).await {
                Ok(()) => {
                    deleted_versions.push(version.clone());
                    RetentionEvent::VersionDeleted {
                        provider: provider.to_string(),
                        version,
                    }
                }
                Err(err) if err.is_not_found() => {
                    deleted_versions.push(version.clone());
                    RetentionEvent::VersionAlreadyAbsent {
                        provider: provider.to_string(),
                        version,
                    }
                }
                Err(err) => {
                    failed_versions.push(version.clone());
                    RetentionEvent::DeleteFailed {
                        provider: provider.to_string(),
                        version,
                        failure: FailureContext::from_error(&err),
                    }
                }
            }
        };
        emitter.emit(AppEvent::Retention(event));
    }

    RetentionOutcome {
        provider: provider.to_string(),
        total_versions: plan.total(),
        deleted_versions,
        kept_versions: plan.kept_versions(),
        failed_versions,
        dry_run,
    }
}

/// List, plan and prune the versions of one provider
///
/// # Errors
///
/// Returns an error if the version listing fails. Deletion failures are
/// reported in the outcome instead.
pub async fn cleanup_provider(
    ctx: &OpsCtx,
    target: &RegistryTarget,
    keep_count: usize,
    dry_run: bool,
) -> Result<RetentionOutcome, Error> {
    let provider = target.to_string();
    ctx.emit(AppEvent::Retention(RetentionEvent::Started {
        provider: provider.clone(),
        keep_count,
        dry_run,
    }));

    let records = ctx.registry.list_versions(target).await.map_err(|err| {
        err.in_stage(
            Stage::ListVersions,
            ErrorContext::new()
                .with_organization(&target.organization)
                .with_provider(&target.name),
        )
    })?;

    for record in &records {
        if VersionKey::try_parse(&record.version).is_none() {
            ctx.emit(AppEvent::Retention(RetentionEvent::UnparseableVersion {
                provider: provider.clone(),
                version: record.version.clone(),
            }));
        }
    }

    let plan = plan(records, keep_count);
    ctx.emit(AppEvent::Retention(RetentionEvent::Planned {
        provider: provider.clone(),
        total: plan.total(),
        keep: plan.keep.len(),
        delete: plan.delete.len(),
    }));

    let outcome = execute(ctx, &provider, &plan, dry_run, |version| async move {
        ctx.registry.delete_version(target, &version).await
    })
    .await;

    ctx.emit(AppEvent::Retention(RetentionEvent::Completed {
        provider,
        deleted: outcome.deleted_count(),
        failed: outcome.failed_versions.len(),
        dry_run,
    }));
    Ok(RetentionOutcome {
        provider: target.name.clone(),
        ..outcome
    })
}

/// Prune one provider, or every provider of the organization
///
/// With a filter, the provider is looked up under the default registry
/// name and namespace. Without one, every listed provider is cleaned and
/// a failure on one does not stop the others.
///
/// # Errors
///
/// Returns an error if the provider listing fails, or if the filtered
/// provider cannot be cleaned.
pub async fn cleanup_all(
    ctx: &OpsCtx,
    keep_count: usize,
    dry_run: bool,
    provider_filter: Option<&str>,
) -> Result<CleanupSummary, Error> {
    let organization = ctx.organization.as_str();
    let default_registry = ctx.config.retention.default_registry_name.as_str();
    let default_namespace = ctx.config.default_namespace(organization);

    if let Some(name) = provider_filter {
        let target = RegistryTarget {
            organization: organization.to_string(),
            registry_name: default_registry.to_string(),
            namespace: default_namespace.to_string(),
            name: name.to_string(),
        };
        let outcome = cleanup_provider(ctx, &target, keep_count, dry_run).await?;
        return Ok(CleanupSummary::new(
            keep_count,
            dry_run,
            vec![ProviderCleanup::Cleaned(outcome)],
        ));
    }

    let providers = ctx
        .registry
        .list_providers(organization)
        .await
        .map_err(|err| {
            err.in_stage(
                Stage::ListProviders,
                ErrorContext::new().with_organization(organization),
            )
        })?;
    ctx.emit_debug(format!("found {} providers in {organization}", providers.len()));

    let mut results = Vec::with_capacity(providers.len());
    for record in providers {
        let target = RegistryTarget {
            organization: organization.to_string(),
            registry_name: record.registry_name().unwrap_or(default_registry).to_string(),
            namespace: record.namespace().unwrap_or(default_namespace).to_string(),
            name: record.name.clone(),
        };
        match cleanup_provider(ctx, &target, keep_count, dry_run).await {
            Ok(outcome) => results.push(ProviderCleanup::Cleaned(outcome)),
            Err(err) => {
                ctx.emit_error(format!("failed to clean up {target}: {err}"));
                results.push(ProviderCleanup::Failed {
                    provider: record.name,
                    error: FailureContext::from_error(&err),
                });
            }
        }
    }

    Ok(CleanupSummary::new(keep_count, dry_run, results))
}
