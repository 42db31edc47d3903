//! Plain-text failure report for a sync entry

use chrono::{DateTime, Utc};
use std::fmt::Write as _;

use crate::types::{SyncEntryReport, SyncStatus};

const TROUBLESHOOTING: &[&str] = &[
    "Check that the sync document is valid JSON and lists every platform",
    "Verify the registry token and organization settings",
    "Ensure the signing key exists in the private registry (provmirror keys list)",
    "Check that the provider version exists in the source registry",
    "Re-run with --debug for detailed request logs",
];

/// Render the report for a failed entry; `None` if the entry did not fail
#[must_use]
pub fn failure_report(entry: &SyncEntryReport, at: DateTime<Utc>) -> Option<String> {
    let SyncStatus::Failed {
        stage,
        error,
        remote_body,
    } = &entry.status
    else {
        return None;
    };

    let mut out = String::new();
    let _ = writeln!(out, "Provider Synchronization Failed");
    let _ = writeln!(out, "===============================");
    let _ = writeln!(out);
    let _ = writeln!(out, "Timestamp:  {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "Provider:   {}/{}", entry.namespace, entry.provider);
    let _ = writeln!(
        out,
        "Version:    {}",
        entry
            .resolved_version
            .as_deref()
            .unwrap_or(&entry.requested_version)
    );
    if entry.resolved_version.as_deref() != Some(entry.requested_version.as_str()) {
        let _ = writeln!(out, "Requested:  {}", entry.requested_version);
    }
    let _ = writeln!(out, "Stage:      {}", stage.as_deref().unwrap_or("unknown"));
    let _ = writeln!(out, "Code:       {}", error.code.as_deref().unwrap_or("unknown"));
    let _ = writeln!(out);
    let _ = writeln!(out, "Error:");
    let _ = writeln!(out, "  {}", error.message);
    if let Some(hint) = &error.hint {
        let _ = writeln!(out, "Hint:");
        let _ = writeln!(out, "  {hint}");
    }
    if let Some(body) = remote_body {
        let _ = writeln!(out, "Remote response:");
        let _ = writeln!(out, "  {body}");
    }

    if !entry.platforms.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Platforms ({}):", entry.platforms.len());
        for platform in &entry.platforms {
            let _ = writeln!(out, "  - {platform}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Troubleshooting:");
    for (i, step) in TROUBLESHOOTING.iter().enumerate() {
        let _ = writeln!(out, "  {}. {step}", i + 1);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use provmirror_events::FailureContext;

    fn entry(status: SyncStatus) -> SyncEntryReport {
        SyncEntryReport {
            provider: "aws".into(),
            namespace: "hashicorp".into(),
            requested_version: "latest".into(),
            resolved_version: Some("6.26.0".into()),
            platforms: vec!["linux/amd64".into(), "darwin/arm64".into()],
            status,
        }
    }

    #[test]
    fn renders_failed_entry() {
        let report = failure_report(
            &entry(SyncStatus::Failed {
                stage: Some("create-version".into()),
                error: FailureContext::new(
                    Some("registry.conflict"),
                    "already exists: acme/private/acme/aws 6.26.0",
                    None::<String>,
                    false,
                ),
                remote_body: Some("{\"errors\":[]}".into()),
            }),
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        )
        .unwrap();

        assert!(report.contains("Timestamp:  2025-03-01 12:00:00 UTC"));
        assert!(report.contains("Provider:   hashicorp/aws"));
        assert!(report.contains("Version:    6.26.0"));
        assert!(report.contains("Requested:  latest"));
        assert!(report.contains("Stage:      create-version"));
        assert!(report.contains("Code:       registry.conflict"));
        assert!(report.contains("Remote response:"));
        assert!(report.contains("  - darwin/arm64"));
    }

    #[test]
    fn successful_entries_have_no_report() {
        assert!(failure_report(&entry(SyncStatus::Skipped), Utc::now()).is_none());
    }
}
