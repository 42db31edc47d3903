//! Event handling and progress display

use console::{Style, Term};
use provmirror_events::{AppEvent, EventMessage, GeneralEvent, RetentionEvent, SyncEvent};

/// Prints progress lines to stderr and forwards every event to tracing
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    /// Progress lines are suppressed in JSON mode
    quiet: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            quiet,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        crate::logging::log_event_with_tracing(&message);
        if self.quiet {
            return;
        }
        if let Some(line) = self.status_line(&message.event) {
            let _ = self.term.write_line(&line);
        }
    }

    fn status_line(&self, event: &AppEvent) -> Option<String> {
        let line = match event {
            AppEvent::Sync(sync_event) => match sync_event {
                SyncEvent::VersionResolved { provider, version } => {
                    format!("Resolved {provider} latest -> {version}")
                }
                SyncEvent::VersionExists {
                    organization,
                    provider,
                    version,
                } => self.muted(&format!(
                    "{provider} {version} already published in {organization}; skipping"
                )),
                SyncEvent::FetchStarted {
                    provider,
                    version,
                    platforms,
                } => format!("Fetching {provider} {version} ({platforms} platforms)"),
                SyncEvent::ManifestStored { key } => format!("Stored manifest {key}"),
                SyncEvent::ProviderCreated {
                    organization,
                    provider,
                } => format!("Created provider {organization}/{provider}"),
                SyncEvent::VersionCreated {
                    provider, version, ..
                } => format!("Created version {provider} {version}"),
                SyncEvent::PlatformPublished {
                    provider,
                    version,
                    platform,
                    ..
                } => format!("  {} {provider} {version} {platform}", self.ok("published")),
                SyncEvent::PublishCompleted {
                    provider,
                    version,
                    platforms_published,
                    ..
                } => self.ok(&format!(
                    "Published {provider} {version} ({platforms_published} platforms)"
                )),
                SyncEvent::Failed {
                    provider,
                    version,
                    failure,
                    ..
                } => self.failed(&format!("{provider} {version}: {}", failure.message)),
                _ => return None,
            },
            AppEvent::Retention(retention_event) => match retention_event {
                RetentionEvent::Planned {
                    provider,
                    total,
                    keep,
                    delete,
                } => format!("{provider}: {total} versions, keeping {keep}, deleting {delete}"),
                RetentionEvent::WouldDelete { provider, version } => {
                    self.muted(&format!("  would delete {provider} {version}"))
                }
                RetentionEvent::VersionDeleted { version, .. } => {
                    format!("  {} {version}", self.ok("deleted"))
                }
                RetentionEvent::VersionAlreadyAbsent { version, .. } => {
                    self.muted(&format!("  {version} already absent"))
                }
                RetentionEvent::DeleteFailed {
                    version, failure, ..
                } => self.failed(&format!("  {version}: {}", failure.message)),
                RetentionEvent::UnparseableVersion { provider, version } => {
                    self.warning(&format!("{provider}: version {version:?} does not parse"))
                }
                _ => return None,
            },
            AppEvent::General(general_event) => match general_event {
                GeneralEvent::Warning { message, .. } => self.warning(message),
                GeneralEvent::Error { message, .. } => self.failed(message),
                _ => return None,
            },
        };
        Some(line)
    }

    fn style(&self, style: Style, text: &str) -> String {
        if self.colors_enabled {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn ok(&self, text: &str) -> String {
        self.style(Style::new().green(), text)
    }

    fn muted(&self, text: &str) -> String {
        self.style(Style::new().dim(), text)
    }

    fn warning(&self, text: &str) -> String {
        format!("{} {text}", self.style(Style::new().yellow().bold(), "warning:"))
    }

    fn failed(&self, text: &str) -> String {
        format!("{} {text}", self.style(Style::new().red().bold(), "error:"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provmirror_events::FailureContext;

    #[test]
    fn plain_status_lines() {
        let handler = EventHandler::new(false, false);

        let line = handler
            .status_line(&AppEvent::Retention(RetentionEvent::Planned {
                provider: "acme/private/acme/aws".into(),
                total: 12,
                keep: 10,
                delete: 2,
            }))
            .unwrap();
        assert_eq!(line, "acme/private/acme/aws: 12 versions, keeping 10, deleting 2");

        let failed = handler
            .status_line(&AppEvent::Sync(SyncEvent::Failed {
                provider: "hashicorp/aws".into(),
                version: "6.26.0".into(),
                stage: Some("fetch".into()),
                failure: FailureContext::new(None::<String>, "not found", None::<String>, false),
            }))
            .unwrap();
        assert_eq!(failed, "error: hashicorp/aws 6.26.0: not found");
    }

    #[test]
    fn chatty_events_have_no_status_line() {
        let handler = EventHandler::new(false, false);
        assert!(handler
            .status_line(&AppEvent::Sync(SyncEvent::ArtifactUploaded {
                filename: "x.zip".into(),
                bytes: 3,
            }))
            .is_none());
    }
}
