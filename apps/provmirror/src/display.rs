//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use provmirror_ops::{
    failure_report, CleanupSummary, OperationResult, ProviderCleanup, SyncReport, SyncStatus,
    VersionCheck,
};
use provmirror_registry::{GpgKeyRecord, GpgPublicKey};
use provmirror_types::{ColorChoice, PublishResult};
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Show extra columns
    verbose: bool,
    /// Print armored key material
    show_keys: bool,
    term: Term,
}

impl OutputRenderer {
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            verbose: false,
            show_keys: false,
            term: Term::stdout(),
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn show_keys(mut self, show_keys: bool) -> Self {
        self.show_keys = show_keys;
        self
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            self.render_json(result)
        } else {
            self.render_table(result)
        }
    }

    fn render_json(&self, result: &OperationResult) -> io::Result<()> {
        let json = result.to_json().map_err(io::Error::other)?;
        println!("{json}");
        Ok(())
    }

    fn render_table(&self, result: &OperationResult) -> io::Result<()> {
        match result {
            OperationResult::Published(result) => self.render_published(result),
            OperationResult::SyncReport(report) => self.render_sync_report(report),
            OperationResult::ManifestStored { key } => {
                println!("{key}");
                Ok(())
            }
            OperationResult::VersionCheck(check) => self.render_version_check(check),
            OperationResult::Cleanup(summary) => self.render_cleanup(summary),
            OperationResult::KeyList(keys) => self.render_key_list(keys),
            OperationResult::Key(key) => self.render_key(key),
            OperationResult::SigningKeys { keys, saved_to } => {
                self.render_signing_keys(keys, saved_to)
            }
            OperationResult::Success(message) => {
                println!("{message}");
                Ok(())
            }
        }
    }

    fn render_published(&self, result: &PublishResult) -> io::Result<()> {
        println!(
            "{} {} platforms",
            self.styled(Style::new().green().bold(), "Published"),
            result.platforms_published
        );
        println!("Location: {}", result.registry_location);
        Ok(())
    }

    fn render_sync_report(&self, report: &SyncReport) -> io::Result<()> {
        if report.entries.is_empty() {
            println!("No providers in document.");
            return Ok(());
        }

        let mut table = self.table(&["Provider", "Version", "Platforms", "Status", "Details"]);
        for entry in &report.entries {
            let version = entry
                .resolved_version
                .as_deref()
                .unwrap_or(&entry.requested_version);
            let (status, details) = match &entry.status {
                SyncStatus::Published(result) => (
                    Cell::new("Published").fg(Color::Green),
                    result.registry_location.clone(),
                ),
                SyncStatus::Skipped => (
                    Cell::new("Skipped").fg(Color::Blue),
                    "already published".to_string(),
                ),
                SyncStatus::Failed { stage, error, .. } => (
                    Cell::new("Failed").fg(Color::Red),
                    match stage {
                        Some(stage) => format!("{stage}: {}", error.message),
                        None => error.message.clone(),
                    },
                ),
            };
            table.add_row(vec![
                Cell::new(format!("{}/{}", entry.namespace, entry.provider)),
                Cell::new(version),
                Cell::new(entry.platforms.len()),
                status,
                Cell::new(details),
            ]);
        }
        println!("{table}");
        println!(
            "{} published, {} skipped, {} failed",
            report.published(),
            report.skipped(),
            report.failed()
        );

        let now = chrono::Utc::now();
        for entry in &report.entries {
            if let Some(text) = failure_report(entry, now) {
                eprintln!();
                eprint!("{text}");
            }
        }
        Ok(())
    }

    fn render_version_check(&self, check: &VersionCheck) -> io::Result<()> {
        let state = if check.version_exists {
            self.styled(Style::new().green(), "published")
        } else {
            self.styled(Style::new().yellow(), "not published")
        };
        println!(
            "{}/{} {}: {state}",
            check.organization, check.provider, check.version
        );
        Ok(())
    }

    fn render_cleanup(&self, summary: &CleanupSummary) -> io::Result<()> {
        let mode = if summary.dry_run { " (dry run)" } else { "" };
        println!(
            "Retention{mode}: keeping the newest {} versions",
            summary.keep_count
        );

        if summary.results.is_empty() {
            println!("No providers found.");
            return Ok(());
        }

        let deleted_header = if summary.dry_run {
            "Would delete"
        } else {
            "Deleted"
        };
        let mut table = self.table(&["Provider", "Versions", "Kept", deleted_header, "Failed"]);
        for result in &summary.results {
            match result {
                ProviderCleanup::Cleaned(outcome) => {
                    let failed = outcome.failed_versions.len();
                    table.add_row(vec![
                        Cell::new(&outcome.provider),
                        Cell::new(outcome.total_versions),
                        Cell::new(outcome.kept_versions.len()),
                        Cell::new(outcome.deleted_count()),
                        if failed > 0 {
                            Cell::new(failed).fg(Color::Red)
                        } else {
                            Cell::new(failed)
                        },
                    ]);
                }
                ProviderCleanup::Failed { provider, error } => {
                    table.add_row(vec![
                        Cell::new(provider),
                        Cell::new("-"),
                        Cell::new("-"),
                        Cell::new("-"),
                        Cell::new(&error.message).fg(Color::Red),
                    ]);
                }
            }
        }
        println!("{table}");
        println!(
            "{} providers checked, {} cleaned, {} versions {}",
            summary.providers_checked,
            summary.providers_cleaned,
            summary.total_versions_deleted,
            if summary.dry_run { "would be deleted" } else { "deleted" }
        );
        Ok(())
    }

    fn render_key_list(&self, keys: &[GpgKeyRecord]) -> io::Result<()> {
        if keys.is_empty() {
            println!("No GPG keys registered.");
            return Ok(());
        }

        let mut headers = vec!["Key ID", "Namespace"];
        if self.verbose {
            headers.extend(["Source", "Created", "Updated"]);
        }
        let mut table = self.table(&headers);
        for key in keys {
            let mut row = vec![
                Cell::new(&key.key_id).add_attribute(Attribute::Bold),
                Cell::new(&key.namespace),
            ];
            if self.verbose {
                for value in [&key.source, &key.created_at, &key.updated_at] {
                    row.push(Cell::new(value.as_deref().unwrap_or("-")));
                }
            }
            table.add_row(row);
        }
        println!("{table}");
        Ok(())
    }

    fn render_key(&self, key: &GpgKeyRecord) -> io::Result<()> {
        println!("{}", self.styled(Style::new().bold(), &key.key_id));
        println!("Namespace: {}", key.namespace);
        if let Some(source) = &key.source {
            println!("Source:    {source}");
        }
        if let Some(created) = &key.created_at {
            println!("Created:   {created}");
        }
        if let Some(updated) = &key.updated_at {
            println!("Updated:   {updated}");
        }
        if let Some(armor) = &key.ascii_armor {
            println!();
            println!("{armor}");
        }
        Ok(())
    }

    fn render_signing_keys(&self, keys: &[GpgPublicKey], saved_to: &[String]) -> io::Result<()> {
        if keys.is_empty() {
            println!("The release lists no signing keys.");
            return Ok(());
        }

        let mut table = self.table(&["Key ID", "Source", "Source URL"]);
        for key in keys {
            table.add_row(vec![
                Cell::new(&key.key_id).add_attribute(Attribute::Bold),
                Cell::new(key.source.as_deref().unwrap_or("-")),
                Cell::new(key.source_url.as_deref().unwrap_or("-")),
            ]);
        }
        println!("{table}");

        if self.show_keys {
            for key in keys {
                println!();
                println!("{}", key.ascii_armor.trim_end());
            }
        }
        for path in saved_to {
            println!("Saved {path}");
        }
        Ok(())
    }

    fn table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
        if !self.supports_color() {
            table.force_no_tty();
        }
        table
    }

    fn styled(&self, style: Style, text: &str) -> String {
        if self.supports_color() {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Check if color output is supported
    pub fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}

/// Ask a yes/no question on stderr; anything but `y`/`yes` is a no
pub fn confirm(prompt: &str) -> io::Result<bool> {
    let term = Term::stderr();
    term.write_str(&format!("{prompt} [y/N] "))?;
    let answer = term.read_line()?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
