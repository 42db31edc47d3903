//! provmirror - Mirror Terraform providers into a private registry
//!
//! This is the CLI application that drives the sync, retention and key
//! management operations of the ops crate.

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod setup;

use crate::cli::{Cli, Commands, KeysCommands};
use crate::display::{confirm, OutputRenderer};
use crate::error::CliError;
use crate::events::EventHandler;
use crate::setup::SystemSetup;
use clap::Parser;
use provmirror_config::{Config, ProviderSyncDocument};
use provmirror_errors::RegistryError;
use provmirror_events::{EventReceiver, EventSender};
use provmirror_ops::{KeySource, OperationResult};
use provmirror_types::{ColorChoice, ProviderRef, VersionSpec};
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
            if let Some(body) = e.remote_body() {
                eprintln!("  Remote response: {body}");
            }
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting provmirror v{}", env!("CARGO_PKG_VERSION"));

    // Precedence: defaults, then file, then environment, then flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global, &cli.command);
    config.validate()?;

    let color = cli.global.color.unwrap_or(config.general.color);
    let mut renderer = OutputRenderer::new(cli.global.json, color);
    match &cli.command {
        Commands::Keys(KeysCommands::List { verbose }) => renderer = renderer.verbose(*verbose),
        Commands::Keys(KeysCommands::Fetch { show_key, .. }) => {
            renderer = renderer.show_keys(*show_key);
        }
        _ => {}
    }

    let colors_enabled = match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let mut event_handler = EventHandler::new(colors_enabled, cli.global.json);

    let (event_sender, event_receiver) = provmirror_events::channel();
    let setup = SystemSetup::new(config);

    let result = execute_command_with_events(
        cli.command,
        &setup,
        event_sender,
        event_receiver,
        &mut event_handler,
    )
    .await?;

    renderer.render_result(&result)?;

    if !result.is_success() {
        return Err(CliError::Partial(
            "one or more operations failed; see the report above".to_string(),
        ));
    }

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    setup: &SystemSetup,
    event_sender: EventSender,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, setup, event_sender));

    loop {
        select! {
            result = &mut command_future => {
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    setup: &SystemSetup,
    tx: EventSender,
) -> Result<OperationResult, CliError> {
    match command {
        Commands::Sync { document } => {
            let document = ProviderSyncDocument::load(&document).await?;
            let ctx = setup.ops_context(tx).await?;
            let report = provmirror_ops::sync_all(&ctx, &document).await;
            Ok(OperationResult::SyncReport(report))
        }

        Commands::Fetch {
            namespace,
            provider,
            version,
            platforms,
            gpg_key_id,
        } => {
            let ctx = setup.ops_context(tx).await?;
            let spec = VersionSpec::new(ProviderRef::new(namespace, provider), version);
            let spec = provmirror_ops::resolve_version(&ctx, &spec).await?;
            let key = provmirror_ops::fetch_to_store(&ctx, &spec, &platforms, gpg_key_id.as_deref())
                .await?;
            Ok(OperationResult::ManifestStored { key })
        }

        Commands::Publish { manifest } => {
            let ctx = setup.ops_context(tx).await?;
            let result = provmirror_ops::publish_from_store(&ctx, &manifest).await?;
            Ok(OperationResult::Published(result))
        }

        Commands::Check { provider, version } => {
            let ctx = setup.ops_context(tx).await?;
            let check = provmirror_ops::check_version(&ctx, &provider, &version).await?;
            Ok(OperationResult::VersionCheck(check))
        }

        Commands::Cleanup { provider, .. } => {
            let ctx = setup.ops_context(tx).await?;
            let retention = &ctx.config.retention;
            let summary = provmirror_ops::cleanup_all(
                &ctx,
                retention.keep_count,
                retention.dry_run,
                provider.as_deref(),
            )
            .await?;
            Ok(OperationResult::Cleanup(summary))
        }

        Commands::Keys(keys_cmd) => execute_keys_command(keys_cmd, setup, tx).await,
    }
}

async fn execute_keys_command(
    command: KeysCommands,
    setup: &SystemSetup,
    tx: EventSender,
) -> Result<OperationResult, CliError> {
    match command {
        KeysCommands::Fetch {
            namespace,
            provider,
            version,
            output,
            ..
        } => {
            let source = setup.source_client()?;
            let keys = provmirror_ops::fetch_signing_keys(
                &source,
                &ProviderRef::new(namespace, provider),
                version.as_deref(),
            )
            .await?;
            let saved_to = match &output {
                Some(path) if !keys.is_empty() => {
                    provmirror_ops::save_signing_keys(&keys, path).await?
                }
                _ => Vec::new(),
            };
            Ok(OperationResult::SigningKeys {
                keys,
                saved_to: saved_to.iter().map(|p| p.display().to_string()).collect(),
            })
        }

        KeysCommands::List { .. } => {
            let client = setup.key_client().await?;
            let keys = provmirror_registry::KeyRegistry::list_keys(&client).await?;
            Ok(OperationResult::KeyList(keys))
        }

        KeysCommands::Get { key_id } => {
            let client = setup.key_client().await?;
            match provmirror_registry::KeyRegistry::get_key(&client, &key_id).await? {
                Some(key) => Ok(OperationResult::Key(key)),
                None => Err(key_not_found(&key_id)),
            }
        }

        KeysCommands::Create(material) => {
            let source = match (material.file, material.key_id) {
                (Some(file), _) => KeySource::File(file),
                (None, Some(key_id)) => KeySource::Keyring(key_id),
                (None, None) => {
                    return Err(CliError::InvalidArguments(
                        "either --file or --key-id must be specified".to_string(),
                    ))
                }
            };
            let client = setup.key_client().await?;
            let key = provmirror_ops::create_key(&tx, &client, &source).await?;
            Ok(OperationResult::Key(key))
        }

        KeysCommands::Update { key_id, file } => {
            let source = match file {
                Some(file) => KeySource::File(file),
                None => KeySource::Keyring(key_id.clone()),
            };
            let client = setup.key_client().await?;
            let key = provmirror_ops::update_key(&tx, &client, &key_id, &source).await?;
            Ok(OperationResult::Key(key))
        }

        KeysCommands::Delete { key_id, force } => {
            let client = setup.key_client().await?;
            if !force && !confirm(&format!("Delete GPG key {key_id}?"))? {
                return Err(CliError::Aborted);
            }
            if provmirror_registry::KeyRegistry::delete_key(&client, &key_id).await? {
                Ok(OperationResult::Success(format!("Deleted GPG key {key_id}")))
            } else {
                Err(key_not_found(&key_id))
            }
        }
    }
}

fn key_not_found(key_id: &str) -> CliError {
    CliError::Ops(
        RegistryError::NotFound {
            resource: format!("gpg key {key_id}"),
        }
        .into(),
    )
}

/// Initialize tracing/logging
///
/// Logs go to stderr so stdout carries only the rendered result.
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let default_filter = if debug_enabled {
        "info,provmirror=debug,provmirror_ops=debug,provmirror_registry=debug"
    } else if json_mode {
        "error"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    if json_mode {
        // JSON mode: machine-readable records on stderr
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else if debug_enabled {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .without_time()
            .with_target(false)
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs, command: &Commands) {
    if let Some(color) = global.color {
        config.general.color = color;
    }
    if let Some(organization) = &global.organization {
        config.registry.organization = Some(organization.clone());
    }

    if let Commands::Cleanup { keep, dry_run, .. } = command {
        if let Some(keep) = keep {
            config.retention.keep_count = *keep;
        }
        if *dry_run {
            config.retention.dry_run = true;
        }
    }
}
