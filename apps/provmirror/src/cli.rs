//! Command line interface definition

use clap::{ArgGroup, Args, Parser, Subcommand};
use provmirror_types::{ColorChoice, PlatformTarget};
use std::path::PathBuf;

/// provmirror - Mirror Terraform providers into a private registry
#[derive(Parser)]
#[command(name = "provmirror")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Mirror Terraform providers into a private registry")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Organization owning the private registry
    #[arg(long, global = true, value_name = "ORG")]
    pub organization: Option<String>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Sync every provider listed in a JSON document
    Sync {
        /// Provider document (object or array of objects)
        document: PathBuf,
    },

    /// Fetch a provider version into the artifact store
    Fetch {
        /// Source namespace (e.g. hashicorp)
        namespace: String,

        /// Provider name (e.g. aws)
        provider: String,

        /// Version to fetch, or "latest"
        #[arg(long, default_value = "latest")]
        version: String,

        /// Platform as os/arch; repeat for several
        #[arg(long = "platform", value_name = "OS/ARCH", required = true)]
        platforms: Vec<PlatformTarget>,

        /// GPG key id recorded in the manifest for the later publish
        #[arg(long, value_name = "ID")]
        gpg_key_id: Option<String>,
    },

    /// Publish a manifest previously written by fetch
    Publish {
        /// Manifest key printed by fetch
        #[arg(long, value_name = "KEY")]
        manifest: String,
    },

    /// Check whether a version is already published
    Check {
        /// Provider name
        provider: String,

        /// Version to look for
        version: String,
    },

    /// Delete all but the newest versions of private providers
    Cleanup {
        /// Only clean this provider
        #[arg(long, value_name = "NAME")]
        provider: Option<String>,

        /// Number of versions to keep (defaults to retention.keep_count)
        #[arg(long, value_name = "N")]
        keep: Option<usize>,

        /// Report what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage GPG keys of the private registry
    #[command(subcommand)]
    Keys(KeysCommands),
}

/// GPG key management commands
#[derive(Subcommand)]
pub enum KeysCommands {
    /// List keys registered for the organization
    List {
        /// Show sources and timestamps
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show one registered key
    Get {
        /// Key id
        key_id: String,
    },

    /// Download the signing keys of a public provider release
    Fetch {
        /// Source namespace (e.g. hashicorp)
        namespace: String,

        /// Provider name (e.g. aws)
        provider: String,

        /// Release to read the keys from (defaults to the latest)
        #[arg(long)]
        version: Option<String>,

        /// Print the ASCII-armored keys
        #[arg(long)]
        show_key: bool,

        /// Write the keys to this file
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Register a public key
    Create(KeyMaterialArgs),

    /// Replace the material of a registered key
    Update {
        /// Key id to update
        key_id: String,

        /// ASCII-armored key file; exported from the local keyring when omitted
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Delete a registered key
    Delete {
        /// Key id
        key_id: String,

        /// Do not ask for confirmation
        #[arg(long)]
        force: bool,
    },
}

/// Where the key to register comes from
#[derive(Args)]
#[command(group(ArgGroup::new("material").required(true).args(["file", "key_id"])))]
pub struct KeyMaterialArgs {
    /// ASCII-armored key file
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Export this key from the local keyring
    #[arg(long, value_name = "ID")]
    pub key_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn fetch_parses_platforms() {
        let cli = Cli::try_parse_from([
            "provmirror",
            "fetch",
            "hashicorp",
            "aws",
            "--version",
            "6.26.0",
            "--platform",
            "linux/amd64",
            "--platform",
            "darwin/arm64",
        ])
        .unwrap();

        let Commands::Fetch {
            platforms, version, ..
        } = cli.command
        else {
            panic!("expected fetch");
        };
        assert_eq!(version, "6.26.0");
        assert_eq!(platforms[1], PlatformTarget::new("darwin", "arm64"));
    }

    #[test]
    fn malformed_platform_is_rejected() {
        let result = Cli::try_parse_from([
            "provmirror",
            "fetch",
            "hashicorp",
            "aws",
            "--platform",
            "linux",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn keys_create_needs_a_source() {
        assert!(Cli::try_parse_from(["provmirror", "keys", "create"]).is_err());
        assert!(
            Cli::try_parse_from(["provmirror", "keys", "create", "--key-id", "ABC"]).is_ok()
        );
    }
}
