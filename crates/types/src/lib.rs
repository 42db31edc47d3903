#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for provmirror
//!
//! This crate provides the data model shared by the registry clients and
//! the sync/retention operations: provider coordinates, artifact manifests,
//! registry listing records and the version ordering used by retention.

pub mod manifest;
pub mod provider;
pub mod reports;
pub mod version;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use manifest::{
    binary_filename, checksums_filename, signature_filename, store_prefix, ArtifactLocation,
    ArtifactManifest, ArtifactRef, BinaryRef, ManifestBuilder, StoredManifest,
};
pub use provider::{PlatformTarget, ProviderRef, RegistryTarget, VersionSpec, LATEST};
pub use reports::{
    PublishResult, RegistryProviderRecord, RegistryVersionRecord, RetentionPlan,
};
pub use version::VersionKey;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    #[default]
    Tty,
    Json,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    #[default]
    Auto,
    Never,
}

impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}
