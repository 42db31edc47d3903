#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for provmirror
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/provmirror/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)
//!
//! It also parses provider sync documents, the JSON files listing which
//! providers to mirror.

pub mod constants;
pub mod sections;
pub mod document;

pub use sections::{
    GeneralConfig, NetworkConfig, RegistryConfig, RetentionConfig, SourceConfig, SyncConfig,
};
pub use document::{ProviderEntry, ProviderSyncDocument};

use constants::{
    ENV_ADDRESS, ENV_CA_BUNDLE, ENV_DRY_RUN, ENV_KEEP_COUNT, ENV_ORGANIZATION, ENV_STORE_PATH,
    ENV_TFC_ADDRESS, ENV_TFC_ORGANIZATION,
};
use provmirror_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub retention: RetentionConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("provmirror").join("config.toml"))
    }

    /// Default root of the artifact store used by the split fetch/publish flow
    ///
    /// # Errors
    ///
    /// Returns an error if the system data directory cannot be determined.
    pub fn default_store_path() -> Result<PathBuf, Error> {
        let data_dir = dirs::data_local_dir().ok_or_else(|| ConfigError::NotFound {
            path: "data directory".to_string(),
        })?;
        Ok(data_dir.join("provmirror").join("store"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for [`Config`].
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading configuration");
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_env_from(|name| std::env::var(name).ok())
    }

    /// Merge values from an arbitrary variable lookup
    ///
    /// `PROVMIRROR_*` variables take precedence over the `TFC_*` aliases.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds a value of the wrong type.
    pub fn merge_env_from<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(address) = non_empty(ENV_ADDRESS).or_else(|| non_empty(ENV_TFC_ADDRESS)) {
            self.registry.address = address;
        }

        if let Some(organization) =
            non_empty(ENV_ORGANIZATION).or_else(|| non_empty(ENV_TFC_ORGANIZATION))
        {
            self.registry.organization = Some(organization);
        }

        if let Some(keep) = non_empty(ENV_KEEP_COUNT) {
            self.retention.keep_count =
                keep.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    field: ENV_KEEP_COUNT.to_string(),
                    value: keep,
                })?;
        }

        if let Some(dry_run) = non_empty(ENV_DRY_RUN) {
            self.retention.dry_run = parse_bool(ENV_DRY_RUN, &dry_run)?;
        }

        if let Some(bundle) = non_empty(ENV_CA_BUNDLE) {
            self.network.ca_bundle = Some(PathBuf::from(bundle));
        }

        if let Some(store) = non_empty(ENV_STORE_PATH) {
            self.sync.store_path = Some(PathBuf::from(store));
        }

        Ok(())
    }

    /// Check values that serde cannot
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> Result<(), Error> {
        if self.sync.parallel_downloads == 0 {
            return Err(invalid("sync.parallel_downloads", "0"));
        }
        if self.sync.parallel_uploads == 0 {
            return Err(invalid("sync.parallel_uploads", "0"));
        }
        if self.registry.protocols.is_empty() {
            return Err(invalid("registry.protocols", "[]"));
        }
        if self.registry.address.trim().is_empty() {
            return Err(invalid("registry.address", ""));
        }
        if self.source.address.trim().is_empty() {
            return Err(invalid("source.address", ""));
        }
        Ok(())
    }

    /// The organization owning the private registry
    ///
    /// # Errors
    ///
    /// Returns an error if no organization is configured.
    pub fn organization(&self) -> Result<&str, Error> {
        self.registry
            .organization
            .as_deref()
            .filter(|o| !o.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::MissingField {
                    field: "registry.organization".to_string(),
                }
                .into()
            })
    }

    /// Namespace used for listed providers that carry none
    #[must_use]
    pub fn default_namespace<'a>(&'a self, organization: &'a str) -> &'a str {
        self.retention
            .default_namespace
            .as_deref()
            .unwrap_or(organization)
    }

    /// Read the private registry bearer token
    ///
    /// The variable named by `registry.token_env` wins; `registry.token_file`
    /// is read when the variable is unset.
    ///
    /// # Errors
    ///
    /// Returns an error if neither source yields a non-empty token.
    pub async fn registry_token(&self) -> Result<String, Error> {
        if let Some(token) = std::env::var(&self.registry.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
        {
            return Ok(token);
        }

        if let Some(path) = &self.registry.token_file {
            let contents =
                fs::read_to_string(path)
                    .await
                    .map_err(|e| ConfigError::InvalidValue {
                        field: "registry.token_file".to_string(),
                        value: format!("{}: {e}", path.display()),
                    })?;
            let token = contents.trim();
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }

        Err(ConfigError::EnvVarNotFound {
            var: self.registry.token_env.clone(),
        }
        .into())
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(invalid(field, value)),
    }
}

fn invalid(field: &str, value: &str) -> Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}
