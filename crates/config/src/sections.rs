//! Configuration sections

use crate::constants::{
    DEFAULT_PROTOCOLS, DEFAULT_REGISTRY_ADDRESS, DEFAULT_REGISTRY_NAME, DEFAULT_SOURCE_ADDRESS,
    DEFAULT_TOKEN_ENV,
};
use provmirror_types::{ColorChoice, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneralConfig {
    #[serde(default)]
    pub default_output: OutputFormat,
    #[serde(default)]
    pub color: ColorChoice,
}

/// Private registry (HCP Terraform / Terraform Enterprise)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_address")]
    pub address: String,
    #[serde(default)]
    pub organization: Option<String>,
    /// Name of the environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// File holding the bearer token, used when the variable is unset
    #[serde(default)]
    pub token_file: Option<PathBuf>,
    /// Plugin protocols advertised for new versions
    #[serde(default = "default_protocols")]
    pub protocols: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            address: default_registry_address(),
            organization: None,
            token_env: default_token_env(),
            token_file: None,
            protocols: default_protocols(),
        }
    }
}

/// Public source registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_address")]
    pub address: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            address: default_source_address(),
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_api_timeout")]
    pub api_timeout: u64, // seconds
    #[serde(default = "default_source_timeout")]
    pub source_timeout: u64, // seconds
    #[serde(default = "default_transfer_timeout")]
    pub transfer_timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    /// PEM bundle trusted in addition to the system roots
    #[serde(default)]
    pub ca_bundle: Option<PathBuf>,
}

impl NetworkConfig {
    #[must_use]
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout)
    }

    #[must_use]
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout)
    }

    #[must_use]
    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_timeout: default_api_timeout(),
            source_timeout: default_source_timeout(),
            transfer_timeout: default_transfer_timeout(),
            connect_timeout: default_connect_timeout(),
            ca_bundle: None,
        }
    }
}

/// Fetch/publish configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Artifact store root for fetch-only runs; the user data directory
    /// when unset. Single-process syncs always use a temporary directory.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default = "default_parallel_downloads")]
    pub parallel_downloads: usize,
    #[serde(default = "default_parallel_uploads")]
    pub parallel_uploads: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            parallel_downloads: default_parallel_downloads(),
            parallel_uploads: default_parallel_uploads(),
        }
    }
}

/// Retention configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    #[serde(default = "default_keep_count")]
    pub keep_count: usize,
    #[serde(default)]
    pub dry_run: bool,
    /// Registry name used when a listed provider carries none
    #[serde(default = "default_registry_name")]
    pub default_registry_name: String,
    /// Namespace used when a listed provider carries none; the organization when unset
    #[serde(default)]
    pub default_namespace: Option<String>,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            keep_count: default_keep_count(),
            dry_run: false,
            default_registry_name: default_registry_name(),
            default_namespace: None,
        }
    }
}

// Default value functions for serde
fn default_registry_address() -> String {
    DEFAULT_REGISTRY_ADDRESS.to_string()
}

fn default_source_address() -> String {
    DEFAULT_SOURCE_ADDRESS.to_string()
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

fn default_protocols() -> Vec<String> {
    DEFAULT_PROTOCOLS.iter().map(ToString::to_string).collect()
}

fn default_api_timeout() -> u64 {
    10
}

fn default_source_timeout() -> u64 {
    30
}

fn default_transfer_timeout() -> u64 {
    300 // 5 minutes
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_parallel_downloads() -> usize {
    4
}

fn default_parallel_uploads() -> usize {
    1
}

fn default_keep_count() -> usize {
    10
}

fn default_registry_name() -> String {
    DEFAULT_REGISTRY_NAME.to_string()
}
