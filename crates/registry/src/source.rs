//! Read-only client for the public provider registry

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use provmirror_errors::{Error, RegistryError};
use provmirror_net::{check_status, read_json, NetClient, StatusPolicy};
use provmirror_types::{PlatformTarget, ProviderRef, VersionSpec};
use serde::{Deserialize, Serialize};

use crate::SourceRegistry;

/// Where to download one platform build from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadDescriptor {
    pub download_url: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub shasum: Option<String>,
    #[serde(default)]
    pub shasums_url: Option<String>,
    #[serde(default)]
    pub shasums_signature_url: Option<String>,
    #[serde(default)]
    pub signing_keys: SigningKeys,
}

impl DownloadDescriptor {
    /// Checksum manifest URL, if the registry published one
    #[must_use]
    pub fn checksums_url(&self) -> Option<&str> {
        self.shasums_url.as_deref().filter(|u| !u.is_empty())
    }

    /// Detached signature URL, if the registry published one
    #[must_use]
    pub fn signature_url(&self) -> Option<&str> {
        self.shasums_signature_url
            .as_deref()
            .filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SigningKeys {
    #[serde(default)]
    pub gpg_public_keys: Vec<GpgPublicKey>,
}

/// A public key the provider's releases are signed with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpgPublicKey {
    pub key_id: String,
    pub ascii_armor: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

#[derive(Deserialize)]
struct ProviderSummary {
    #[serde(default)]
    version: Option<String>,
}

/// Client for `{address}/v1/providers`
#[derive(Debug, Clone)]
pub struct SourceClient {
    net: NetClient,
    base: String,
}

impl SourceClient {
    /// `address` is the registry root, e.g. `https://registry.terraform.io`
    #[must_use]
    pub fn new(net: NetClient, address: &str) -> Self {
        Self {
            net,
            base: format!("{}/v1/providers", address.trim_end_matches('/')),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        resource: &str,
    ) -> Result<T, Error> {
        let response = self.net.get(url, self.net.config().source_timeout).await?;
        let response = check_status(response, resource, StatusPolicy::Read).await?;
        read_json(response).await
    }
}

#[async_trait]
impl SourceRegistry for SourceClient {
    async fn latest_version(&self, provider: &ProviderRef) -> Result<String, Error> {
        let url = format!("{}/{}/{}", self.base, provider.namespace, provider.name);
        let summary: ProviderSummary = self.get_json(&url, &provider.to_string()).await?;

        let version = summary
            .version
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| RegistryError::NotFound {
                resource: format!("latest version of {provider}"),
            })?;
        tracing::debug!(provider = %provider, version = %version, "resolved latest version");
        Ok(version)
    }

    async fn download_descriptor(
        &self,
        spec: &VersionSpec,
        platform: &PlatformTarget,
    ) -> Result<DownloadDescriptor, Error> {
        let url = format!(
            "{}/{}/{}/{}/download/{}/{}",
            self.base,
            spec.provider.namespace,
            spec.provider.name,
            spec.version,
            platform.os,
            platform.arch
        );
        self.get_json(&url, &format!("{spec} {platform}")).await
    }

    async fn open_artifact(&self, url: &str) -> Result<BoxStream<'static, Result<Bytes, Error>>, Error> {
        self.net.open_stream(url).await
    }
}
