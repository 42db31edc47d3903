#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Registry clients for provmirror
//!
//! Three remotes are involved in a mirror run: the public source registry
//! that artifacts are fetched from, the private registry's provider API
//! that they are published to, and the private registry's GPG key API.
//! Each is reached through a trait so the sync and retention operations
//! can run against in-memory doubles.

mod api;
mod gpg;
mod jsonapi;
mod private;
mod source;

pub use gpg::{GpgKeyClient, GpgKeyRecord};
pub use private::PrivateRegistryClient;
pub use source::{DownloadDescriptor, GpgPublicKey, SigningKeys, SourceClient};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use provmirror_errors::Error;
use provmirror_types::{
    PlatformTarget, ProviderRef, RegistryProviderRecord, RegistryTarget, RegistryVersionRecord,
    VersionSpec,
};

/// Platform used when only the signing keys of a release are wanted
const KEY_LOOKUP_PLATFORM: (&str, &str) = ("linux", "amd64");

/// Presigned targets returned when a version is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionUploadTargets {
    pub checksums_upload: String,
    pub signature_upload: String,
}

/// The public registry artifacts are mirrored from
#[async_trait]
pub trait SourceRegistry: Send + Sync {
    /// Newest published version of a provider
    async fn latest_version(&self, provider: &ProviderRef) -> Result<String, Error>;

    /// Download locations for one platform build of a concrete version
    async fn download_descriptor(
        &self,
        spec: &VersionSpec,
        platform: &PlatformTarget,
    ) -> Result<DownloadDescriptor, Error>;

    /// Stream an artifact from a URL taken from a descriptor
    async fn open_artifact(&self, url: &str) -> Result<BoxStream<'static, Result<Bytes, Error>>, Error>;

    /// Keys the release is signed with; the latest version when `version` is `None`
    async fn signing_keys(
        &self,
        provider: &ProviderRef,
        version: Option<&str>,
    ) -> Result<Vec<GpgPublicKey>, Error> {
        let version = match version {
            Some(version) => version.to_string(),
            None => self.latest_version(provider).await?,
        };
        let spec = VersionSpec::new(provider.clone(), version);
        let (os, arch) = KEY_LOOKUP_PLATFORM;
        let descriptor = self
            .download_descriptor(&spec, &PlatformTarget::new(os, arch))
            .await?;
        Ok(descriptor.signing_keys.gpg_public_keys)
    }
}

/// The private registry's provider API
#[async_trait]
pub trait ProviderRegistry: Send + Sync {
    async fn provider_exists(&self, target: &RegistryTarget) -> Result<bool, Error>;

    /// Create the provider; fails with `Conflict` if it exists
    async fn create_provider(&self, target: &RegistryTarget) -> Result<(), Error>;

    /// Every provider of an organization, across all pages
    async fn list_providers(&self, organization: &str) -> Result<Vec<RegistryProviderRecord>, Error>;

    async fn version_exists(&self, target: &RegistryTarget, version: &str) -> Result<bool, Error>;

    /// Create a version; an existing version fails with `Conflict`
    async fn create_version(
        &self,
        target: &RegistryTarget,
        version: &str,
        key_id: &str,
        protocols: &[String],
    ) -> Result<VersionUploadTargets, Error>;

    /// Register one platform build and return its binary upload target
    async fn create_platform(
        &self,
        target: &RegistryTarget,
        version: &str,
        platform: &PlatformTarget,
        filename: &str,
        shasum: &str,
    ) -> Result<String, Error>;

    /// Every version of a provider, across all pages
    async fn list_versions(&self, target: &RegistryTarget) -> Result<Vec<RegistryVersionRecord>, Error>;

    /// Delete a version; an absent version fails with `NotFound`
    async fn delete_version(&self, target: &RegistryTarget, version: &str) -> Result<(), Error>;

    /// PUT raw bytes to a presigned upload target
    async fn upload(
        &self,
        url: &str,
        body: BoxStream<'static, Result<Bytes, Error>>,
        length: u64,
    ) -> Result<(), Error>;

    /// Human-facing location of a published version
    fn registry_location(&self, target: &RegistryTarget, version: &str) -> String;
}

/// The private registry's GPG key API
#[async_trait]
pub trait KeyRegistry: Send + Sync {
    async fn list_keys(&self) -> Result<Vec<GpgKeyRecord>, Error>;

    /// `None` when the key does not exist
    async fn get_key(&self, key_id: &str) -> Result<Option<GpgKeyRecord>, Error>;

    async fn create_key(&self, ascii_armor: &str) -> Result<GpgKeyRecord, Error>;

    async fn update_key(&self, key_id: &str, ascii_armor: &str) -> Result<GpgKeyRecord, Error>;

    /// `false` when the key did not exist
    async fn delete_key(&self, key_id: &str) -> Result<bool, Error>;
}
