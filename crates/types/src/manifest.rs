//! Artifact manifests produced by a fetch and consumed by a publish

use crate::{PlatformTarget, ProviderRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque key of an artifact inside an artifact store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactLocation(String);

impl ArtifactLocation {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored artifact and the filename it is registered under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub filename: String,
    pub location: ArtifactLocation,
}

/// A stored provider binary for one platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryRef {
    pub platform: PlatformTarget,
    pub filename: String,
    pub location: ArtifactLocation,
}

/// Everything a fetch produced for one provider version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub binaries: Vec<BinaryRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksums: Option<ArtifactRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<ArtifactRef>,
}

/// Accumulates a manifest while platforms are resolved.
///
/// The checksum manifest and signature are shared by every platform of a
/// version; each slot accepts exactly one value and later assignments are
/// refused.
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    binaries: Vec<BinaryRef>,
    checksums: Option<ArtifactRef>,
    signature: Option<ArtifactRef>,
}

impl ManifestBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_binary(&mut self, binary: BinaryRef) {
        self.binaries.push(binary);
    }

    #[must_use]
    pub fn has_checksums(&self) -> bool {
        self.checksums.is_some()
    }

    #[must_use]
    pub fn has_signature(&self) -> bool {
        self.signature.is_some()
    }

    /// Returns `false` if the checksum manifest was already set
    pub fn set_checksums(&mut self, artifact: ArtifactRef) -> bool {
        if self.checksums.is_some() {
            return false;
        }
        self.checksums = Some(artifact);
        true
    }

    /// Returns `false` if the signature was already set
    pub fn set_signature(&mut self, artifact: ArtifactRef) -> bool {
        if self.signature.is_some() {
            return false;
        }
        self.signature = Some(artifact);
        true
    }

    #[must_use]
    pub fn build(self) -> ArtifactManifest {
        ArtifactManifest {
            binaries: self.binaries,
            checksums: self.checksums,
            signature: self.signature,
        }
    }
}

/// A manifest persisted to the artifact store between fetch and publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredManifest {
    pub provider: String,
    pub namespace: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpg_key_id: Option<String>,
    pub manifest: ArtifactManifest,
}

impl StoredManifest {
    #[must_use]
    pub fn provider_ref(&self) -> ProviderRef {
        ProviderRef::new(&self.namespace, &self.provider)
    }

    /// Store key the manifest is written under
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}manifest.json", store_prefix(&self.provider, &self.version))
    }
}

/// Store prefix holding every artifact of one provider version
#[must_use]
pub fn store_prefix(provider: &str, version: &str) -> String {
    format!("tmp/{provider}/{version}/")
}

#[must_use]
pub fn binary_filename(provider: &str, version: &str, platform: &PlatformTarget) -> String {
    format!(
        "terraform-provider-{provider}_{version}_{}_{}.zip",
        platform.os, platform.arch
    )
}

#[must_use]
pub fn checksums_filename(provider: &str, version: &str) -> String {
    format!("terraform-provider-{provider}_{version}_SHA256SUMS")
}

#[must_use]
pub fn signature_filename(provider: &str, version: &str) -> String {
    format!("terraform-provider-{provider}_{version}_SHA256SUMS.sig")
}
