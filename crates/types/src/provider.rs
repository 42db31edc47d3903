//! Provider coordinates: who, which version, which platforms

use provmirror_errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The version token that must be resolved before anything is downloaded
pub const LATEST: &str = "latest";

/// A provider in a registry, e.g. `hashicorp/aws`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderRef {
    pub namespace: String,
    pub name: String,
}

impl ProviderRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ProviderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A provider at a version that may still be the `latest` token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSpec {
    pub provider: ProviderRef,
    pub version: String,
}

impl VersionSpec {
    pub fn new(provider: ProviderRef, version: impl Into<String>) -> Self {
        Self {
            provider,
            version: version.into(),
        }
    }

    /// Whether the version still needs resolving
    #[must_use]
    pub fn is_latest(&self) -> bool {
        self.version.trim().eq_ignore_ascii_case(LATEST)
    }

    /// Replace the version with a concrete one
    #[must_use]
    pub fn resolved(self, version: impl Into<String>) -> Self {
        Self {
            provider: self.provider,
            version: version.into(),
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.provider, self.version)
    }
}

/// An (OS, architecture) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformTarget {
    pub os: String,
    pub arch: String,
}

impl PlatformTarget {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

impl FromStr for PlatformTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((os, arch))
                if !os.is_empty() && !arch.is_empty() && !arch.contains('/') =>
            {
                Ok(Self::new(os, arch))
            }
            _ => Err(ConfigError::InvalidValue {
                field: "platform".to_string(),
                value: format!("{s} (expected os/arch)"),
            }),
        }
    }
}

/// Full address of a provider in the private registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryTarget {
    pub organization: String,
    pub registry_name: String,
    pub namespace: String,
    pub name: String,
}

impl RegistryTarget {
    /// A provider in the organization's private registry, namespaced by the
    /// organization itself
    pub fn private(organization: impl Into<String>, name: impl Into<String>) -> Self {
        let organization = organization.into();
        Self {
            namespace: organization.clone(),
            organization,
            registry_name: "private".to_string(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn provider(&self) -> ProviderRef {
        ProviderRef::new(&self.namespace, &self.name)
    }
}

impl fmt::Display for RegistryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.organization, self.registry_name, self.namespace, self.name
        )
    }
}
