//! JSON:API envelopes used by the private registry

use provmirror_errors::{Error, RegistryError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub(crate) const MEDIA_TYPE: &str = "application/vnd.api+json";

/// Request body: `{"data": {"type": ..., "attributes": {...}}}`
#[derive(Debug, Serialize)]
pub(crate) struct Envelope<A> {
    data: NewResource<A>,
}

#[derive(Debug, Serialize)]
struct NewResource<A> {
    #[serde(rename = "type")]
    kind: &'static str,
    attributes: A,
}

impl<A: Serialize> Envelope<A> {
    pub(crate) fn new(kind: &'static str, attributes: A) -> Self {
        Self {
            data: NewResource { kind, attributes },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct ProviderAttributes<'a> {
    pub name: &'a str,
    pub namespace: &'a str,
    pub registry_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct VersionAttributes<'a> {
    pub version: &'a str,
    pub key_id: &'a str,
    pub protocols: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct PlatformAttributes<'a> {
    pub os: &'a str,
    pub arch: &'a str,
    pub shasum: &'a str,
    pub filename: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct GpgKeyAttributes<'a> {
    pub namespace: &'a str,
    pub ascii_armor: &'a str,
}

/// A resource as returned by the registry
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Resource {
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub links: Map<String, Value>,
}

impl Resource {
    /// A string attribute that must be present
    pub(crate) fn required_attribute(&self, name: &str, url: &str) -> Result<String, Error> {
        self.attributes
            .get(name)
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .ok_or_else(|| invalid(url, format!("missing attribute '{name}'")))
    }

    /// A link that must be present, e.g. a presigned upload target
    pub(crate) fn required_link(&self, name: &str, url: &str) -> Result<String, Error> {
        self.links
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .ok_or_else(|| invalid(url, format!("missing link '{name}'")))
    }
}

/// Single-resource response document
#[derive(Debug, Deserialize)]
pub(crate) struct Document {
    pub data: Resource,
}

/// Listing response document
#[derive(Debug, Deserialize)]
pub(crate) struct ListDocument {
    #[serde(default)]
    pub data: Vec<Resource>,
    #[serde(default)]
    pub links: ListLinks,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListLinks {
    #[serde(default)]
    pub next: Option<String>,
}

pub(crate) fn invalid(url: &str, message: String) -> Error {
    RegistryError::InvalidResponse {
        url: url.to_string(),
        message,
    }
    .into()
}
