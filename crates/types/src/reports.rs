//! Registry listing records and operation results

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of a private-registry version listing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistryVersionRecord {
    /// Version string as published; not necessarily semantic
    pub version: String,
    /// Raw JSON:API attributes of the record
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl RegistryVersionRecord {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            attributes: Map::new(),
        }
    }
}

/// One entry of a private-registry provider listing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistryProviderRecord {
    pub name: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl RegistryProviderRecord {
    /// `registry-name` attribute, if the listing carried one
    #[must_use]
    pub fn registry_name(&self) -> Option<&str> {
        self.string_attribute("registry-name")
    }

    /// `namespace` attribute, if the listing carried one
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.string_attribute("namespace")
    }

    fn string_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Partition of a provider's versions into the ones to keep and to delete
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RetentionPlan {
    /// Newest first
    pub keep: Vec<RegistryVersionRecord>,
    pub delete: Vec<RegistryVersionRecord>,
}

impl RetentionPlan {
    #[must_use]
    pub fn total(&self) -> usize {
        self.keep.len() + self.delete.len()
    }

    #[must_use]
    pub fn kept_versions(&self) -> Vec<String> {
        self.keep.iter().map(|r| r.version.clone()).collect()
    }
}

/// Outcome of a successful publish
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub platforms_published: usize,
    pub registry_location: String,
}
