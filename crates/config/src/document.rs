//! Provider sync documents
//!
//! A document is either one provider object or an array of them:
//!
//! ```json
//! [{"provider": "aws", "namespace": "hashicorp", "version": "latest",
//!   "gpg-key-id": "34365D9472D7468F",
//!   "platforms": [{"os": "linux", "arch": "amd64"}]}]
//! ```

use provmirror_errors::{ConfigError, Error};
use provmirror_types::{PlatformTarget, ProviderRef, VersionSpec, LATEST};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

const REQUIRED_FIELDS: [&str; 3] = ["provider", "namespace", "platforms"];

/// One provider to mirror
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub provider: String,
    pub namespace: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(rename = "gpg-key-id", default, skip_serializing_if = "Option::is_none")]
    pub gpg_key_id: Option<String>,
    pub platforms: Vec<PlatformTarget>,
}

impl ProviderEntry {
    #[must_use]
    pub fn provider_ref(&self) -> ProviderRef {
        ProviderRef::new(&self.namespace, &self.provider)
    }

    #[must_use]
    pub fn version_spec(&self) -> VersionSpec {
        VersionSpec::new(self.provider_ref(), &self.version)
    }
}

/// Every provider entry of a sync document, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProviderSyncDocument {
    pub providers: Vec<ProviderEntry>,
}

impl ProviderSyncDocument {
    /// Parse and validate a document
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed JSON or a top-level value that is
    /// neither an object nor an array, and a field error naming the entry
    /// index for missing or empty required fields.
    pub fn from_json(contents: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(contents).map_err(|e| ConfigError::ParseError {
            message: format!("invalid JSON in provider document: {e}"),
        })?;

        let raw_entries = match value {
            Value::Object(_) => vec![value],
            Value::Array(entries) => entries,
            _ => {
                return Err(ConfigError::ParseError {
                    message: "provider document must be an object or an array of objects"
                        .to_string(),
                }
                .into())
            }
        };

        let providers = raw_entries
            .into_iter()
            .enumerate()
            .map(|(index, raw)| parse_entry(index, raw))
            .collect::<Result<Vec<_>, Error>>()?;

        tracing::debug!(count = providers.len(), "parsed provider document");
        Ok(Self { providers })
    }

    /// Read and parse a document from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;
        Self::from_json(&contents)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

fn parse_entry(index: usize, raw: Value) -> Result<ProviderEntry, Error> {
    let Value::Object(fields) = &raw else {
        return Err(ConfigError::ParseError {
            message: format!("provider {index}: entry must be an object"),
        }
        .into());
    };

    for field in REQUIRED_FIELDS {
        if !fields.contains_key(field) || fields[field].is_null() {
            return Err(ConfigError::DocumentField {
                index,
                field: field.to_string(),
            }
            .into());
        }
    }

    let entry: ProviderEntry =
        serde_json::from_value(raw).map_err(|e| ConfigError::ParseError {
            message: format!("provider {index}: {e}"),
        })?;

    if entry.provider.trim().is_empty() {
        return Err(field_error(index, "provider"));
    }
    if entry.namespace.trim().is_empty() {
        return Err(field_error(index, "namespace"));
    }
    if entry.platforms.is_empty() {
        return Err(field_error(index, "platforms"));
    }
    if entry
        .platforms
        .iter()
        .any(|p| p.os.trim().is_empty() || p.arch.trim().is_empty())
    {
        return Err(ConfigError::InvalidValue {
            field: format!("provider {index}: platforms"),
            value: "platform with empty os or arch".to_string(),
        }
        .into());
    }

    Ok(entry)
}

fn field_error(index: usize, field: &str) -> Error {
    ConfigError::DocumentField {
        index,
        field: field.to_string(),
    }
    .into()
}

fn default_version() -> String {
    LATEST.to_string()
}
