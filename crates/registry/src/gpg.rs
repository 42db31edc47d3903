//! GPG key management on the private registry

use async_trait::async_trait;
use provmirror_errors::Error;
use provmirror_net::{read_json, NetClient, StatusPolicy};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiClient;
use crate::jsonapi::{GpgKeyAttributes, ListDocument, Resource};
use crate::KeyRegistry;

/// A GPG key registered for an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpgKeyRecord {
    pub key_id: String,
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ascii_armor: Option<String>,
}

impl GpgKeyRecord {
    fn from_resource(resource: &Resource, url: &str) -> Result<Self, Error> {
        let text = |name: &str| {
            resource
                .attributes
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
        };
        Ok(Self {
            key_id: resource.required_attribute("key-id", url)?,
            namespace: text("namespace").unwrap_or_default(),
            source: text("source"),
            created_at: text("created-at"),
            updated_at: text("updated-at"),
            ascii_armor: text("ascii-armor"),
        })
    }
}

/// Client for `{address}/api/registry/private/v2/gpg-keys`
#[derive(Debug, Clone)]
pub struct GpgKeyClient {
    api: ApiClient,
    organization: String,
}

impl GpgKeyClient {
    #[must_use]
    pub fn new(
        net: NetClient,
        address: &str,
        organization: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            api: ApiClient::new(net, address, token.into()),
            organization: organization.into(),
        }
    }

    fn keys_url(&self) -> String {
        format!("{}/api/registry/private/v2/gpg-keys", self.api.address())
    }

    fn key_url(&self, key_id: &str) -> String {
        format!("{}/{}/{key_id}", self.keys_url(), self.organization)
    }

    fn armor_body(
        &self,
        method: Method,
        url: &str,
        ascii_armor: &str,
    ) -> Result<reqwest::RequestBuilder, Error> {
        ApiClient::with_body(
            self.api.request(method, url),
            "gpg-keys",
            GpgKeyAttributes {
                namespace: &self.organization,
                ascii_armor,
            },
        )
    }
}

#[async_trait]
impl KeyRegistry for GpgKeyClient {
    async fn list_keys(&self) -> Result<Vec<GpgKeyRecord>, Error> {
        let url = self.keys_url();
        let request = self
            .api
            .request(Method::GET, &url)
            .query(&[("filter[namespace]", self.organization.as_str())]);
        let response = self
            .api
            .send(request, &format!("GPG keys of {}", self.organization), StatusPolicy::Read)
            .await?;
        let listing: ListDocument = read_json(response).await?;
        listing
            .data
            .iter()
            .map(|resource| GpgKeyRecord::from_resource(resource, &url))
            .collect()
    }

    async fn get_key(&self, key_id: &str) -> Result<Option<GpgKeyRecord>, Error> {
        let url = self.key_url(key_id);
        match self
            .api
            .document(
                self.api.request(Method::GET, &url),
                &format!("GPG key {key_id}"),
                StatusPolicy::Read,
            )
            .await
        {
            Ok(resource) => GpgKeyRecord::from_resource(&resource, &url).map(Some),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn create_key(&self, ascii_armor: &str) -> Result<GpgKeyRecord, Error> {
        let url = self.keys_url();
        let request = self.armor_body(Method::POST, &url, ascii_armor)?;
        let created = self
            .api
            .document(request, "GPG key", StatusPolicy::Create)
            .await?;
        GpgKeyRecord::from_resource(&created, &url)
    }

    async fn update_key(&self, key_id: &str, ascii_armor: &str) -> Result<GpgKeyRecord, Error> {
        let url = self.key_url(key_id);
        let request = self.armor_body(Method::PATCH, &url, ascii_armor)?;
        let updated = self
            .api
            .document(request, &format!("GPG key {key_id}"), StatusPolicy::Read)
            .await?;
        GpgKeyRecord::from_resource(&updated, &url)
    }

    async fn delete_key(&self, key_id: &str) -> Result<bool, Error> {
        let url = self.key_url(key_id);
        match self
            .api
            .send(
                self.api.request(Method::DELETE, &url),
                &format!("GPG key {key_id}"),
                StatusPolicy::Read,
            )
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }
}
