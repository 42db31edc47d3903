//! Client for the private registry's provider API

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use provmirror_errors::Error;
use provmirror_net::{NetClient, StatusPolicy};
use provmirror_types::{PlatformTarget, RegistryProviderRecord, RegistryTarget, RegistryVersionRecord};
use reqwest::{Body, Method};

use crate::api::ApiClient;
use crate::jsonapi::{PlatformAttributes, ProviderAttributes, VersionAttributes};
use crate::{ProviderRegistry, VersionUploadTargets};

/// Client for `{address}/api/v2/organizations/{org}/registry-providers`
#[derive(Debug, Clone)]
pub struct PrivateRegistryClient {
    api: ApiClient,
}

impl PrivateRegistryClient {
    #[must_use]
    pub fn new(net: NetClient, address: &str, token: impl Into<String>) -> Self {
        Self {
            api: ApiClient::new(net, address, token.into()),
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        self.api.address()
    }

    fn providers_url(&self, organization: &str) -> String {
        format!(
            "{}/api/v2/organizations/{organization}/registry-providers",
            self.api.address()
        )
    }

    fn provider_url(&self, target: &RegistryTarget) -> String {
        format!(
            "{}/{}/{}/{}",
            self.providers_url(&target.organization),
            target.registry_name,
            target.namespace,
            target.name
        )
    }

    fn version_url(&self, target: &RegistryTarget, version: &str) -> String {
        format!("{}/versions/{version}", self.provider_url(target))
    }
}

#[async_trait]
impl ProviderRegistry for PrivateRegistryClient {
    async fn provider_exists(&self, target: &RegistryTarget) -> Result<bool, Error> {
        self.api
            .exists(&self.provider_url(target), &target.to_string())
            .await
    }

    async fn create_provider(&self, target: &RegistryTarget) -> Result<(), Error> {
        let request = ApiClient::with_body(
            self.api
                .request(Method::POST, &self.providers_url(&target.organization)),
            "registry-providers",
            ProviderAttributes {
                name: &target.name,
                namespace: &target.namespace,
                registry_name: &target.registry_name,
            },
        )?;
        self.api
            .send(request, &target.to_string(), StatusPolicy::Create)
            .await?;
        tracing::debug!(provider = %target, "created provider");
        Ok(())
    }

    async fn list_providers(&self, organization: &str) -> Result<Vec<RegistryProviderRecord>, Error> {
        let start = self.providers_url(organization);
        let resources = self
            .api
            .list(start.clone(), &format!("providers of {organization}"))
            .await?;

        resources
            .into_iter()
            .map(|resource| {
                Ok(RegistryProviderRecord {
                    name: resource.required_attribute("name", &start)?,
                    attributes: resource.attributes,
                })
            })
            .collect()
    }

    async fn version_exists(&self, target: &RegistryTarget, version: &str) -> Result<bool, Error> {
        self.api
            .exists(
                &self.version_url(target, version),
                &format!("{target} {version}"),
            )
            .await
    }

    async fn create_version(
        &self,
        target: &RegistryTarget,
        version: &str,
        key_id: &str,
        protocols: &[String],
    ) -> Result<VersionUploadTargets, Error> {
        let url = format!("{}/versions", self.provider_url(target));
        let request = ApiClient::with_body(
            self.api.request(Method::POST, &url),
            "registry-provider-versions",
            VersionAttributes {
                version,
                key_id,
                protocols,
            },
        )?;
        let created = self
            .api
            .document(request, &format!("{target} {version}"), StatusPolicy::Create)
            .await?;

        Ok(VersionUploadTargets {
            checksums_upload: created.required_link("shasums-upload", &url)?,
            signature_upload: created.required_link("shasums-sig-upload", &url)?,
        })
    }

    async fn create_platform(
        &self,
        target: &RegistryTarget,
        version: &str,
        platform: &PlatformTarget,
        filename: &str,
        shasum: &str,
    ) -> Result<String, Error> {
        let url = format!("{}/platforms", self.version_url(target, version));
        let request = ApiClient::with_body(
            self.api.request(Method::POST, &url),
            "registry-provider-version-platforms",
            PlatformAttributes {
                os: &platform.os,
                arch: &platform.arch,
                shasum,
                filename,
            },
        )?;
        let created = self
            .api
            .document(
                request,
                &format!("{target} {version} {platform}"),
                StatusPolicy::Create,
            )
            .await?;
        created.required_link("provider-binary-upload", &url)
    }

    async fn list_versions(&self, target: &RegistryTarget) -> Result<Vec<RegistryVersionRecord>, Error> {
        let start = format!("{}/versions", self.provider_url(target));
        let resources = self
            .api
            .list(start.clone(), &format!("versions of {target}"))
            .await?;

        resources
            .into_iter()
            .map(|resource| {
                Ok(RegistryVersionRecord {
                    version: resource.required_attribute("version", &start)?,
                    attributes: resource.attributes,
                })
            })
            .collect()
    }

    async fn delete_version(&self, target: &RegistryTarget, version: &str) -> Result<(), Error> {
        let url = self.version_url(target, version);
        self.api
            .send(
                self.api.request(Method::DELETE, &url),
                &format!("{target} {version}"),
                StatusPolicy::Read,
            )
            .await?;
        tracing::debug!(provider = %target, version, "deleted version");
        Ok(())
    }

    async fn upload(
        &self,
        url: &str,
        body: BoxStream<'static, Result<Bytes, Error>>,
        length: u64,
    ) -> Result<(), Error> {
        self.api
            .net()
            .put_presigned(url, Body::wrap_stream(body), length)
            .await
    }

    fn registry_location(&self, target: &RegistryTarget, version: &str) -> String {
        format!(
            "{}/app/{}/registry/{}/providers/{}/{}/{version}",
            self.api.address(),
            target.organization,
            target.registry_name,
            target.namespace,
            target.name
        )
    }
}
