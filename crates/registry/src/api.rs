//! Authenticated JSON:API plumbing shared by the private registry clients

use provmirror_errors::{Error, OpsError};
use provmirror_net::{check_status, list_all, read_json, resolve_link, NetClient, Page, StatusPolicy};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use std::fmt;

use crate::jsonapi::{Document, Envelope, ListDocument, Resource, MEDIA_TYPE};

#[derive(Clone)]
pub(crate) struct ApiClient {
    net: NetClient,
    address: String,
    token: String,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("address", &self.address)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub(crate) fn new(net: NetClient, address: &str, token: String) -> Self {
        Self {
            net,
            address: address.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub(crate) fn address(&self) -> &str {
        &self.address
    }

    pub(crate) fn net(&self) -> &NetClient {
        &self.net
    }

    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.net
            .request(method, url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, MEDIA_TYPE)
            .header(ACCEPT, MEDIA_TYPE)
    }

    /// Attach a `{"data": {"type", "attributes"}}` body
    pub(crate) fn with_body<A: Serialize>(
        builder: RequestBuilder,
        kind: &'static str,
        attributes: A,
    ) -> Result<RequestBuilder, Error> {
        let body = serde_json::to_vec(&Envelope::new(kind, attributes)).map_err(|e| {
            OpsError::SerializationError {
                message: format!("failed to encode {kind} request: {e}"),
            }
        })?;
        Ok(builder.body(body))
    }

    pub(crate) async fn send(
        &self,
        builder: RequestBuilder,
        resource: &str,
        policy: StatusPolicy,
    ) -> Result<Response, Error> {
        let response = self.net.send(builder, self.net.config().api_timeout).await?;
        check_status(response, resource, policy).await
    }

    /// Send and decode a single-resource document
    pub(crate) async fn document(
        &self,
        builder: RequestBuilder,
        resource: &str,
        policy: StatusPolicy,
    ) -> Result<Resource, Error> {
        let response = self.send(builder, resource, policy).await?;
        let document: Document = read_json(response).await?;
        Ok(document.data)
    }

    /// `true` on success, `false` on 404
    pub(crate) async fn exists(&self, url: &str, resource: &str) -> Result<bool, Error> {
        match self
            .send(self.request(Method::GET, url), resource, StatusPolicy::Read)
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Every resource of a paginated listing, following `links.next`
    pub(crate) async fn list(&self, start: String, resource: &str) -> Result<Vec<Resource>, Error> {
        list_all(start, |url| async move {
            let response = self
                .send(self.request(Method::GET, &url), resource, StatusPolicy::Read)
                .await?;
            let listing: ListDocument = read_json(response).await?;
            let next = listing
                .links
                .next
                .filter(|link| !link.is_empty())
                .map(|link| resolve_link(&self.address, &link))
                .transpose()?;
            Ok(Page {
                items: listing.data,
                next,
            })
        })
        .await
    }
}
