#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for provmirror
//!
//! This crate owns the HTTP client shared by the registry clients: explicit
//! per-call timeouts, the optional CA bundle, status-to-error mapping and
//! the cursor-based paginated lister.

mod client;
pub mod pagination;
pub mod response;

pub use client::{NetClient, NetConfig};
pub use pagination::{list_all, Page};
pub use response::{check_status, map_status, StatusPolicy};

use provmirror_errors::{Error, NetworkError};
use serde::de::DeserializeOwned;
use url::Url;

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed or invalid according to RFC 3986.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")).into())
}

/// Resolve a possibly relative link against a base address
///
/// Absolute links are returned unchanged. `/api/v2/...` style links are
/// appended to the base address, so a base path such as
/// `https://host/tfe` is kept.
///
/// # Errors
///
/// Returns an error if the base is not a valid URL or the link cannot be joined.
pub fn resolve_link(base: &str, link: &str) -> Result<String, Error> {
    let parsed = parse_url(base)?;
    if link.starts_with('/') {
        let joined = format!("{}{link}", base.trim_end_matches('/'));
        return parse_url(&joined).map(String::from);
    }
    parsed
        .join(link)
        .map(String::from)
        .map_err(|e| NetworkError::InvalidUrl(format!("{link}: {e}")).into())
}

/// Read a JSON response body
///
/// # Errors
///
/// Returns an error if the body cannot be read or does not decode as `T`.
pub async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
    let url = response.url().to_string();
    let text = response
        .text()
        .await
        .map_err(|e| NetworkError::DownloadFailed(format!("{url}: {e}")))?;
    serde_json::from_str(&text).map_err(|e| {
        provmirror_errors::RegistryError::InvalidResponse {
            url,
            message: e.to_string(),
        }
        .into()
    })
}
