//! HTTP client with connection pooling and per-call timeouts

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use provmirror_config::NetworkConfig;
use provmirror_errors::{ConfigError, Error, NetworkError};
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, Certificate, Client, Method, RequestBuilder, Response};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::response::{check_status, StatusPolicy};

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    /// Timeout for private registry API calls
    pub api_timeout: Duration,
    /// Timeout for source registry metadata calls
    pub source_timeout: Duration,
    /// Timeout for artifact downloads and uploads
    pub transfer_timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
    /// Extra trusted roots, PEM encoded
    pub ca_bundle: Option<PathBuf>,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            api_timeout: Duration::from_secs(10),
            source_timeout: Duration::from_secs(30),
            transfer_timeout: Duration::from_secs(300), // 5 minutes for large binaries
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: format!("provmirror/{}", env!("CARGO_PKG_VERSION")),
            ca_bundle: None,
        }
    }
}

impl NetConfig {
    /// Build from the `[network]` configuration section
    #[must_use]
    pub fn from_config(network: &NetworkConfig) -> Self {
        Self {
            api_timeout: network.api_timeout(),
            source_timeout: network.source_timeout(),
            transfer_timeout: network.transfer_timeout(),
            connect_timeout: network.connect_timeout(),
            ca_bundle: network.ca_bundle.clone(),
            ..Self::default()
        }
    }

    /// The same configuration without the extra trusted roots
    #[must_use]
    pub fn without_ca_bundle(mut self) -> Self {
        self.ca_bundle = None;
        self
    }
}

/// HTTP client wrapper
///
/// Requests are never retried; every call carries an explicit timeout and
/// its failure is reported as-is.
#[derive(Clone, Debug)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a CA bundle is configured but cannot
    /// be read or holds no certificate, and a network error if the
    /// underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent);

        if let Some(path) = &config.ca_bundle {
            for certificate in load_ca_bundle(path)? {
                builder = builder.add_root_certificate(certificate);
            }
            tracing::debug!(path = %path.display(), "trusting additional CA bundle");
        }

        let client = builder
            .build()
            .map_err(|e| NetworkError::ClientSetup(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Start a request; callers add headers and body, then [`NetClient::send`]
    #[must_use]
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Send a request with the given timeout
    ///
    /// # Errors
    ///
    /// Returns a network error on timeout or connection failure. HTTP status
    /// codes are not inspected here.
    pub async fn send(&self, request: RequestBuilder, timeout: Duration) -> Result<Response, Error> {
        let request = request
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;
        let url = request.url().to_string();
        tracing::debug!(method = %request.method(), url = %url, "sending request");

        self.client
            .execute(request)
            .await
            .map_err(|e| map_reqwest_error(&e, &url).into())
    }

    /// GET with the given timeout
    ///
    /// # Errors
    ///
    /// Returns a network error on timeout or connection failure.
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<Response, Error> {
        self.send(self.request(Method::GET, url), timeout).await
    }

    /// Open a download as a byte stream under the transfer timeout
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for 404, a network error for any other non-success
    /// status or transport failure. Errors while streaming surface as stream
    /// items.
    pub async fn open_stream(
        &self,
        url: &str,
    ) -> Result<BoxStream<'static, Result<Bytes, Error>>, Error> {
        let response = self.get(url, self.config.transfer_timeout).await?;
        let response = check_status(response, url, StatusPolicy::Read).await?;
        let source = url.to_string();
        Ok(response
            .bytes_stream()
            .map_err(move |e| Error::from(map_reqwest_error(&e, &source)))
            .boxed())
    }

    /// PUT raw bytes to a presigned upload target
    ///
    /// No authorization header is attached and the body is sent as-is with
    /// an explicit `Content-Length`.
    ///
    /// # Errors
    ///
    /// Returns a network error for transport failures or a non-success status.
    pub async fn put_presigned(&self, url: &str, body: Body, length: u64) -> Result<(), Error> {
        let request = self
            .request(Method::PUT, url)
            .header(CONTENT_LENGTH, length)
            .body(body);
        let response = self.send(request, self.config.transfer_timeout).await?;
        check_status(response, url, StatusPolicy::Upload).await?;
        Ok(())
    }

    /// Get the underlying reqwest client for advanced usage
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

fn load_ca_bundle(path: &Path) -> Result<Vec<Certificate>, Error> {
    let ca_error = |message: String| ConfigError::CaBundle {
        path: path.display().to_string(),
        message,
    };

    let pem = std::fs::read(path).map_err(|e| ca_error(e.to_string()))?;
    let certificates = Certificate::from_pem_bundle(&pem).map_err(|e| ca_error(e.to_string()))?;
    if certificates.is_empty() {
        return Err(ca_error("no certificates found".to_string()).into());
    }
    Ok(certificates)
}

/// Translate a reqwest failure into the network error taxonomy
pub(crate) fn map_reqwest_error(error: &reqwest::Error, url: &str) -> NetworkError {
    if error.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        NetworkError::ConnectionRefused(format!("{url}: {error}"))
    } else if error.is_builder() {
        NetworkError::InvalidUrl(format!("{url}: {error}"))
    } else {
        NetworkError::DownloadFailed(format!("{url}: {error}"))
    }
}
