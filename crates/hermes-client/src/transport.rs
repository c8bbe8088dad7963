//! Transports carry encoded requests to a server.
//!
//! The encoder produces an `http::Request<Bytes>` with an origin-form URI
//! (`/path?query`). A transport resolves it against its own base and returns
//! the raw response; connection pooling and retries belong to the transport.

use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use thiserror::Error;

use crate::config::ClientConfig;

/// A transport-level failure: no response was received.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The base URL cannot be combined with the request path.
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    /// The HTTP client failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Any other transport failure.
    #[error("transport failed: {0}")]
    Other(String),
}

/// Sends encoded requests.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends one request and returns the full response.
    async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError>;
}

/// A [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: String,
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with default settings.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        Self::from_config(base_url, &ClientConfig::default())
    }

    /// Creates a transport applying the configured timeout and user agent.
    pub fn from_config(
        base_url: impl Into<String>,
        config: &ClientConfig,
    ) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().timeout(config.request_timeout());
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        Ok(Self::with_client(base_url, builder.build()?))
    }

    /// Wraps an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, request: &Request<Bytes>) -> Result<reqwest::Url, TransportError> {
        let path_and_query = request
            .uri()
            .path_and_query()
            .map_or("/", http::uri::PathAndQuery::as_str);
        let raw = format!("{}{}", self.base_url, path_and_query);
        reqwest::Url::parse(&raw).map_err(|_| TransportError::InvalidUrl(raw))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let url = self.url_for(&request)?;
        let (parts, body) = request.into_parts();

        tracing::debug!(method = %parts.method, %url, "sending request");
        let response = self
            .client
            .request(parts.method, url)
            .headers(parts.headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;

        let mut out = Response::new(bytes);
        *out.status_mut() = status;
        *out.headers_mut() = headers;
        Ok(out)
    }
}
