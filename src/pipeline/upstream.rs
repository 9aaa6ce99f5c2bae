//! Upstream (DSpace) client.
//!
//! # Responsibilities
//! - Compose `http://{host}:{port}{path}?{query}` from static config and the
//!   rewritten query
//! - Issue exactly one GET per pipeline invocation
//! - Keep transport failure (no response at all) apart from non-2xx
//!   responses
//!
//! # Design Decisions
//! - No retries and no timeout beyond the transport default
//! - The backend is addressed directly; proxy environment variables are ignored
//! - The body is buffered whole; it is either parsed or forwarded verbatim

use axum::body::Bytes;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;

/// Errors raised while talking to the backend.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The configured host/port/path do not form a URL.
    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),

    /// No response object could be obtained.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Status and body received from the backend.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Client bound to the configured backend endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl UpstreamClient {
    /// Create a client for the configured backend.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let endpoint = Url::parse(&format!(
            "http://{}:{}{}",
            config.host, config.port, config.path
        ))?;
        let client = reqwest::Client::builder().no_proxy().build()?;

        Ok(Self { client, endpoint })
    }

    /// Full upstream URL for a rewritten query.
    pub fn url_for(&self, query: Option<&str>) -> Url {
        let mut url = self.endpoint.clone();
        url.set_query(query);
        url
    }

    /// Send the GET request.
    ///
    /// A failure to read the body counts as a transport failure: no usable
    /// response was obtained.
    pub async fn fetch(&self, url: Url) -> Result<UpstreamResponse, UpstreamError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(UpstreamResponse { status, body })
    }
}
