use std::future::Future;
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Response};
use url::Url;

use crate::error::{MirrorError, Result};

pub const DEFAULT_USER_AGENT: &str = concat!("page-fetch/", env!("CARGO_PKG_VERSION"));

/// HTTP GET capability used for pages and assets.
///
/// Any network failure or non-success status must come back as an error;
/// callers never inspect status codes themselves.
pub trait Fetcher: Send + Sync {
    /// Downloads a page body as text.
    fn fetch_text(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;

    /// Downloads an asset as raw bytes.
    fn fetch_bytes(&self, url: &Url) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new()
            .use_rustls_tls()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| MirrorError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &Url) -> Result<Response> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| network_error(url, source))?;

        let status = response.status();
        log::debug!("{} responded with {}", url, status);
        if !status.is_success() {
            return Err(MirrorError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response)
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        let response = self.get(url).await?;
        response.text().await.map_err(|source| network_error(url, source))
    }

    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self.get(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| network_error(url, source))?;
        Ok(bytes.to_vec())
    }
}

fn network_error(url: &Url, source: reqwest::Error) -> MirrorError {
    MirrorError::Network {
        url: url.to_string(),
        source,
    }
}
