use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

use crate::{FetchConfig, FetchError, FetchResult, OwnerProfile, RemoteItem};

/// Downloads the raw bytes behind a URL
#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Fetch the whole body.
    ///
    /// Non-success statuses, transport errors and timeouts are all
    /// `FetchFailed`.
    async fn fetch(&self, url: &str) -> FetchResult<Bytes>;
}

/// Lists owners and the photos they own
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Owners with a photo living in `city_id`
    async fn owners_in_city(&self, city_id: i64, count: u32) -> FetchResult<Vec<OwnerProfile>>;

    /// Photos of one owner, each with its available variants
    async fn list_items(&self, owner_id: i64, count: u32) -> FetchResult<Vec<RemoteItem>>;
}

/// Plain HTTP GET with a per-request timeout
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Self {
        Self::with_client(Client::new(), timeout)
    }

    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.request_timeout)
    }
}

#[async_trait]
impl ByteSource for HttpSource {
    async fn fetch(&self, url: &str) -> FetchResult<Bytes> {
        debug!("Downloading {}", url);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::fetch_failed(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::fetch_failed(url, format!("HTTP {status}")));
        }

        response
            .bytes()
            .await
            .map_err(|e| FetchError::fetch_failed(url, e.to_string()))
    }
}
