use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{source::ItemSource, FetchError, FetchResult, OwnerProfile, RemoteItem, VkConfig};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: Option<T>,
    error: Option<ApiError>,
}

/// Error object returned by the API in place of a response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub error_code: i64,
    pub error_msg: String,
}

#[derive(Debug, Deserialize)]
struct ItemList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// Client for the VK method API
#[derive(Debug, Clone)]
pub struct VkClient {
    client: Client,
    config: VkConfig,
}

impl VkClient {
    pub fn new(config: VkConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &VkConfig {
        &self.config
    }

    /// Call `method` and unwrap the `response` field.
    ///
    /// An `error` object in the body is reported as `FetchFailed` even
    /// though the HTTP status is 200.
    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> FetchResult<T> {
        // Errors name the endpoint without the query, which carries the token
        let endpoint = format!("{}{}", self.config.base_url, method);

        let response = self
            .client
            .get(&endpoint)
            .query(params)
            .query(&[
                ("access_token", self.config.token.as_str()),
                ("v", self.config.api_version.as_str()),
            ])
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| FetchError::fetch_failed(&endpoint, e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::fetch_failed(&endpoint, format!("HTTP {status}")));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| {
                FetchError::fetch_failed(&endpoint, format!("Invalid response body: {}", e.without_url()))
            })?;

        match envelope {
            Envelope {
                error: Some(error), ..
            } => Err(FetchError::fetch_failed(
                &endpoint,
                format!("API error {}: {}", error.error_code, error.error_msg),
            )),
            Envelope {
                response: Some(response),
                ..
            } => Ok(response),
            _ => Err(FetchError::fetch_failed(&endpoint, "Response field missing")),
        }
    }

    /// `users.search` restricted to owners with a photo
    #[instrument(skip(self))]
    pub async fn search_users(&self, city_id: i64, count: u32) -> FetchResult<Vec<OwnerProfile>> {
        let list: ItemList<OwnerProfile> = self
            .request(
                "users.search",
                &[
                    ("city", city_id.to_string()),
                    ("count", count.to_string()),
                    ("has_photo", "1".to_string()),
                    ("fields", "photo_max_orig".to_string()),
                ],
            )
            .await?;

        debug!("Found {} users", list.items.len());
        Ok(list.items)
    }

    /// `photos.getAll` with every size of each photo
    #[instrument(skip(self))]
    pub async fn get_photos(&self, owner_id: i64, count: u32) -> FetchResult<Vec<RemoteItem>> {
        let list: ItemList<RemoteItem> = self
            .request(
                "photos.getAll",
                &[
                    ("owner_id", owner_id.to_string()),
                    ("count", count.to_string()),
                    ("photo_sizes", "1".to_string()),
                ],
            )
            .await?;

        debug!("Owner {} has {} photos", owner_id, list.items.len());
        Ok(list.items)
    }
}

#[async_trait]
impl ItemSource for VkClient {
    async fn owners_in_city(&self, city_id: i64, count: u32) -> FetchResult<Vec<OwnerProfile>> {
        self.search_users(city_id, count).await
    }

    async fn list_items(&self, owner_id: i64, count: u32) -> FetchResult<Vec<RemoteItem>> {
        self.get_photos(owner_id, count).await
    }
}
