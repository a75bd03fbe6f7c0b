use std::path::PathBuf;
use std::time::Duration;

use face_core::{ConfigError, ConfigSnapshot};

/// Configuration for fetching and recording photos
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Root directory for downloaded files; created if absent
    pub download_dir: PathBuf,

    /// Connection URL of the dedup ledger
    pub ledger_url: String,

    /// Upper bound on a single download
    pub request_timeout: Duration,

    /// Extension of stored files, without the dot
    pub file_extension: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
            ledger_url: "sqlite://photos.db".to_string(),
            request_timeout: Duration::from_secs(10),
            file_extension: "jpg".to_string(),
        }
    }
}

impl FetchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `fetch.*` keys
    pub fn from_config(config: &ConfigSnapshot) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            download_dir: config
                .get("fetch.download_dir")
                .map(PathBuf::from)
                .unwrap_or(defaults.download_dir),
            ledger_url: config
                .get_string("fetch.ledger_url")
                .unwrap_or(defaults.ledger_url),
            request_timeout: config
                .parse::<u64>("fetch.request_timeout_secs")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            file_extension: config
                .get_string("fetch.file_extension")
                .unwrap_or(defaults.file_extension),
        })
    }

    pub fn with_download_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn with_ledger_url<S: Into<String>>(mut self, url: S) -> Self {
        self.ledger_url = url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Connection settings for the remote photo API
#[derive(Debug, Clone)]
pub struct VkConfig {
    /// Method endpoint prefix, ending with a slash
    pub base_url: String,
    pub token: String,
    pub api_version: String,
    pub request_timeout: Duration,
}

impl VkConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.vk.com/method/";
    pub const DEFAULT_API_VERSION: &'static str = "5.131";

    pub fn new<S: Into<String>>(token: S) -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            token: token.into(),
            api_version: Self::DEFAULT_API_VERSION.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Read the `vk.*` keys; `vk.token` is required
    pub fn from_config(config: &ConfigSnapshot) -> Result<Self, ConfigError> {
        let mut vk = Self::new(config.require("vk.token")?);

        if let Some(base_url) = config.get_string("vk.base_url") {
            vk.base_url = base_url;
        }
        if let Some(version) = config.get_string("vk.api_version") {
            vk.api_version = version;
        }
        if let Some(timeout) = config.parse::<u64>("vk.request_timeout_secs")? {
            vk.request_timeout = Duration::from_secs(timeout);
        }

        Ok(vk)
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Limits for a batch ingestion run
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// How many owners a city search returns
    pub owner_limit: u32,

    /// How many photos are listed per owner
    pub item_limit: u32,

    /// Owners processed at the same time; items of one owner are always sequential
    pub owner_concurrency: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            owner_limit: 5,
            item_limit: 10,
            owner_concurrency: 4,
        }
    }
}

impl IngestConfig {
    /// Read the `ingest.*` keys
    pub fn from_config(config: &ConfigSnapshot) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            owner_limit: config
                .parse::<u32>("ingest.owner_limit")?
                .unwrap_or(defaults.owner_limit),
            item_limit: config
                .parse::<u32>("ingest.item_limit")?
                .unwrap_or(defaults.item_limit),
            owner_concurrency: config
                .parse::<usize>("ingest.owner_concurrency")?
                .unwrap_or(defaults.owner_concurrency)
                .max(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_core::FaceConfig;

    #[test]
    fn fetch_defaults() {
        let config = FetchConfig::from_config(&FaceConfig::new().snapshot()).unwrap();
        assert_eq!(config.download_dir, PathBuf::from("downloads"));
        assert_eq!(config.ledger_url, "sqlite://photos.db");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.file_extension, "jpg");
    }

    #[test]
    fn fetch_overrides() {
        let mut config = FaceConfig::new();
        config.set("fetch.download_dir", "/var/lib/faces");
        config.set("fetch.request_timeout_secs", "3");

        let fetch = FetchConfig::from_config(&config.snapshot()).unwrap();
        assert_eq!(fetch.download_dir, PathBuf::from("/var/lib/faces"));
        assert_eq!(fetch.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn fetch_rejects_garbage_timeout() {
        let mut config = FaceConfig::new();
        config.set("fetch.request_timeout_secs", "ten");

        let err = FetchConfig::from_config(&config.snapshot()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key, value } if key == "fetch.request_timeout_secs" && value == "ten"
        ));
    }

    #[test]
    fn vk_requires_token() {
        let err = VkConfig::from_config(&FaceConfig::new().snapshot()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(key) if key == "vk.token"));

        let mut config = FaceConfig::new();
        config.set("vk.token", "secret");
        config.set("vk.api_version", "5.199");

        let vk = VkConfig::from_config(&config.snapshot()).unwrap();
        assert_eq!(vk.token, "secret");
        assert_eq!(vk.api_version, "5.199");
        assert_eq!(vk.base_url, VkConfig::DEFAULT_BASE_URL);
    }

    #[test]
    fn ingest_rejects_garbage_numbers() {
        let mut config = FaceConfig::new();
        config.set("ingest.item_limit", "lots");

        assert!(matches!(
            IngestConfig::from_config(&config.snapshot()),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
