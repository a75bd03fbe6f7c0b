//! # Configuration
//!
//! A minimal string key/value store. Keys are dotted (`redis.url`,
//! `worker.poll_interval_ms`); every crate in the pipeline reads the
//! values it cares about from a [`ConfigSnapshot`] and falls back to its
//! own defaults.
//!
//! ## Setting and reading values
//! ```rust
//! use face_core::FaceConfig;
//! let mut config = FaceConfig::new();
//!
//! config.set("queue.key", "face_tasks");
//! config.set("worker.poll_interval_ms", "500");
//!
//! let snapshot = config.snapshot();
//! assert_eq!(snapshot.get("queue.key"), Some("face_tasks"));
//! assert_eq!(snapshot.get_u64("worker.poll_interval_ms"), Some(500));
//! ```
//!
//! ## Environment overrides
//! [`FaceConfig::from_env`] loads every variable carrying the given prefix,
//! lowercases it and turns `__` into `.`:
//!
//! ```bash
//! export FACE__REDIS__URL=redis://127.0.0.1:6379   # -> redis.url
//! export FACE__FETCH__DOWNLOAD_DIR=/srv/photos      # -> fetch.download_dir
//! ```

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

/// Default environment prefix used by [`FaceConfig::from_env`].
pub const ENV_PREFIX: &str = "FACE__";

/// Errors raised while reading configuration values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration key: {0}")]
    Missing(String),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

#[derive(Debug, Default, Clone)]
pub struct FaceConfig {
    values: HashMap<String, String>,
}

impl FaceConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Build a config store from the process environment.
    ///
    /// Only variables starting with `prefix` are kept.
    pub fn from_env(prefix: &str) -> Self {
        Self::from_vars(std::env::vars(), prefix)
    }

    /// Same as [`FaceConfig::from_env`] but over an explicit variable list.
    pub fn from_vars<I>(vars: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = Self::new();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                config.set(normalize_env_key(stripped), value);
            }
        }
        config
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Check whether a key is present.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Layer `other` on top of this store; keys in `other` win.
    pub fn merge(&mut self, other: FaceConfig) {
        self.values.extend(other.values);
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::new(self.values.clone())
    }
}

/// `FETCH__DOWNLOAD_DIR` -> `fetch.download_dir`
fn normalize_env_key(raw: &str) -> String {
    raw.to_lowercase().replace("__", ".")
}

/// Immutable, typed view over a [`FaceConfig`]
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    map: HashMap<String, String>,
}

impl ConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse::<usize>().ok())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.trim().parse::<bool>().ok())
    }

    /// Read a whole-seconds duration.
    pub fn get_duration_secs(&self, key: &str) -> Option<Duration> {
        self.get_u64(key).map(Duration::from_secs)
    }

    /// Read a milliseconds duration.
    pub fn get_duration_millis(&self, key: &str) -> Option<Duration> {
        self.get_u64(key).map(Duration::from_millis)
    }

    /// Get a value that must be present.
    pub fn require(&self, key: &str) -> Result<String, ConfigError> {
        self.get_string(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    /// Parse a value if present, rejecting malformed input instead of
    /// silently falling back to a default.
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| ConfigError::Invalid {
                    key: key.to_string(),
                    value: raw.to_string(),
                }),
        }
    }
}
