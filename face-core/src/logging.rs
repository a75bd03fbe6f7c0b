//! Process-wide `tracing` subscriber setup.
//!
//! Nothing in the pipeline installs a subscriber implicitly; the binary or
//! test that owns the process calls [`init_tracing`] once.

use tracing_subscriber::EnvFilter;

use crate::ConfigSnapshot;

/// Output format for the fmt subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one line per event
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Logging settings, read from `log.level` and `log.format`
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directive used when `RUST_LOG` is not set
    pub default_directive: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_directive: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LogConfig {
    pub fn from_config(config: &ConfigSnapshot) -> Self {
        let defaults = Self::default();
        Self {
            default_directive: config
                .get_string("log.level")
                .unwrap_or(defaults.default_directive),
            format: config
                .get("log.format")
                .and_then(|f| f.parse().ok())
                .unwrap_or(defaults.format),
        }
    }
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed, which makes it
/// safe to call from several tests.
pub fn init_tracing(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_directive));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.is_ok()
}
