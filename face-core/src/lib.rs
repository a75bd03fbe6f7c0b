//! face-core: configuration and logging shared by the face pipeline crates.

pub mod config;
pub mod logging;

pub use config::{ConfigError, ConfigSnapshot, FaceConfig, ENV_PREFIX};
pub use logging::{init_tracing, LogConfig, LogFormat};
