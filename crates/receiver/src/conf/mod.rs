//! Conf module — configuration model, loading, and validation.

pub mod model;
pub mod load;

use thiserror::Error;

pub use model::{AppConfig, LogFormat, LogOutput, LoggingConfig, ReceiverConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
