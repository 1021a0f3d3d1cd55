//! Load — config loading from file and environment variables.

use std::fs;
use std::path::Path;

use super::model::{AppConfig, LogFormat, ReceiverConfig};
use super::ConfigError;
use crate::component::ComponentId;
use crate::error::ReceiverError;
use crate::factory::TYPE_STR;

pub const CONFIG_FILE_ENV: &str = "STDIN_RECEIVER_CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "stdin-receiver.toml";

impl AppConfig {
    /// Load configuration from file, then apply environment overrides.
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::info!("Config file not found at {}, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `STDIN_RECEIVER_*` overrides, reading variables through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("STDIN_RECEIVER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("STDIN_RECEIVER_LOG_FORMAT") {
            self.logging.format = match format.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "STDIN_RECEIVER_LOG_FORMAT must be 'json' or 'pretty', got '{}'",
                        other
                    )))
                }
            };
        }
        if let Some(name) = lookup("STDIN_RECEIVER_NAME") {
            self.name = Some(name);
        }
        Ok(())
    }

    /// Validate that configuration values are sane
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.level must not be empty".to_string()));
        }
        if let super::model::LogOutput::File { path } = &self.logging.output {
            if path.is_empty() {
                return Err(ConfigError::Invalid(
                    "logging.output.file.path must not be empty".to_string(),
                ));
            }
        }
        if let Some(name) = &self.name {
            ComponentId::with_name(TYPE_STR, name)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        self.receiver.validate()
    }

    /// The receiver id this configuration describes.
    pub fn component_id(&self) -> Result<ComponentId, ReceiverError> {
        match &self.name {
            Some(name) => ComponentId::with_name(TYPE_STR, name),
            None => ComponentId::new(TYPE_STR),
        }
    }
}

impl ReceiverConfig {
    /// There are no options to check yet.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}
