//! Model — AppConfig and related structs.

use serde::{Deserialize, Serialize};

/// Receiver options. There are none yet; unknown keys are rejected so a
/// typo in the `[receiver]` table fails loudly instead of being ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReceiverConfig {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Instance name; the receiver id becomes `stdin/<name>` when set.
    pub name: Option<String>,
    pub logging: LoggingConfig,
    pub receiver: ReceiverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Where diagnostics go. Stdout is reserved for forwarded records.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stderr,
    File { path: String },
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: None,
            logging: LoggingConfig::default(),
            receiver: ReceiverConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            output: LogOutput::Stderr,
        }
    }
}
