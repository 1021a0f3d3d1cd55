//! Factory — component type, stability and receiver construction.

use std::fmt;
use std::sync::Arc;

use crate::conf::ReceiverConfig;
use crate::consumer::LogsConsumer;
use crate::error::ReceiverError;
use crate::receiver::{ReceiverSettings, StdinReceiver};

/// Component type under which the receiver is registered.
pub const TYPE_STR: &str = "stdin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityLevel {
    Development,
    Alpha,
    Beta,
    Stable,
}

impl StabilityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StabilityLevel::Development => "development",
            StabilityLevel::Alpha => "alpha",
            StabilityLevel::Beta => "beta",
            StabilityLevel::Stable => "stable",
        }
    }
}

impl fmt::Display for StabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdinReceiverFactory;

impl StdinReceiverFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn component_type(&self) -> &'static str {
        TYPE_STR
    }

    /// Stability of the logs signal.
    pub fn stability(&self) -> StabilityLevel {
        StabilityLevel::Development
    }

    pub fn create_default_config(&self) -> ReceiverConfig {
        ReceiverConfig::default()
    }

    /// Build a logs receiver. The receiver is not started.
    pub fn create_logs_receiver(
        &self,
        settings: ReceiverSettings,
        config: ReceiverConfig,
        consumer: Arc<dyn LogsConsumer>,
    ) -> Result<StdinReceiver, ReceiverError> {
        if settings.id.kind() != TYPE_STR {
            return Err(ReceiverError::InvalidComponentId(
                settings.id.to_string(),
                "component type must be 'stdin'",
            ));
        }
        StdinReceiver::new(settings, config, consumer)
    }
}
