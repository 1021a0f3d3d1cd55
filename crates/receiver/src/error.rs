//! Error — receiver lifecycle and construction errors.

use thiserror::Error;

use crate::conf::ConfigError;

#[derive(Error, Debug)]
pub enum ReceiverError {
    #[error("Receiver already started")]
    AlreadyStarted,
    #[error("Receiver already stopped")]
    AlreadyStopped,
    #[error("No tokio runtime available to run the reader loop")]
    NoRuntime,
    #[error("Invalid component id '{0}': {1}")]
    InvalidComponentId(String, &'static str),
    #[error("Invalid obsreport transport label: {0}")]
    InvalidTransport(String),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Reader task failed: {0}")]
    Task(String),
}

// Convenience type alias
pub type ReceiverResult<T> = Result<T, ReceiverError>;
