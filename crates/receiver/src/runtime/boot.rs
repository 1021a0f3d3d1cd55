//! Boot — two-phase logging init and config load.
//!
//! A thread-local basic subscriber covers config loading; once the config
//! is known the global subscriber is installed from its `[logging]` table.
//! Everything goes to stderr or a file since stdout carries records.

use std::fs::OpenOptions;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::conf::{AppConfig, ConfigError, LogFormat, LogOutput, LoggingConfig};

/// Phase 1: basic tracing used while the config is being loaded.
pub fn init_tracing_basic() -> tracing::subscriber::DefaultGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stdin_receiver=debug"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_default(subscriber)
}

/// `RUST_LOG` wins when it parses; otherwise the configured level is used.
fn build_filter(rust_log: Option<&str>, level: &str) -> Result<EnvFilter, ConfigError> {
    if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return Ok(filter);
        }
    }
    EnvFilter::try_new(level)
        .map_err(|e| ConfigError::Invalid(format!("logging.level '{}': {}", level, e)))
}

/// Phase 2: install the global subscriber described by `config`.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(rust_log.as_deref(), &config.level)?;

    match (&config.format, &config.output) {
        (LogFormat::Json, LogOutput::Stderr) => {
            let layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        (LogFormat::Json, LogOutput::File { path }) => {
            let file = open_log_file(path)?;
            let layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .with_writer(Arc::new(file));
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        (LogFormat::Pretty, LogOutput::Stderr) => {
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        (LogFormat::Pretty, LogOutput::File { path }) => {
            let file = open_log_file(path)?;
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(false)
                .with_writer(Arc::new(file));
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }
    Ok(())
}

fn open_log_file(path: &str) -> Result<std::fs::File, ConfigError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })
}

/// Load and validate the config, then switch to configured logging.
///
/// Failures are logged through the basic subscriber before returning.
pub fn boot() -> Result<AppConfig, ConfigError> {
    let basic = init_tracing_basic();

    let config = AppConfig::load()
        .and_then(|config| config.validate().map(|()| config))
        .map_err(|e| {
            error!("Failed to load configuration: {}", e);
            e
        })?;

    init_logging(&config.logging).map_err(|e| {
        error!("Failed to initialise logging: {}", e);
        e
    })?;
    drop(basic);

    info!(
        "Starting stdin-receiver v{} (log level: {}, format: {:?})",
        env!("CARGO_PKG_VERSION"),
        config.logging.level,
        config.logging.format
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_filter_uses_configured_level_without_rust_log() {
        let filter = build_filter(None, "warn").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_filter_prefers_rust_log() {
        let filter = build_filter(Some("stdin_receiver=trace"), "warn").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_filter_ignores_blank_rust_log() {
        let filter = build_filter(Some("  "), "debug").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_filter_rejects_bad_level() {
        let result = build_filter(None, "stdin_receiver=loud");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_open_log_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing").join("receiver.log");
        let result = open_log_file(&missing.display().to_string());
        assert!(matches!(result, Err(ConfigError::Io { ref path, .. }) if path.ends_with("receiver.log")));
    }
}
