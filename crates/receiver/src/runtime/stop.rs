//! Stop — OS shutdown signal for the binary.

use tracing::warn;

use crate::receiver::interrupt_signal;

/// Resolves on SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    interrupt_signal().await;
    warn!("Received shutdown signal, stopping receiver...");
}
