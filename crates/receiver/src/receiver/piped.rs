//! Piped — eager reader loop for redirected input.
//!
//! The whole stream is read into memory before any line is forwarded. Piped
//! input is finite, so the loop runs to exhaustion and ignores the
//! completion signal.

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, error};

use super::forward::LineForwarder;
use super::lines::split_lines;
use crate::status::StatusEvent;

pub(crate) async fn run_piped<R>(mut reader: R, mut forwarder: LineForwarder)
where
    R: AsyncRead + Unpin,
{
    let mut data = Vec::new();
    if let Err(e) = reader.read_to_end(&mut data).await {
        error!("Bulk read of piped input failed: {}", e);
        forwarder.status().report(StatusEvent::fatal("cannot read stdin"));
        return;
    }
    debug!(bytes = data.len(), "Piped input buffered");

    let mut lines = 0usize;
    for line in split_lines(&data) {
        forwarder.forward(line).await;
        lines += 1;
    }

    debug!(lines, "Piped input exhausted");
    forwarder.status().report(StatusEvent::stopping());
}
