//! Interactive — line-at-a-time reader loop for a live terminal.
//!
//! The loop runs for the lifetime of the receiver. Blank lines, read errors
//! and end of stream are reported as recoverable and never end the session;
//! only the completion signal does.

use std::time::Duration;

use tokio::io::AsyncRead;
use tracing::debug;

use super::forward::LineForwarder;
use super::lines::LineReader;
use super::signal::{spawn_interrupt_listener, InterruptSignals};
use super::DoneWatcher;
use crate::status::StatusEvent;

/// Pause after a failed read before polling the handle again.
pub(crate) const READ_RETRY_DELAY: Duration = Duration::from_millis(100);

pub(crate) async fn run_interactive<R>(
    reader: R,
    mut forwarder: LineForwarder,
    done: DoneWatcher,
    interrupts: Option<InterruptSignals>,
) where
    R: AsyncRead + Unpin,
{
    if let Some(signals) = interrupts {
        // Exits on its own once `done` closes.
        let _listener = spawn_interrupt_listener(signals, forwarder.status().clone(), done.clone());
    }

    let mut lines = LineReader::new(reader);
    loop {
        let next = tokio::select! {
            biased;
            _ = done.closed() => break,
            next = lines.next_line() => next,
        };

        match next {
            Ok(Some(line)) if line.is_empty() => {
                forwarder
                    .status()
                    .report(StatusEvent::recoverable("user end of input"));
            }
            Ok(Some(line)) => forwarder.forward(line).await,
            Ok(None) => {
                // Nothing more will arrive; park until shutdown.
                forwarder.status().report(StatusEvent::recoverable("stdin closed"));
                done.closed().await;
                break;
            }
            Err(e) => {
                debug!("Interactive read failed: {}", e);
                forwarder.status().report(StatusEvent::recoverable("stdin closed"));
                tokio::select! {
                    biased;
                    _ = done.closed() => break,
                    _ = tokio::time::sleep(READ_RETRY_DELAY) => {}
                }
            }
        }
    }

    debug!("Interactive reader loop finished");
}
