//! Signal — interrupt listener for the interactive loop.

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::DoneWatcher;
use crate::status::{StatusEvent, StatusReporter};

/// SIGINT/SIGTERM handlers, installed when constructed.
///
/// Registration happens in [`InterruptSignals::register`] rather than on
/// first poll, so a signal arriving before the listener task runs is
/// still delivered to it instead of killing the process.
pub(crate) struct InterruptSignals {
    #[cfg(unix)]
    interrupt: Option<tokio::signal::unix::Signal>,
    #[cfg(unix)]
    terminate: Option<tokio::signal::unix::Signal>,
}

impl InterruptSignals {
    /// Must be called from within a tokio runtime.
    ///
    /// A handler that cannot be installed is logged and never fires.
    #[cfg(unix)]
    pub(crate) fn register() -> Self {
        use tokio::signal::unix::{signal, SignalKind};

        let install = |kind: SignalKind, name: &str| match signal(kind) {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!("Failed to install {} handler: {}", name, e);
                None
            }
        };

        Self {
            interrupt: install(SignalKind::interrupt(), "SIGINT"),
            terminate: install(SignalKind::terminate(), "SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    pub(crate) fn register() -> Self {
        Self {}
    }

    /// Resolves on the next SIGINT or SIGTERM.
    #[cfg(unix)]
    pub(crate) async fn recv(&mut self) {
        async fn next(stream: &mut Option<tokio::signal::unix::Signal>) {
            match stream {
                Some(stream) => {
                    stream.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        }

        tokio::select! {
            _ = next(&mut self.interrupt) => {},
            _ = next(&mut self.terminate) => {},
        }
    }

    #[cfg(not(unix))]
    pub(crate) async fn recv(&mut self) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Resolves on the first SIGINT or SIGTERM.
pub(crate) async fn interrupt_signal() {
    InterruptSignals::register().recv().await
}

/// Spawn the listener: report one recoverable "stdin interrupt" on a signal,
/// or exit quietly once `done` closes. It never stops the reader loop.
pub(crate) fn spawn_interrupt_listener(
    mut signals: InterruptSignals,
    status: StatusReporter,
    done: DoneWatcher,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = done.closed() => {
                debug!("Interrupt listener released");
            }
            _ = signals.recv() => {
                status.report(StatusEvent::recoverable("stdin interrupt"));
            }
        }
    })
}

/// Deliver SIGINT to the current (test) process.
#[cfg(all(test, unix))]
pub(crate) fn raise_sigint() {
    let status = std::process::Command::new("kill")
        .args(["-INT", &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());
}
