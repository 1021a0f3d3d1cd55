//! Receiver module — lifecycle controller and the two reader loops.
//!
//! - `piped.rs`: eager loop for redirected input
//! - `interactive.rs`: line-at-a-time loop for a terminal
//! - `signal.rs`: interrupt listener used by the interactive loop
//! - `forward.rs`: per-line build/consume/account step
//! - `lines.rs`: line splitting

mod forward;
mod interactive;
mod lines;
mod piped;
mod signal;

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::component::ComponentId;
use crate::conf::ReceiverConfig;
use crate::consumer::LogsConsumer;
use crate::error::ReceiverError;
use crate::obsreport::{ObsReport, ObsReportSettings};
use crate::source::{InputStream, Mode};
use crate::status::StatusReporter;

use forward::LineForwarder;
use interactive::run_interactive;
use piped::run_piped;

pub(crate) use signal::interrupt_signal;
use signal::InterruptSignals;

/// How long `shutdown` waits for the reader task before detaching it.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// One-shot completion signal. Only the owner can close it, and closing
/// consumes it, so it cannot be closed twice.
#[derive(Debug, Default)]
pub struct CompletionSignal {
    token: CancellationToken,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A read-only handle that observes the close.
    pub fn watcher(&self) -> DoneWatcher {
        DoneWatcher {
            token: self.token.clone(),
        }
    }

    pub fn close(self) {
        self.token.cancel();
    }
}

/// Read-only view of a [`CompletionSignal`].
#[derive(Debug, Clone)]
pub struct DoneWatcher {
    token: CancellationToken,
}

impl DoneWatcher {
    /// Resolves once the signal is closed.
    pub async fn closed(&self) {
        self.token.cancelled().await
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Running,
    Stopped,
}

/// Host-provided settings for one receiver instance.
pub struct ReceiverSettings {
    pub id: ComponentId,
    pub status: StatusReporter,
    pub input: InputStream,
    /// Install the SIGINT/SIGTERM listener in interactive mode.
    pub interrupt_listener: bool,
}

impl ReceiverSettings {
    /// Settings reading the process's stdin. The interrupt listener is
    /// enabled when stdout is a terminal.
    pub fn new(id: ComponentId, status: StatusReporter) -> Self {
        Self {
            id,
            status,
            input: InputStream::stdin(),
            interrupt_listener: std::io::stdout().is_terminal(),
        }
    }

    pub fn with_input(mut self, input: InputStream) -> Self {
        self.input = input;
        self
    }

    pub fn with_interrupt_listener(mut self, enabled: bool) -> Self {
        self.interrupt_listener = enabled;
        self
    }
}

/// Reads lines from an input stream and forwards each as a log record.
pub struct StdinReceiver {
    id: ComponentId,
    config: ReceiverConfig,
    consumer: Arc<dyn LogsConsumer>,
    obsreport: Arc<ObsReport>,
    status: StatusReporter,
    input: Option<InputStream>,
    interrupt_listener: bool,
    done: Option<CompletionSignal>,
    task: Option<JoinHandle<()>>,
    state: LifecycleState,
}

impl StdinReceiver {
    pub fn new(
        settings: ReceiverSettings,
        config: ReceiverConfig,
        consumer: Arc<dyn LogsConsumer>,
    ) -> Result<Self, ReceiverError> {
        config.validate()?;
        let obsreport = ObsReport::new(ObsReportSettings {
            receiver_id: settings.id.clone(),
            transport: String::new(),
        })?;

        Ok(Self {
            id: settings.id,
            config,
            consumer,
            obsreport: Arc::new(obsreport),
            status: settings.status,
            input: Some(settings.input),
            interrupt_listener: settings.interrupt_listener,
            done: Some(CompletionSignal::new()),
            task: None,
            state: LifecycleState::Created,
        })
    }

    /// Classify the input and spawn the matching reader loop.
    ///
    /// Returns immediately; the loop runs until shutdown (interactive) or
    /// until the input is exhausted (piped).
    pub fn start(&mut self) -> Result<Mode, ReceiverError> {
        match self.state {
            LifecycleState::Created => {}
            LifecycleState::Running => return Err(ReceiverError::AlreadyStarted),
            LifecycleState::Stopped => return Err(ReceiverError::AlreadyStopped),
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ReceiverError::NoRuntime)?;
        let (Some(input), Some(done)) = (self.input.take(), self.done.as_ref()) else {
            return Err(ReceiverError::AlreadyStarted);
        };

        let mode = input.mode();
        let reader = input.into_reader();
        let forwarder = LineForwarder::new(
            Arc::clone(&self.consumer),
            Arc::clone(&self.obsreport),
            self.status.clone(),
        );

        let task = match mode {
            Mode::Piped => runtime.spawn(run_piped(reader, forwarder)),
            Mode::Interactive => {
                // Installed before spawning so an early signal is not lost.
                let interrupts = self.interrupt_listener.then(InterruptSignals::register);
                runtime.spawn(run_interactive(reader, forwarder, done.watcher(), interrupts))
            }
        };

        info!(component = %self.id, mode = %mode, "Receiver started");
        self.task = Some(task);
        self.state = LifecycleState::Running;
        Ok(mode)
    }

    /// Close the completion signal and wait for the reader loop to finish.
    ///
    /// The signal is closed exactly once; a second call returns
    /// [`ReceiverError::AlreadyStopped`] without touching it.
    pub async fn shutdown(&mut self) -> Result<(), ReceiverError> {
        let done = self.done.take().ok_or(ReceiverError::AlreadyStopped)?;
        done.close();
        self.state = LifecycleState::Stopped;

        let Some(task) = self.task.take() else {
            info!(component = %self.id, "Receiver stopped before start");
            return Ok(());
        };

        match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
            Ok(Ok(())) => {
                info!(component = %self.id, "Receiver stopped");
                Ok(())
            }
            Ok(Err(e)) if e.is_panic() => Err(ReceiverError::Task(e.to_string())),
            Ok(Err(_)) => Ok(()),
            Err(_) => {
                warn!(
                    component = %self.id,
                    "Reader task still running after {:?}, detaching it",
                    SHUTDOWN_GRACE
                );
                Ok(())
            }
        }
    }

    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn obsreport(&self) -> Arc<ObsReport> {
        Arc::clone(&self.obsreport)
    }
}
