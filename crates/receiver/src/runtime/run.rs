//! Run — wire a receiver to stdout and drive it to completion.

use std::future::Future;
use std::sync::Arc;

use tracing::info;

use crate::conf::AppConfig;
use crate::consumer::JsonLinesConsumer;
use crate::error::ReceiverError;
use crate::factory::StdinReceiverFactory;
use crate::receiver::{ReceiverSettings, StdinReceiver};
use crate::status::{StatusEvents, StatusKind, StatusReporter};

use super::stop::shutdown_signal;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Piped input was exhausted.
    Completed,
    /// A shutdown signal arrived first.
    Interrupted,
    /// The receiver reported a fatal error.
    Failed(String),
}

impl RunOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed(_))
    }
}

/// Read the process's stdin and write every record to stdout as JSON.
pub async fn run(config: &AppConfig) -> Result<RunOutcome, ReceiverError> {
    let id = config.component_id()?;
    let (status, events) = StatusReporter::channel(id.clone());

    let factory = StdinReceiverFactory::new();
    let receiver = factory.create_logs_receiver(
        ReceiverSettings::new(id, status),
        config.receiver.clone(),
        Arc::new(JsonLinesConsumer::stdout()),
    )?;

    drive(receiver, events, shutdown_signal()).await
}

/// Start `receiver` and wait for a terminal status event or `shutdown`,
/// whichever comes first, then shut it down.
pub async fn drive<F>(
    mut receiver: StdinReceiver,
    mut events: StatusEvents,
    shutdown: F,
) -> Result<RunOutcome, ReceiverError>
where
    F: Future<Output = ()>,
{
    let mode = receiver.start()?;
    info!(component = %receiver.id(), "Reading {} input", mode);

    tokio::pin!(shutdown);
    let outcome = loop {
        tokio::select! {
            _ = &mut shutdown => break RunOutcome::Interrupted,
            event = events.recv() => match event {
                Some(event) => match event.kind {
                    StatusKind::Stopping => break RunOutcome::Completed,
                    StatusKind::FatalError => {
                        break RunOutcome::Failed(event.cause.unwrap_or_default())
                    }
                    // Already logged by the reporter.
                    StatusKind::RecoverableError | StatusKind::PermanentError => {}
                },
                None => break RunOutcome::Completed,
            },
        }
    };

    receiver.shutdown().await?;

    let snapshot = receiver.obsreport().snapshot();
    info!(
        component = %receiver.id(),
        accepted = snapshot.accepted_log_records,
        refused = snapshot.refused_log_records,
        "Receiver finished: {:?}",
        outcome
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentId;
    use crate::conf::ReceiverConfig;
    use crate::consumer::LogsSink;
    use crate::source::InputStream;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tokio::io::{AsyncRead, ReadBuf};

    struct BrokenReader;

    impl AsyncRead for BrokenReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::new(std::io::ErrorKind::Other, "device error")))
        }
    }

    fn receiver(input: InputStream, sink: Arc<LogsSink>) -> (StdinReceiver, StatusEvents) {
        let id = ComponentId::new("stdin").unwrap();
        let (status, events) = StatusReporter::channel(id.clone());
        let settings = ReceiverSettings::new(id, status)
            .with_input(input)
            .with_interrupt_listener(false);
        let receiver = StdinReceiverFactory::new()
            .create_logs_receiver(settings, ReceiverConfig::default(), sink)
            .unwrap();
        (receiver, events)
    }

    #[tokio::test]
    async fn test_piped_run_completes() {
        let sink = Arc::new(LogsSink::new());
        let (receiver, events) = receiver(InputStream::piped(&b"a\nb\n"[..]), Arc::clone(&sink));

        let outcome = drive(receiver, events, std::future::pending()).await.unwrap();

        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(sink.bodies(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_unreadable_input_fails_run() {
        let sink = Arc::new(LogsSink::new());
        let (receiver, events) = receiver(InputStream::piped(BrokenReader), Arc::clone(&sink));

        let outcome = drive(receiver, events, std::future::pending()).await.unwrap();

        assert_eq!(outcome, RunOutcome::Failed("cannot read stdin".to_string()));
        assert!(outcome.is_failure());
        assert_eq!(sink.record_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_signal_interrupts_interactive_run() {
        use tokio::io::AsyncWriteExt;

        let sink = Arc::new(LogsSink::new());
        let (mut tx, rx) = tokio::io::duplex(64);
        let (receiver, events) = receiver(InputStream::interactive(rx), Arc::clone(&sink));
        tx.write_all(b"typed\n").await.unwrap();

        let waiter = Arc::clone(&sink);
        let shutdown = async move {
            waiter.wait_for_records(1, Duration::from_secs(2)).await;
        };
        let outcome = drive(receiver, events, shutdown).await.unwrap();

        assert_eq!(outcome, RunOutcome::Interrupted);
        assert_eq!(sink.bodies(), vec!["typed"]);
    }
}
