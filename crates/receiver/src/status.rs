//! Status — component status events and the channel they are reported on.
//!
//! The reader loops run detached from any caller, so failures are surfaced as
//! [`StatusEvent`]s instead of return values. Reporting never blocks: events
//! go onto an unbounded channel and are mirrored to `tracing`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::component::ComponentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Transient condition; the loop keeps running.
    RecoverableError,
    /// One line failed downstream; the loop moves on to the next line.
    PermanentError,
    /// The input could not be read at all; the loop has aborted.
    FatalError,
    /// The loop has finished its input and is stopping.
    Stopping,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::RecoverableError => "recoverable_error",
            StatusKind::PermanentError => "permanent_error",
            StatusKind::FatalError => "fatal_error",
            StatusKind::Stopping => "stopping",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEvent {
    pub kind: StatusKind,
    pub cause: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl StatusEvent {
    fn new(kind: StatusKind, cause: Option<String>) -> Self {
        Self {
            kind,
            cause,
            timestamp: Utc::now(),
        }
    }

    pub fn recoverable(cause: impl Into<String>) -> Self {
        Self::new(StatusKind::RecoverableError, Some(cause.into()))
    }

    pub fn permanent(cause: impl Into<String>) -> Self {
        Self::new(StatusKind::PermanentError, Some(cause.into()))
    }

    pub fn fatal(cause: impl Into<String>) -> Self {
        Self::new(StatusKind::FatalError, Some(cause.into()))
    }

    pub fn stopping() -> Self {
        Self::new(StatusKind::Stopping, None)
    }

    /// True for events after which the reporting loop will not produce more.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, StatusKind::FatalError | StatusKind::Stopping)
    }
}

/// Receiving half of a status channel.
pub type StatusEvents = mpsc::UnboundedReceiver<StatusEvent>;

/// Sending half of a status channel, tagged with the reporting component.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    component: ComponentId,
    sender: mpsc::UnboundedSender<StatusEvent>,
}

impl StatusReporter {
    /// Create a reporter and the stream of events it produces.
    pub fn channel(component: ComponentId) -> (Self, StatusEvents) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { component, sender }, receiver)
    }

    /// A reporter whose events are only logged.
    pub fn detached(component: ComponentId) -> Self {
        Self::channel(component).0
    }

    pub fn component(&self) -> &ComponentId {
        &self.component
    }

    pub fn report(&self, event: StatusEvent) {
        let cause = event.cause.as_deref().unwrap_or("");
        match event.kind {
            StatusKind::RecoverableError => {
                warn!(component = %self.component, status = event.kind.as_str(), "{}", cause)
            }
            StatusKind::PermanentError | StatusKind::FatalError => {
                error!(component = %self.component, status = event.kind.as_str(), "{}", cause)
            }
            StatusKind::Stopping => {
                info!(component = %self.component, status = event.kind.as_str(), "Receiver stopping")
            }
        }
        // The owner may have stopped listening; the event is still logged above.
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporter() -> (StatusReporter, StatusEvents) {
        StatusReporter::channel(ComponentId::new("stdin").unwrap())
    }

    #[test]
    fn test_constructors_set_kind_and_cause() {
        assert_eq!(StatusEvent::recoverable("x").kind, StatusKind::RecoverableError);
        assert_eq!(StatusEvent::permanent("x").kind, StatusKind::PermanentError);
        assert_eq!(StatusEvent::fatal("x").kind, StatusKind::FatalError);
        assert_eq!(StatusEvent::fatal("boom").cause.as_deref(), Some("boom"));
        assert_eq!(StatusEvent::stopping().cause, None);
    }

    #[test]
    fn test_terminal_events() {
        assert!(StatusEvent::fatal("x").is_terminal());
        assert!(StatusEvent::stopping().is_terminal());
        assert!(!StatusEvent::recoverable("x").is_terminal());
        assert!(!StatusEvent::permanent("x").is_terminal());
    }

    #[tokio::test]
    async fn test_report_delivers_in_order() {
        let (reporter, mut events) = reporter();
        reporter.report(StatusEvent::recoverable("first"));
        reporter.report(StatusEvent::stopping());

        assert_eq!(events.recv().await.unwrap().cause.as_deref(), Some("first"));
        assert_eq!(events.recv().await.unwrap().kind, StatusKind::Stopping);
    }

    #[test]
    fn test_report_without_listener_does_not_panic() {
        let reporter = StatusReporter::detached(ComponentId::new("stdin").unwrap());
        reporter.report(StatusEvent::fatal("nobody listening"));
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_value(StatusKind::RecoverableError).unwrap();
        assert_eq!(json, "recoverable_error");
    }
}
