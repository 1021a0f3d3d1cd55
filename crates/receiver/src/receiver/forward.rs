//! Forward — build → consume → account → report, shared by both loops.

use std::sync::Arc;

use tracing::warn;

use crate::consumer::{ConsumerError, LogsConsumer};
use crate::obsreport::ObsReport;
use crate::record::{LogBatch, RecordBuilder};
use crate::status::{StatusEvent, StatusReporter};

/// Format label recorded with every ingestion operation.
pub(crate) const FORMAT: &str = "stdin";

/// Consecutive downstream failures between sustained-outage warnings.
const SUSTAINED_FAILURE_WARN_EVERY: u32 = 3;

pub(crate) struct LineForwarder {
    consumer: Arc<dyn LogsConsumer>,
    obsreport: Arc<ObsReport>,
    status: StatusReporter,
    builder: RecordBuilder,
    consecutive_failures: u32,
}

impl LineForwarder {
    pub(crate) fn new(
        consumer: Arc<dyn LogsConsumer>,
        obsreport: Arc<ObsReport>,
        status: StatusReporter,
    ) -> Self {
        Self {
            consumer,
            obsreport,
            status,
            builder: RecordBuilder::new(),
            consecutive_failures: 0,
        }
    }

    pub(crate) fn status(&self) -> &StatusReporter {
        &self.status
    }

    /// Wrap `line` in a single-record batch and hand it to the consumer.
    pub(crate) async fn consume_line(&mut self, line: String) -> Result<(), ConsumerError> {
        let record = self.builder.build(line);
        self.consumer.consume_logs(LogBatch::single(record)).await
    }

    /// Forward one line; a consumer failure is reported as permanent.
    pub(crate) async fn forward(&mut self, line: String) {
        let op = self.obsreport.start_logs_op();
        let result = self.consume_line(line).await;
        self.obsreport.end_logs_op(op, FORMAT, 1, result.as_ref().err());

        match result {
            Ok(()) => self.consecutive_failures = 0,
            Err(e) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                if self.consecutive_failures % SUSTAINED_FAILURE_WARN_EVERY == 0 {
                    warn!(
                        component = %self.status.component(),
                        "Consumer has failed {} times consecutively - check downstream health",
                        self.consecutive_failures
                    );
                }
                self.status.report(StatusEvent::permanent(e.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentId;
    use crate::consumer::LogsSink;
    use crate::obsreport::ObsReportSettings;
    use crate::status::{StatusEvents, StatusKind};

    fn forwarder(sink: Arc<LogsSink>) -> (LineForwarder, Arc<ObsReport>, StatusEvents) {
        let id = ComponentId::new("stdin").unwrap();
        let obsreport = Arc::new(
            ObsReport::new(ObsReportSettings {
                receiver_id: id.clone(),
                transport: String::new(),
            })
            .unwrap(),
        );
        let (status, events) = StatusReporter::channel(id);
        (LineForwarder::new(sink, Arc::clone(&obsreport), status), obsreport, events)
    }

    #[tokio::test]
    async fn test_consume_line_sends_one_record() {
        let sink = Arc::new(LogsSink::new());
        let (mut fwd, _, _) = forwarder(Arc::clone(&sink));

        fwd.consume_line("foo".to_string()).await.unwrap();

        let batches = sink.all_logs();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].record_count(), 1);
        assert_eq!(batches[0].records()[0].body(), "foo");
    }

    #[tokio::test]
    async fn test_forward_counts_accepted() {
        let sink = Arc::new(LogsSink::new());
        let (mut fwd, obs, mut events) = forwarder(Arc::clone(&sink));

        fwd.forward("a".to_string()).await;
        fwd.forward("b".to_string()).await;

        assert_eq!(obs.snapshot().accepted_log_records, 2);
        assert!(events.try_recv().is_err(), "no status on success");
    }

    #[tokio::test]
    async fn test_forward_rejection_is_permanent() {
        let sink = Arc::new(LogsSink::rejecting(|r| r.body() == "bad"));
        let (mut fwd, obs, mut events) = forwarder(Arc::clone(&sink));

        fwd.forward("bad".to_string()).await;
        fwd.forward("good".to_string()).await;

        let event = events.try_recv().unwrap();
        assert_eq!(event.kind, StatusKind::PermanentError);
        assert!(event.cause.unwrap().contains("bad"));
        assert!(events.try_recv().is_err());

        let snap = obs.snapshot();
        assert_eq!(snap.refused_log_records, 1);
        assert_eq!(snap.accepted_log_records, 1);
        assert_eq!(sink.bodies(), vec!["good"]);
    }

    #[tokio::test]
    async fn test_sustained_failures_keep_reporting() {
        let sink = Arc::new(LogsSink::rejecting(|_| true));
        let (mut fwd, _, mut events) = forwarder(sink);

        for i in 0..7 {
            fwd.forward(format!("line {}", i)).await;
        }

        let mut permanent = 0;
        while let Ok(event) = events.try_recv() {
            assert_eq!(event.kind, StatusKind::PermanentError);
            permanent += 1;
        }
        assert_eq!(permanent, 7);
        assert_eq!(fwd.consecutive_failures, 7);
    }
}
