//! Sink — in-memory consumer for tests.
//!
//! Provides a deterministic [`LogsSink`] that implements [`LogsConsumer`]
//! by collecting every batch it accepts. Rejection rules let a test make
//! specific records fail downstream.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Notify;

use super::{ConsumeFuture, ConsumerError, LogsConsumer};
use crate::record::{LogBatch, LogRecord};

type RejectRule = Box<dyn Fn(&LogRecord) -> bool + Send + Sync>;

#[derive(Default)]
struct Inner {
    accepted: Vec<LogBatch>,
    rejected: usize,
}

/// Collecting consumer. Accepted batches are kept in arrival order.
#[derive(Default)]
pub struct LogsSink {
    inner: Mutex<Inner>,
    reject: Option<RejectRule>,
    changed: Notify,
}

impl LogsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any batch containing a record that matches `rule`.
    pub fn rejecting<F>(rule: F) -> Self
    where
        F: Fn(&LogRecord) -> bool + Send + Sync + 'static,
    {
        Self {
            reject: Some(Box::new(rule)),
            ..Self::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All accepted batches, in arrival order.
    pub fn all_logs(&self) -> Vec<LogBatch> {
        self.lock().accepted.clone()
    }

    /// Bodies of all accepted records, in arrival order.
    pub fn bodies(&self) -> Vec<String> {
        self.lock()
            .accepted
            .iter()
            .flat_map(|batch| batch.records().iter().map(|r| r.body().to_string()))
            .collect()
    }

    pub fn record_count(&self) -> usize {
        self.lock().accepted.iter().map(LogBatch::record_count).sum()
    }

    pub fn rejected_count(&self) -> usize {
        self.lock().rejected
    }

    /// Wait until at least `count` records were accepted or `within` elapses.
    ///
    /// Returns whether the count was reached.
    pub async fn wait_for_records(&self, count: usize, within: Duration) -> bool {
        tokio::time::timeout(within, async {
            loop {
                let notified = self.changed.notified();
                if self.record_count() >= count {
                    return;
                }
                notified.await;
            }
        })
        .await
        .is_ok()
    }

    fn accept(&self, batch: LogBatch) -> Result<(), ConsumerError> {
        if let Some(rule) = &self.reject {
            if let Some(record) = batch.records().iter().find(|record| rule(*record)) {
                let body = record.body().to_string();
                self.lock().rejected += 1;
                self.changed.notify_waiters();
                return Err(ConsumerError::Rejected(body));
            }
        }
        self.lock().accepted.push(batch);
        self.changed.notify_waiters();
        Ok(())
    }
}

impl LogsConsumer for LogsSink {
    fn consume_logs(&self, batch: LogBatch) -> ConsumeFuture<'_> {
        let result = self.accept(batch);
        Box::pin(async move { result })
    }
}
