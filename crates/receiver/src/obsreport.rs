//! Obsreport — per-receiver ingestion accounting.
//!
//! Every line the receiver forwards is bracketed by [`ObsReport::start_logs_op`]
//! and [`ObsReport::end_logs_op`]. Counters are updated with `Ordering::Relaxed`:
//! they feed observability only and never drive control flow, so a snapshot
//! may be slightly torn across fields.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

use crate::component::ComponentId;
use crate::consumer::ConsumerError;
use crate::error::ReceiverError;

pub struct ObsReportSettings {
    pub receiver_id: ComponentId,
    /// Transport label; empty for receivers that have none (stdin).
    pub transport: String,
}

#[derive(Debug, Default)]
struct ReceiverCounters {
    accepted_log_records: AtomicU64,
    refused_log_records: AtomicU64,
    ops_started: AtomicU64,
    ops_in_flight: AtomicI64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObsSnapshot {
    pub receiver: String,
    pub transport: String,
    pub accepted_log_records: u64,
    pub refused_log_records: u64,
    pub ops_started: u64,
    pub ops_in_flight: i64,
}

/// Token for one in-progress ingestion operation.
#[must_use = "an operation must be closed with ObsReport::end_logs_op"]
#[derive(Debug)]
pub struct LogsOp {
    started: Instant,
}

#[derive(Debug)]
pub struct ObsReport {
    receiver_id: ComponentId,
    transport: String,
    counters: ReceiverCounters,
}

impl ObsReport {
    pub fn new(settings: ObsReportSettings) -> Result<Self, ReceiverError> {
        if !is_valid_label(&settings.transport) {
            return Err(ReceiverError::InvalidTransport(settings.transport));
        }
        Ok(Self {
            receiver_id: settings.receiver_id,
            transport: settings.transport,
            counters: ReceiverCounters::default(),
        })
    }

    /// Open an ingestion operation.
    #[inline]
    pub fn start_logs_op(&self) -> LogsOp {
        self.counters.ops_started.fetch_add(1, Ordering::Relaxed);
        self.counters.ops_in_flight.fetch_add(1, Ordering::Relaxed);
        LogsOp {
            started: Instant::now(),
        }
    }

    /// Close an ingestion operation covering `count` records.
    pub fn end_logs_op(
        &self,
        op: LogsOp,
        format: &str,
        count: usize,
        error: Option<&ConsumerError>,
    ) {
        self.counters.ops_in_flight.fetch_sub(1, Ordering::Relaxed);
        let count = count as u64;
        match error {
            None => {
                self.counters.accepted_log_records.fetch_add(count, Ordering::Relaxed);
            }
            Some(_) => {
                self.counters.refused_log_records.fetch_add(count, Ordering::Relaxed);
            }
        }
        tracing::trace!(
            receiver = %self.receiver_id,
            format,
            count,
            refused = error.is_some(),
            elapsed_us = op.started.elapsed().as_micros() as u64,
            "logs op finished"
        );
    }

    pub fn receiver_id(&self) -> &ComponentId {
        &self.receiver_id
    }

    pub fn snapshot(&self) -> ObsSnapshot {
        ObsSnapshot {
            receiver: self.receiver_id.to_string(),
            transport: self.transport.clone(),
            accepted_log_records: self.counters.accepted_log_records.load(Ordering::Relaxed),
            refused_log_records: self.counters.refused_log_records.load(Ordering::Relaxed),
            ops_started: self.counters.ops_started.load(Ordering::Relaxed),
            ops_in_flight: self.counters.ops_in_flight.load(Ordering::Relaxed),
        }
    }
}

// Metric label grammar: lowercase ASCII, digits, '_' (may be empty).
fn is_valid_label(label: &str) -> bool {
    label
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
}
