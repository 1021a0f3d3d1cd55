//! Record — log records, batches, and the per-line record builder.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Instrumentation scope stamped on every batch this receiver emits.
pub const SCOPE_NAME: &str = "stdin-receiver";

/// One structured log record built from a single input line.
///
/// Immutable once constructed; ownership moves to the consumer with the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    /// Capture time, set when the line was accepted for forwarding.
    timestamp: DateTime<Utc>,
    /// The line content with its terminator stripped.
    body: String,
}

impl LogRecord {
    pub fn new(body: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            body: body.into(),
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Nanoseconds since the Unix epoch, saturating at the `i64` range.
    pub fn time_unix_nano(&self) -> i64 {
        self.timestamp
            .timestamp_nanos_opt()
            .unwrap_or(i64::MAX)
    }
}

/// The unit handed to a consumer: an ordered list of records from one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogBatch {
    scope: &'static str,
    records: Vec<LogRecord>,
}

impl LogBatch {
    /// A batch carrying exactly one record.
    pub fn single(record: LogRecord) -> Self {
        Self {
            scope: SCOPE_NAME,
            records: vec![record],
        }
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn into_records(self) -> Vec<LogRecord> {
        self.records
    }
}

/// Stamps lines with a capture time that never goes backwards within one run.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    last: Option<DateTime<Utc>>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `line` using the wall clock.
    pub fn build(&mut self, line: impl Into<String>) -> LogRecord {
        self.build_at(line, Utc::now())
    }

    /// Build a record from `line` as if captured at `now`.
    ///
    /// A `now` earlier than the previous capture is clamped to it.
    pub fn build_at(&mut self, line: impl Into<String>, now: DateTime<Utc>) -> LogRecord {
        let timestamp = match self.last {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last = Some(timestamp);
        LogRecord::new(line, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_build_keeps_body_verbatim() {
        let mut builder = RecordBuilder::new();
        let record = builder.build("foo bar\tbaz");
        assert_eq!(record.body(), "foo bar\tbaz");
    }

    #[test]
    fn test_build_stamps_current_time() {
        let before = Utc::now();
        let record = RecordBuilder::new().build("foo");
        let after = Utc::now();
        assert!(record.timestamp() >= before);
        assert!(record.timestamp() <= after);
    }

    #[test]
    fn test_clock_going_backwards_is_clamped() {
        let mut builder = RecordBuilder::new();
        let t0 = Utc::now();
        let first = builder.build_at("a", t0);
        let second = builder.build_at("b", t0 - Duration::seconds(5));
        let third = builder.build_at("c", t0 + Duration::seconds(1));

        assert_eq!(first.timestamp(), t0);
        assert_eq!(second.timestamp(), t0);
        assert_eq!(third.timestamp(), t0 + Duration::seconds(1));
    }

    #[test]
    fn test_single_batch_holds_one_record() {
        let batch = LogBatch::single(LogRecord::new("foo", Utc::now()));
        assert_eq!(batch.record_count(), 1);
        assert_eq!(batch.scope(), SCOPE_NAME);
        assert_eq!(batch.records()[0].body(), "foo");
    }

    #[test]
    fn test_time_unix_nano_matches_timestamp() {
        let ts = DateTime::from_timestamp(1_700_000_000, 42).unwrap();
        let record = LogRecord::new("x", ts);
        assert_eq!(record.time_unix_nano(), 1_700_000_000_000_000_042);
    }

    #[test]
    fn test_record_serializes_body_and_timestamp() {
        let ts = DateTime::from_timestamp(0, 0).unwrap();
        let json = serde_json::to_value(LogRecord::new("hello", ts)).unwrap();
        assert_eq!(json["body"], "hello");
        assert_eq!(json["timestamp"], "1970-01-01T00:00:00Z");
    }
}
