//! Consumer — the downstream interface records are forwarded to.
//!
//! `json_lines.rs` provides the writer used by the binary.
//! `sink.rs` provides an in-memory collecting double for tests.

pub mod json_lines;
pub mod sink;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::record::LogBatch;

pub use json_lines::JsonLinesConsumer;
pub use sink::LogsSink;

#[derive(Error, Debug)]
pub enum ConsumerError {
    #[error("Batch rejected: {0}")]
    Rejected(String),
    #[error("Consumer closed")]
    Closed,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type ConsumeFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ConsumerError>> + Send + 'a>>;

/// Accepts log batches from a receiver.
///
/// Object-safe thanks to the boxed future return. Implementations must be
/// `Send + Sync` so they can be shared with the detached reader task.
pub trait LogsConsumer: Send + Sync {
    fn consume_logs(&self, batch: LogBatch) -> ConsumeFuture<'_>;
}
