//! JSON lines — writes every record as one JSON object per line.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use super::{ConsumeFuture, ConsumerError, LogsConsumer};
use crate::record::LogBatch;

pub struct JsonLinesConsumer<W> {
    writer: Mutex<W>,
}

impl JsonLinesConsumer<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> JsonLinesConsumer<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    async fn write_batch(&self, batch: LogBatch) -> Result<(), ConsumerError> {
        let mut encoded = Vec::with_capacity(64 * batch.record_count());
        for record in batch.records() {
            serde_json::to_writer(&mut encoded, record)?;
            encoded.push(b'\n');
        }

        let mut writer = self.writer.lock().await;
        writer.write_all(&encoded).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::BrokenPipe => ConsumerError::Closed,
            _ => ConsumerError::Io(e),
        })?;
        writer.flush().await?;
        Ok(())
    }
}

impl<W> LogsConsumer for JsonLinesConsumer<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn consume_logs(&self, batch: LogBatch) -> ConsumeFuture<'_> {
        Box::pin(self.write_batch(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LogRecord;
    use chrono::DateTime;

    #[tokio::test]
    async fn test_writes_one_json_object_per_record() {
        let consumer = JsonLinesConsumer::new(Vec::new());
        let ts = DateTime::from_timestamp(0, 0).unwrap();

        consumer.consume_logs(LogBatch::single(LogRecord::new("foo", ts))).await.unwrap();
        consumer.consume_logs(LogBatch::single(LogRecord::new("bar", ts))).await.unwrap();

        let output = String::from_utf8(consumer.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["body"], "foo");
        assert_eq!(first["timestamp"], "1970-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_body_with_quotes_is_escaped() {
        let consumer = JsonLinesConsumer::new(Vec::new());
        let ts = DateTime::from_timestamp(0, 0).unwrap();
        consumer
            .consume_logs(LogBatch::single(LogRecord::new("say \"hi\"", ts)))
            .await
            .unwrap();

        let output = String::from_utf8(consumer.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(output.trim_end()).unwrap();
        assert_eq!(value["body"], "say \"hi\"");
    }
}
