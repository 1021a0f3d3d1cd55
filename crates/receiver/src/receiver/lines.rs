//! Lines — line splitting for both reader loops.
//!
//! `\n` and `\r\n` are both one terminator. Invalid UTF-8 is replaced with
//! U+FFFD rather than rejected: the body is an opaque payload.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Strip one trailing `\n` (and a `\r` before it) and decode lossily.
pub(crate) fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// Split a fully buffered input into lines.
///
/// A trailing fragment without a terminator is a final line; a terminator at
/// the very end does not produce an extra empty line.
pub(crate) fn split_lines(data: &[u8]) -> impl Iterator<Item = String> + '_ {
    data.split_inclusive(|b| *b == b'\n').map(decode_line)
}

/// Incremental line reader for the interactive loop.
///
/// Bytes of a line that is only partially read when the read is cancelled
/// stay in `pending` and are completed by the next call, so no line is
/// emitted twice or lost. A failed read discards the fragment instead.
pub(crate) struct LineReader<R> {
    inner: BufReader<R>,
    pending: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
            pending: Vec::new(),
        }
    }

    /// Next line without its terminator; `None` at end of stream.
    pub(crate) async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        let read = match self.inner.read_until(b'\n', &mut self.pending).await {
            Ok(read) => read,
            Err(e) => {
                self.pending.clear();
                return Err(e);
            }
        };
        if read == 0 && self.pending.is_empty() {
            return Ok(None);
        }
        let line = decode_line(&self.pending);
        self.pending.clear();
        Ok(Some(line))
    }
}
