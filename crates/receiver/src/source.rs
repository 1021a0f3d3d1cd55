//! Source — the input stream and interactive/piped classification.

use std::fmt;

use tokio::io::AsyncRead;

pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A live terminal: unbounded, read line by line.
    Interactive,
    /// Redirected from a file or another process: bounded, read eagerly.
    Piped,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Interactive => "interactive",
            Mode::Piped => "piped",
        }
    }

    /// Character devices (terminals, `/dev/null`) are interactive.
    pub fn from_char_device(is_char_device: bool) -> Self {
        if is_char_device {
            Mode::Interactive
        } else {
            Mode::Piped
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the process's standard input.
///
/// Falls back to [`Mode::Interactive`] when the handle cannot be inspected,
/// which keeps the receiver responsive to user interrupts.
#[cfg(unix)]
pub fn classify() -> Mode {
    classify_path(std::path::Path::new("/dev/stdin"))
}

/// Classify whatever `path` refers to; a failed stat is interactive.
#[cfg(unix)]
pub fn classify_path(path: &std::path::Path) -> Mode {
    use std::os::unix::fs::FileTypeExt;

    match std::fs::metadata(path) {
        Ok(meta) => Mode::from_char_device(meta.file_type().is_char_device()),
        Err(e) => {
            tracing::debug!("Cannot stat {} ({}), assuming interactive", path.display(), e);
            Mode::Interactive
        }
    }
}

#[cfg(not(unix))]
pub fn classify() -> Mode {
    use std::io::IsTerminal;

    Mode::from_char_device(std::io::stdin().is_terminal())
}

enum Classification {
    Detect,
    Fixed(Mode),
}

/// The stream a receiver reads lines from.
///
/// [`InputStream::stdin`] classifies the real handle when the receiver
/// starts; injected readers carry their mode explicitly.
pub struct InputStream {
    reader: BoxedReader,
    classification: Classification,
}

impl InputStream {
    pub fn stdin() -> Self {
        Self {
            reader: Box::new(tokio::io::stdin()),
            classification: Classification::Detect,
        }
    }

    pub fn piped(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self::with_mode(reader, Mode::Piped)
    }

    pub fn interactive(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self::with_mode(reader, Mode::Interactive)
    }

    pub fn with_mode(reader: impl AsyncRead + Send + Unpin + 'static, mode: Mode) -> Self {
        Self {
            reader: Box::new(reader),
            classification: Classification::Fixed(mode),
        }
    }

    /// Resolve the mode for this run.
    pub fn mode(&self) -> Mode {
        match self.classification {
            Classification::Detect => classify(),
            Classification::Fixed(mode) => mode,
        }
    }

    pub fn into_reader(self) -> BoxedReader {
        self.reader
    }
}

impl fmt::Debug for InputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let classification = match self.classification {
            Classification::Detect => "detect",
            Classification::Fixed(mode) => mode.as_str(),
        };
        f.debug_struct("InputStream")
            .field("classification", &classification)
            .finish_non_exhaustive()
    }
}
