//! Output sinks
//!
//! The driver picks one sink per run and every renderer writes through it.

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::Path;

/// Destination for rendered reports
pub enum OutputSink {
    /// Process stdout
    Stdout(io::Stdout),
    /// A file opened with `-o`
    File(BufWriter<File>),
    /// In-memory buffer, used by tests
    Buffer(Vec<u8>),
}

impl OutputSink {
    pub fn stdout() -> Self {
        Self::Stdout(io::stdout())
    }

    /// Create (or truncate) `path`
    ///
    /// # Errors
    /// Returns error if the file cannot be created
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self::File(BufWriter::new(File::create(path)?)))
    }

    pub fn buffer() -> Self {
        Self::Buffer(Vec::new())
    }

    /// Whether colour codes should be written
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Stdout(out) => out.is_terminal(),
            Self::File(_) | Self::Buffer(_) => false,
        }
    }

    /// Buffered text, empty for other sinks
    #[must_use]
    pub fn contents(&self) -> String {
        match self {
            Self::Buffer(buf) => String::from_utf8_lossy(buf).into_owned(),
            Self::Stdout(_) | Self::File(_) => String::new(),
        }
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(out) => out.write(buf),
            Self::File(file) => file.write(buf),
            Self::Buffer(vec) => vec.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(out) => out.flush(),
            Self::File(file) => file.flush(),
            Self::Buffer(_) => Ok(()),
        }
    }
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Stdout(_) => "stdout",
            Self::File(_) => "file",
            Self::Buffer(_) => "buffer",
        };
        f.debug_tuple("OutputSink").field(&kind).finish()
    }
}
