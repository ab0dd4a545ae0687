//! Destinations for rendered record lines

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Receives one complete record line at a time.
///
/// Implementations must write the line as one unit and flush before
/// returning, so interleaved writers never split a record.
pub trait LineSink: Send + Sync {
    /// Append `line` (which already ends in `\n`) and flush.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the line could not be written.
    fn write_line(&self, line: &str) -> io::Result<()>;
}

/// Sink over any `Write`, serialized by a mutex
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the inner writer
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> LineSink for WriterSink<W> {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("sink writer lock poisoned"))?;
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }
}

/// Append-only log file
pub type FileSink = WriterSink<File>;

impl WriterSink<File> {
    /// Open (creating if needed) `path` in append mode.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened.
    pub fn append<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

/// In-memory sink; clones share the same buffer
#[derive(Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().map(|l| l.is_empty()).unwrap_or(true)
    }

    pub fn clear(&self) {
        self.lines.lock().map(|mut l| l.clear()).ok();
    }
}

impl LineSink for MemorySink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .map(|mut lines| lines.push(line.to_string()))
            .map_err(|_| io::Error::other("memory sink lock poisoned"))
    }
}
