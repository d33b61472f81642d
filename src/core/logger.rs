//! Session log sinks
//!
//! The pipeline mirrors either the text exactly as displayed or the raw
//! received bytes into a sink. Sinks never stop the pipeline: write errors
//! are reported back and logged.

use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::Local;
use serde::{Deserialize, Serialize};

/// What gets written to the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogMode {
    /// Text of every fragment, as shown in the console
    #[default]
    AsDisplayed,
    /// Received bytes, unformatted
    Raw,
}

impl LogMode {
    /// Get name
    pub fn name(&self) -> &'static str {
        match self {
            LogMode::AsDisplayed => "As displayed",
            LogMode::Raw => "Raw",
        }
    }
}

/// Log sink errors
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Could not open the log file
    #[error("Failed to open log file {path}: {source}")]
    Open {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Write or flush failed
    #[error("Log error: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for mirrored console output
#[cfg_attr(test, mockall::automock)]
pub trait LogSink {
    /// Append bytes to the log
    fn write(&mut self, data: &[u8]) -> Result<(), LogError>;

    /// Push buffered data out
    fn flush(&mut self) -> Result<(), LogError>;
}

/// Log sink writing to a file
pub struct FileLogSink {
    file: BufWriter<File>,
    path: PathBuf,
    bytes_logged: usize,
}

impl std::fmt::Debug for FileLogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLogSink")
            .field("path", &self.path)
            .field("bytes_logged", &self.bytes_logged)
            .finish()
    }
}

impl FileLogSink {
    /// Open (or create) a log file in append mode
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LogError::Open {
                path: path.clone(),
                source,
            })?;

        tracing::info!(path = %path.display(), "Log file opened");

        Ok(Self {
            file: BufWriter::new(file),
            path,
            bytes_logged: 0,
        })
    }

    /// Log path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes written so far
    pub fn bytes_logged(&self) -> usize {
        self.bytes_logged
    }
}

impl LogSink for FileLogSink {
    fn write(&mut self, data: &[u8]) -> Result<(), LogError> {
        self.file.write_all(data)?;
        self.bytes_logged += data.len();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LogError> {
        self.file.flush()?;
        Ok(())
    }
}

impl Drop for FileLogSink {
    fn drop(&mut self) {
        let _ = self.file.flush();
    }
}

/// In-memory log sink; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct MemoryLogSink {
    data: Rc<RefCell<Vec<u8>>>,
}

impl MemoryLogSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything logged
    pub fn contents(&self) -> Vec<u8> {
        self.data.borrow().clone()
    }

    /// Logged bytes as (lossy) text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data.borrow()).into_owned()
    }
}

impl LogSink for MemoryLogSink {
    fn write(&mut self, data: &[u8]) -> Result<(), LogError> {
        self.data.borrow_mut().extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LogError> {
        Ok(())
    }
}

/// Generate log filename with timestamp
pub fn generate_log_filename(prefix: &str) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    format!("{}_{}.txt", prefix, timestamp)
}
