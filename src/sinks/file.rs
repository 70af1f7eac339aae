//! Local file sink

use crate::core::{Level, LogRecord, LoggerError, OutputFormat, Result, Sink};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Appends one formatted record per line to a local file
///
/// Several sinks may write to the same file through [`FileSink::share`]; they
/// then serialize on one writer, so lines never interleave.
///
/// # Example
///
/// ```no_run
/// use rust_log_router::prelude::*;
///
/// let sink = FileSink::open("app.log", Level::DEBUG, OutputFormat::Full).unwrap();
/// let logger = Logger::builder().sink(sink).build().unwrap();
/// logger.info("written to app.log");
/// ```
pub struct FileSink {
    path: PathBuf,
    name: String,
    min_level: Level,
    format: OutputFormat,
    auto_flush: bool,
    writer: Arc<Mutex<BufWriter<File>>>,
}

impl FileSink {
    /// Open `path` for appending, creating it and its parent directories
    pub fn open(path: impl Into<PathBuf>, min_level: Level, format: OutputFormat) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "creating log directory",
                    format!("cannot create '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "opening log file",
                    format!("cannot open '{}'", path.display()),
                    e,
                )
            })?;

        Ok(Self {
            name: format!("file:{}", path.display()),
            path,
            min_level,
            format,
            auto_flush: true,
            writer: Arc::new(Mutex::new(BufWriter::new(file))),
        })
    }

    /// Another sink on the same open file, with its own threshold and format
    #[must_use]
    pub fn share(&self, min_level: Level, format: OutputFormat) -> Self {
        Self {
            path: self.path.clone(),
            name: self.name.clone(),
            min_level,
            format,
            auto_flush: self.auto_flush,
            writer: Arc::clone(&self.writer),
        }
    }

    /// Flush after every record (default: enabled)
    #[must_use]
    pub fn with_auto_flush(mut self, enable: bool) -> Self {
        self.auto_flush = enable;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn write(&self, record: &LogRecord) -> Result<()> {
        let mut line = self.format.format(record);
        line.push('\n');

        let mut writer = self.writer.lock();
        writer
            .write_all(line.as_bytes())
            .map_err(|e| LoggerError::file_sink(self.path.display().to_string(), e.to_string()))?;
        if self.auto_flush {
            writer.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn format(&self) -> OutputFormat {
        self.format
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.writer.lock().flush();
    }
}
