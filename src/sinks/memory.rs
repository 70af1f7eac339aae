//! In-memory sink that keeps every record it receives

use crate::core::{Level, LogRecord, OutputFormat, Result, Sink};
use parking_lot::Mutex;

/// Captures records and their formatted payloads in arrival order
///
/// Handy for tests and for embedders that want to inspect output without I/O.
pub struct MemorySink {
    name: String,
    min_level: Level,
    format: OutputFormat,
    entries: Mutex<Vec<(LogRecord, String)>>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>, min_level: Level) -> Self {
        Self::with_format(name, min_level, OutputFormat::Full)
    }

    pub fn with_format(name: impl Into<String>, min_level: Level, format: OutputFormat) -> Self {
        Self {
            name: name.into(),
            min_level,
            format,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.entries.lock().iter().map(|(r, _)| r.clone()).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries.lock().iter().map(|(r, _)| r.message.clone()).collect()
    }

    /// Formatted payloads, as a wire sink would have sent them
    pub fn payloads(&self) -> Vec<String> {
        self.entries.lock().iter().map(|(_, p)| p.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write(&self, record: &LogRecord) -> Result<()> {
        let payload = self.format.format(record);
        self.entries.lock().push((record.clone(), payload));
        Ok(())
    }

    fn flush(&self) -> Result<()> {
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
