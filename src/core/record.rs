//! Log record structure

use super::level::Level;
use super::log_context::LogContext;
use chrono::{DateTime, SecondsFormat, Utc};

/// One structured log event, built per emit call
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub metadata: LogContext,
    pub path: Option<String>,
    pub status_code: Option<u16>,
}

impl LogRecord {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so a record always occupies a single line in line-oriented sinks.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: Level, message: impl AsRef<str>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: Self::sanitize_message(message.as_ref()),
            metadata: LogContext::new(),
            path: None,
            status_code: None,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: LogContext) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Timestamp as ISO-8601 with millisecond precision, e.g. `2024-05-01T10:00:00.123Z`
    pub fn iso_timestamp(&self) -> String {
        iso8601(&self.timestamp)
    }
}

pub(crate) fn iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
