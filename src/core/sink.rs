//! Sink trait for log destinations

use super::{error::Result, level::Level, output_format::OutputFormat, record::LogRecord};

/// A destination for log records
///
/// Sinks are shared by every clone of a logger and may be called from many
/// threads at once, so implementations synchronize their own state. Writes to
/// one sink must be observed in the order `write` was called.
pub trait Sink: Send + Sync {
    /// Deliver one record. The logger only calls this for admitted levels.
    fn write(&self, record: &LogRecord) -> Result<()>;

    fn flush(&self) -> Result<()>;

    /// Least severe level this sink accepts
    fn min_level(&self) -> Level;

    fn format(&self) -> OutputFormat;

    fn name(&self) -> &str;

    #[inline]
    fn admits(&self, level: Level) -> bool {
        self.min_level().admits(level)
    }
}
