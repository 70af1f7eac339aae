//! Logger facade: scoped metadata and leveled fan-out to sinks

use super::{
    error::{LoggerError, Result},
    level::{Level, LevelTable},
    log_context::LogContext,
    metrics::LoggerMetrics,
    record::LogRecord,
    sink::Sink,
};
use serde_json::Value;
use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default time a closing sink waits for its worker to drain (5 seconds)
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Explicit logger value, built once at startup and passed to whoever logs
///
/// Cloning is cheap: clones and children share the level table, the sink list
/// and the metrics. Only the accumulated metadata differs between scopes.
///
/// # Example
///
/// ```
/// use rust_log_router::prelude::*;
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::new("memory", Level::DEBUG));
/// let logger = Logger::builder()
///     .shared_sink(sink.clone())
///     .build()
///     .unwrap();
///
/// logger
///     .child(LogContext::new().with_field("component", "AppService"))
///     .info("about to say hello");
///
/// assert_eq!(sink.records()[0].metadata.get("component").unwrap(), "AppService");
/// ```
#[derive(Clone)]
pub struct Logger {
    levels: Arc<LevelTable>,
    sinks: Arc<[Arc<dyn Sink>]>,
    context: Arc<LogContext>,
    metrics: Arc<LoggerMetrics>,
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// New scope whose records carry `context` on top of this logger's fields
    ///
    /// Shallow merge; on key conflicts the child wins. `self` is not modified.
    #[must_use]
    pub fn child(&self, context: LogContext) -> Logger {
        Logger {
            levels: Arc::clone(&self.levels),
            sinks: Arc::clone(&self.sinks),
            context: Arc::new(self.context.merged(&context)),
            metrics: Arc::clone(&self.metrics),
        }
    }

    pub fn context(&self) -> &LogContext {
        &self.context
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    pub fn sinks(&self) -> &[Arc<dyn Sink>] {
        &self.sinks
    }

    /// Get the logger metrics
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn log(&self, level: Level, message: impl AsRef<str>) {
        self.log_record(LogRecord::new(level, message));
    }

    /// Log with per-call fields; they override the scope's fields
    pub fn log_with_context(&self, level: Level, message: impl AsRef<str>, context: LogContext) {
        self.log_record(LogRecord::new(level, message).with_metadata(context));
    }

    /// Log by level name
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::UnknownLevel`] when `level` is not registered;
    /// nothing is delivered in that case.
    pub fn try_log(&self, level: &str, message: impl AsRef<str>) -> Result<()> {
        let level = self.levels.get(level)?;
        self.log(level, message);
        Ok(())
    }

    /// Deliver a fully built record to every sink that admits its level
    ///
    /// Never fails. The record's level is matched to this logger's table by
    /// name, so `Level::ERROR` means whatever priority the table gives
    /// `error`. A record whose level name is not registered is rejected: it
    /// reaches no sink and is counted in [`LoggerMetrics::rejected_count`].
    pub fn log_record(&self, mut record: LogRecord) {
        let Some(level) = self.levels.resolve(record.level) else {
            self.metrics.record_rejected();
            eprintln!(
                "[LOGGER ERROR] Rejected record at unregistered level '{}' (priority {})",
                record.level.name(),
                record.level.priority()
            );
            return;
        };
        record.level = level;

        if !self.context.is_empty() {
            record.metadata = self.context.merged(&record.metadata);
        }

        Self::fan_out(&self.sinks, &record, &self.metrics);
    }

    /// Deliver to each admitting sink in registration order
    ///
    /// **Per-Sink Panic Isolation**: every write is wrapped in `catch_unwind`,
    /// so one failing or panicking sink never keeps the record from the rest.
    /// Failures go to stderr, never back through the logger.
    fn fan_out(sinks: &[Arc<dyn Sink>], record: &LogRecord, metrics: &LoggerMetrics) {
        for (idx, sink) in sinks.iter().enumerate() {
            if !sink.admits(record.level) {
                continue;
            }

            let write_result = {
                let _delivering = DeliveryGuard::enter();
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.write(record)))
            };

            match write_result {
                Ok(Ok(())) => {
                    metrics.record_delivered();
                }
                Ok(Err(e)) => {
                    eprintln!(
                        "[LOGGER ERROR] Sink #{} ({}) failed: {}",
                        idx,
                        sink.name(),
                        e
                    );
                    metrics.record_failed();
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Sink #{} ({}) panicked: {}. \
                         Other sinks continue to function.",
                        idx,
                        sink.name(),
                        panic_message(panic_info.as_ref())
                    );
                    metrics.record_failed();
                }
            }
        }
    }

    /// Flush every sink, returning the first error after trying all of them
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for sink in self.sinks.iter() {
            if let Err(e) = sink.flush() {
                eprintln!("[LOGGER ERROR] Sink ({}) flush failed: {}", sink.name(), e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    #[inline]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(Level::ERROR, message);
    }

    #[inline]
    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(Level::WARN, message);
    }

    #[inline]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(Level::INFO, message);
    }

    #[inline]
    pub fn http(&self, message: impl AsRef<str>) {
        self.log(Level::HTTP, message);
    }

    #[inline]
    pub fn audit(&self, message: impl AsRef<str>) {
        self.log(Level::AUDIT, message);
    }

    #[inline]
    pub fn verbose(&self, message: impl AsRef<str>) {
        self.log(Level::VERBOSE, message);
    }

    #[inline]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(Level::DEBUG, message);
    }
}

impl Default for Logger {
    /// Standard levels, no sinks
    fn default() -> Self {
        Logger {
            levels: Arc::new(LevelTable::standard()),
            sinks: Arc::from(Vec::new()),
            context: Arc::new(LogContext::new()),
            metrics: Arc::new(LoggerMetrics::new()),
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("levels", &self.levels)
            .field(
                "sinks",
                &self.sinks.iter().map(|s| s.name().to_string()).collect::<Vec<_>>(),
            )
            .field("context", &self.context)
            .finish()
    }
}

thread_local! {
    // set while this thread is inside a sink write
    static DELIVERING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside a sink write until dropped
struct DeliveryGuard {
    previous: bool,
}

impl DeliveryGuard {
    fn enter() -> Self {
        Self {
            previous: DELIVERING.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for DeliveryGuard {
    fn drop(&mut self) {
        let previous = self.previous;
        DELIVERING.with(|flag| flag.set(previous));
    }
}

/// True while the current thread is inside a sink write
///
/// A panic raised there is caught and reported by the fan-out itself.
pub(crate) fn in_sink_write() -> bool {
    DELIVERING.with(Cell::get)
}

/// Extract a readable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_log_router::prelude::*;
///
/// let logger = Logger::builder()
///     .levels(LevelTable::standard())
///     .sink(MemorySink::new("debug-tier", Level::DEBUG))
///     .field("service", "api")
///     .build()
///     .unwrap();
/// assert_eq!(logger.sinks().len(), 1);
/// ```
pub struct LoggerBuilder {
    levels: LevelTable,
    sinks: Vec<Arc<dyn Sink>>,
    context: LogContext,
}

impl LoggerBuilder {
    /// Create a new builder with the standard level table and no sinks
    pub fn new() -> Self {
        Self {
            levels: LevelTable::standard(),
            sinks: Vec::new(),
            context: LogContext::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn levels(mut self, levels: LevelTable) -> Self {
        self.levels = levels;
        self
    }

    /// Add a sink; delivery follows the order sinks are added
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Add a sink that is also held elsewhere
    #[must_use = "builder methods return a new value"]
    pub fn shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sinks(mut self, sinks: impl IntoIterator<Item = Arc<dyn Sink>>) -> Self {
        self.sinks.extend(sinks);
        self
    }

    /// Base metadata carried by every record
    #[must_use = "builder methods return a new value"]
    pub fn context(mut self, context: LogContext) -> Self {
        self.context = context;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.add_field(key, value);
        self
    }

    /// Build the Logger
    ///
    /// # Errors
    ///
    /// A sink whose threshold is not a registered level is a configuration
    /// error.
    pub fn build(self) -> Result<Logger> {
        for sink in &self.sinks {
            let threshold = sink.min_level();
            if !self.levels.contains(threshold) {
                return Err(LoggerError::config(
                    sink.name(),
                    format!("threshold '{}' is not a registered level", threshold),
                ));
            }
        }

        Ok(Logger {
            levels: Arc::new(self.levels),
            sinks: Arc::from(self.sinks),
            context: Arc::new(self.context),
            metrics: Arc::new(LoggerMetrics::new()),
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OutputFormat;
    use crate::sinks::MemorySink;
    use serde_json::json;

    struct FailingSink;

    impl Sink for FailingSink {
        fn write(&self, _record: &LogRecord) -> Result<()> {
            Err(LoggerError::other("Simulated failure"))
        }
        fn flush(&self) -> Result<()> {
            Err(LoggerError::other("Simulated flush failure"))
        }
        fn min_level(&self) -> Level {
            Level::DEBUG
        }
        fn format(&self) -> OutputFormat {
            OutputFormat::Full
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    struct PanickingSink;

    impl Sink for PanickingSink {
        fn write(&self, _record: &LogRecord) -> Result<()> {
            panic!("sink exploded");
        }
        fn flush(&self) -> Result<()> {
            Ok(())
        }
        fn min_level(&self) -> Level {
            Level::DEBUG
        }
        fn format(&self) -> OutputFormat {
            OutputFormat::Full
        }
        fn name(&self) -> &str {
            "panicking"
        }
    }

    #[test]
    fn test_threshold_filtering() {
        let errors = Arc::new(MemorySink::new("errors", Level::ERROR));
        let infos = Arc::new(MemorySink::new("infos", Level::INFO));
        let logger = Logger::builder()
            .shared_sink(errors.clone())
            .shared_sink(infos.clone())
            .build()
            .unwrap();

        logger.error("e");
        logger.info("i");
        logger.debug("d");

        assert_eq!(errors.messages(), vec!["e"]);
        assert_eq!(infos.messages(), vec!["e", "i"]);
    }

    #[test]
    fn test_child_merges_without_touching_parent() {
        let sink = Arc::new(MemorySink::new("all", Level::DEBUG));
        let parent = Logger::builder()
            .shared_sink(sink.clone())
            .field("service", "api")
            .field("component", "root")
            .build()
            .unwrap();

        let child = parent.child(LogContext::new().with_field("component", "AppService"));
        child.info("from child");
        parent.info("from parent");

        let records = sink.records();
        assert_eq!(records[0].metadata.get("component"), Some(&json!("AppService")));
        assert_eq!(records[0].metadata.get("service"), Some(&json!("api")));
        assert_eq!(records[1].metadata.get("component"), Some(&json!("root")));
    }

    #[test]
    fn test_call_fields_override_scope() {
        let sink = Arc::new(MemorySink::new("all", Level::DEBUG));
        let logger = Logger::builder()
            .shared_sink(sink.clone())
            .field("operation", "scope")
            .build()
            .unwrap();

        logger.log_with_context(
            Level::INFO,
            "call",
            LogContext::new().with_field("operation", "call"),
        );
        assert_eq!(sink.records()[0].metadata.get("operation"), Some(&json!("call")));
    }

    #[test]
    fn test_failing_sink_does_not_block_others() {
        let after = Arc::new(MemorySink::new("after", Level::DEBUG));
        let logger = Logger::builder()
            .sink(FailingSink)
            .sink(PanickingSink)
            .shared_sink(after.clone())
            .build()
            .unwrap();

        logger.info("still delivered");

        assert_eq!(after.messages(), vec!["still delivered"]);
        assert_eq!(logger.metrics().failed_count(), 2);
        assert_eq!(logger.metrics().delivered_count(), 1);
    }

    #[test]
    fn test_unknown_level_rejected() {
        let sink = Arc::new(MemorySink::new("all", Level::DEBUG));
        let logger = Logger::builder().shared_sink(sink.clone()).build().unwrap();

        logger.log(Level::new("loud", 0), "not registered");
        assert!(sink.records().is_empty());
        assert_eq!(logger.metrics().rejected_count(), 1);

        let err = logger.try_log("loud", "nope").unwrap_err();
        assert!(matches!(err, LoggerError::UnknownLevel { .. }));
        assert!(sink.records().is_empty());

        logger.try_log("audit", "ok").unwrap();
        assert_eq!(sink.messages(), vec!["ok"]);
    }

    #[test]
    fn test_renumbered_table_resolves_by_name() {
        let levels = LevelTable::new(&[
            Level::new("error", 10),
            Level::new("info", 20),
            Level::new("debug", 30),
        ])
        .unwrap();
        let errors = Arc::new(MemorySink::new("errors", levels.get("error").unwrap()));
        let all = Arc::new(MemorySink::new("all", levels.most_permissive()));
        let logger = Logger::builder()
            .levels(levels)
            .shared_sink(errors.clone())
            .shared_sink(all.clone())
            .build()
            .unwrap();

        logger.error("e");
        logger.info("i");
        logger.debug("d");
        logger.warn("not registered");

        assert_eq!(errors.messages(), vec!["e"]);
        assert_eq!(all.messages(), vec!["e", "i", "d"]);
        assert_eq!(all.records()[2].level, Level::new("debug", 30));
        assert_eq!(logger.metrics().rejected_count(), 1);
    }

    #[test]
    fn test_delivery_flag_scoped_to_sink_write() {
        struct FlagRecorder(Arc<parking_lot::Mutex<Vec<bool>>>);

        impl Sink for FlagRecorder {
            fn write(&self, _record: &LogRecord) -> Result<()> {
                self.0.lock().push(in_sink_write());
                Ok(())
            }
            fn flush(&self) -> Result<()> {
                Ok(())
            }
            fn min_level(&self) -> Level {
                Level::DEBUG
            }
            fn format(&self) -> OutputFormat {
                OutputFormat::Full
            }
            fn name(&self) -> &str {
                "flag"
            }
        }

        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let logger = Logger::builder()
            .sink(PanickingSink)
            .sink(FlagRecorder(Arc::clone(&seen)))
            .build()
            .unwrap();

        logger.info("x");
        assert_eq!(*seen.lock(), vec![true]);
        // reset even after the panicking write unwound
        assert!(!in_sink_write());
    }

    #[test]
    fn test_build_rejects_unregistered_threshold() {
        let result = Logger::builder()
            .sink(MemorySink::new("odd", Level::new("trace", 9)))
            .build();
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_flush_reports_first_error() {
        let logger = Logger::builder()
            .sink(MemorySink::new("ok", Level::DEBUG))
            .sink(FailingSink)
            .build()
            .unwrap();
        assert!(logger.flush().is_err());
    }

    #[test]
    fn test_default_logger_has_no_sinks() {
        let logger = Logger::default();
        logger.info("goes nowhere");
        assert_eq!(logger.metrics().delivered_count(), 0);
        assert!(format!("{:?}", logger).contains("Logger"));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(payload.as_ref()), "static str");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "Unknown panic");
    }
}
