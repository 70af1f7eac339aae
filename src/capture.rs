//! Uncaught-error capture
//!
//! Panics are routed to the exception logger through a process-wide panic
//! hook. Errors nobody handled (a `Result` dropped at the top of a worker, a
//! joined thread that failed, a spawned task that returned `Err`) are routed to
//! the rejection logger. Nothing is rethrown.

use crate::core::{
    logger::{in_sink_write, panic_message},
    Level, LogContext, LogRecord, Logger, LoggerError, Result,
};
use crate::translator::error_detail;
use serde_json::json;
use std::any::Any;
use std::cell::Cell;
use std::error::Error;
use std::panic::Location;
use std::sync::OnceLock;
use std::thread::{self, JoinHandle};

static INSTALLED: OnceLock<UncaughtCapture> = OnceLock::new();

thread_local! {
    // set while this thread is inside a report
    static REPORTING: Cell<bool> = const { Cell::new(false) };
}

/// Clears the reporting flag when dropped, even on unwind
struct Reporting;

impl Drop for Reporting {
    fn drop(&mut self) {
        REPORTING.with(|flag| flag.set(false));
    }
}

/// Runs `report` unless this thread is already reporting
fn guarded(report: impl FnOnce()) {
    if REPORTING.with(|flag| flag.replace(true)) {
        return;
    }
    let _reporting = Reporting;
    report();
}

/// Routes panics and unhandled errors to dedicated loggers
///
/// # Example
///
/// ```
/// use rust_log_router::prelude::*;
/// use rust_log_router::capture::UncaughtCapture;
/// use std::sync::Arc;
///
/// let rejections = Arc::new(MemorySink::new("rejections", Level::DEBUG));
/// let capture = UncaughtCapture::new(
///     Logger::default(),
///     Logger::builder().shared_sink(rejections.clone()).build().unwrap(),
/// );
///
/// let parsed: Option<u16> = capture.observe("80a".parse::<u16>());
/// assert!(parsed.is_none());
/// assert_eq!(rejections.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct UncaughtCapture {
    exceptions: Logger,
    rejections: Logger,
}

impl UncaughtCapture {
    pub fn new(exceptions: Logger, rejections: Logger) -> Self {
        Self {
            exceptions,
            rejections,
        }
    }

    pub fn exceptions(&self) -> &Logger {
        &self.exceptions
    }

    pub fn rejections(&self) -> &Logger {
        &self.rejections
    }

    /// The capture registered by [`install`](Self::install), if any
    pub fn installed() -> Option<&'static UncaughtCapture> {
        INSTALLED.get()
    }

    /// Register the process-wide panic hook
    ///
    /// The previous hook still runs after the report, so the default
    /// backtrace output is kept. Panics raised inside a sink write are
    /// caught and counted by the logger that made the write, so the hook
    /// does not report them again.
    ///
    /// # Errors
    ///
    /// [`LoggerError::CaptureAlreadyInstalled`] on every call after the
    /// first; the hook is never registered twice.
    pub fn install(self) -> Result<()> {
        INSTALLED
            .set(self)
            .map_err(|_| LoggerError::CaptureAlreadyInstalled)?;

        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if !in_sink_write() {
                if let Some(capture) = INSTALLED.get() {
                    capture.report_panic(&panic_message(info.payload()), info.location());
                }
            }
            previous(info);
        }));
        Ok(())
    }

    /// One `error` record on the exception logger, then a flush
    pub fn report_panic(&self, message: &str, location: Option<&Location<'_>>) {
        guarded(|| {
            let mut metadata = LogContext::new()
                .with_field("thread", thread::current().name().unwrap_or("<unnamed>"));
            if let Some(location) = location {
                metadata.add_field(
                    "location",
                    json!({
                        "file": location.file(),
                        "line": location.line(),
                        "column": location.column(),
                    }),
                );
            }

            self.exceptions.log_record(
                LogRecord::new(Level::ERROR, format!("Uncaught panic: {}", message))
                    .with_metadata(metadata),
            );
            // the process may be about to exit
            let _ = self.exceptions.flush();
        });
    }

    /// One `error` record on the rejection logger with the cause chain
    pub fn report_rejection(&self, error: &(dyn Error + 'static)) {
        guarded(|| {
            self.rejections.log_record(
                LogRecord::new(Level::ERROR, format!("Unhandled rejection: {}", error))
                    .with_metadata(LogContext::new().with_field("error", error_detail(error))),
            );
        });
    }

    /// Unwrap `result`, reporting an `Err` as a rejection
    pub fn observe<T, E>(&self, result: std::result::Result<T, E>) -> Option<T>
    where
        E: Error + 'static,
    {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.report_rejection(&e);
                None
            }
        }
    }

    /// Join `handle`; a panic is an exception, an `Err` a rejection
    pub fn observe_thread<T, E>(&self, handle: JoinHandle<std::result::Result<T, E>>) -> Option<T>
    where
        E: Error + 'static,
    {
        match handle.join() {
            Ok(result) => self.observe(result),
            Err(payload) => {
                self.report_joined_panic(payload.as_ref());
                None
            }
        }
    }

    fn report_joined_panic(&self, payload: &(dyn Any + Send)) {
        // the installed hook already saw it on the panicking thread
        if Self::installed().is_none() {
            self.report_panic(&panic_message(payload), None);
        }
    }

    /// Spawn `future` on the current tokio runtime and observe its outcome
    ///
    /// A panicking task is an exception, an `Err` a rejection. The returned
    /// handle resolves to `None` in both cases and when the task is aborted.
    #[cfg(feature = "tokio")]
    pub fn spawn_observed<F, T, E>(&self, future: F) -> tokio::task::JoinHandle<Option<T>>
    where
        F: std::future::Future<Output = std::result::Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Error + Send + 'static,
    {
        let capture = self.clone();
        let task = tokio::spawn(future);
        tokio::spawn(async move {
            match task.await {
                Ok(result) => capture.observe(result),
                Err(e) if e.is_panic() => {
                    capture.report_joined_panic(e.into_panic().as_ref());
                    None
                }
                Err(_) => None,
            }
        })
    }
}
