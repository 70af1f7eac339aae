//! Logging macros for ergonomic log message formatting.
//!
//! These macros format like `format!` and emit through a [`Logger`](crate::Logger).
//!
//! # Examples
//!
//! ```
//! use rust_log_router::prelude::*;
//! use rust_log_router::{info, log};
//!
//! let logger = Logger::default();
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! log!(logger, Level::HTTP, "GET /users/{} {}", 7, 200);
//! ```

/// Log a message at an explicit level with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_log_router::prelude::*;
/// # let logger = Logger::default();
/// use rust_log_router::log;
/// log!(logger, Level::INFO, "Simple message");
/// log!(logger, Level::ERROR, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+))
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::ERROR, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::WARN, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_router::prelude::*;
/// # let logger = Logger::default();
/// use rust_log_router::info;
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::INFO, $($arg)+)
    };
}

/// Log an audit-level message.
#[macro_export]
macro_rules! audit {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::AUDIT, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::DEBUG, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Level, Logger};
    use crate::sinks::MemorySink;
    use std::sync::Arc;

    fn logger() -> (Logger, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new("all", Level::DEBUG));
        let logger = Logger::builder().shared_sink(sink.clone()).build().unwrap();
        (logger, sink)
    }

    #[test]
    fn test_log_macro() {
        let (logger, sink) = logger();
        log!(logger, Level::HTTP, "Formatted: {}", 42);
        let records = sink.records();
        assert_eq!(records[0].level, Level::HTTP);
        assert_eq!(records[0].message, "Formatted: 42");
    }

    #[test]
    fn test_level_macros() {
        let (logger, sink) = logger();
        error!(logger, "Code: {}", 500);
        warn!(logger, "Retry {} of {}", 1, 3);
        info!(logger, "Items: {}", 100);
        audit!(logger, "User {} signed in", "ada");
        debug!(logger, "Count: {}", 5);

        let levels: Vec<_> = sink.records().iter().map(|r| r.level.name()).collect();
        assert_eq!(levels, vec!["error", "warn", "info", "audit", "debug"]);
        assert_eq!(sink.messages()[3], "User ada signed in");
    }
}
