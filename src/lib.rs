//! # Rust Log Router
//!
//! Structured log routing for network services.
//!
//! ## Features
//!
//! - **Level Table**: named severities with numeric priorities, validated once
//! - **Sink Factory**: profile × purpose → file or remote stream sinks
//! - **Two Formats**: full JSON records and a fixed five-field projection
//! - **Scoped Loggers**: cheap child loggers carrying accumulated metadata
//! - **Error Translation**: any error → uniform JSON response + diagnostic record
//! - **Uncaught Capture**: panics and unhandled errors routed to their own streams
//!
//! ## Example
//!
//! ```
//! use rust_log_router::prelude::*;
//! use rust_log_router::info;
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::new("memory", Level::INFO));
//! let logger = Logger::builder().shared_sink(sink.clone()).build()?;
//!
//! info!(logger, "listening on port {}", 8080);
//! logger.debug("filtered out");
//!
//! assert_eq!(sink.messages(), vec!["listening on port 8080"]);
//! # Ok::<(), LoggerError>(())
//! ```

pub mod capture;
pub mod config;
pub mod core;
pub mod factory;
pub mod macros;
pub mod sinks;
pub mod system;
pub mod translator;

pub mod prelude {
    pub use crate::capture::UncaughtCapture;
    pub use crate::config::LoggingConfig;
    pub use crate::core::{
        Level, LevelTable, LogContext, LogRecord, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
        OutputFormat, Result, Sink,
    };
    pub use crate::factory::{Purpose, SinkFactory};
    pub use crate::sinks::{FileSink, MemorySink, RemoteStreamSink};
    pub use crate::system::LoggingSystem;
    pub use crate::translator::{ErrorResponse, ErrorTranslator, HttpException, RequestContext};
}

pub use capture::UncaughtCapture;
pub use config::{LoggingConfig, Profile};
pub use core::{
    Level, LevelTable, LogContext, LogRecord, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
    OutputFormat, Result, Sink, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use factory::{Purpose, SinkConfig, SinkFactory, SinkKind};
pub use sinks::{FileSink, MemorySink, RemoteStreamSink};
pub use system::LoggingSystem;
pub use translator::{ErrorResponse, ErrorTranslator, HttpException, RequestContext};
