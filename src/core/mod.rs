//! Core logger types and traits

pub mod error;
pub mod level;
pub mod log_context;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod record;
pub mod sink;

pub use error::{LoggerError, Result};
pub use level::{Level, LevelTable, REQUIRED_LEVELS};
pub use log_context::LogContext;
pub use logger::{Logger, LoggerBuilder, DEFAULT_SHUTDOWN_TIMEOUT};
pub use metrics::LoggerMetrics;
pub use output_format::OutputFormat;
pub use record::LogRecord;
pub use sink::Sink;
