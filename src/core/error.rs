//! Error types for the log router

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Level name not present in the level table
    #[error("Unknown log level: '{name}'")]
    UnknownLevel { name: String },

    /// Two levels share a name or a priority
    #[error("Duplicate log level {field}: '{value}'")]
    DuplicateLevel { field: &'static str, value: String },

    /// File sink error with path
    #[error("File sink error for '{path}': {message}")]
    FileSinkError { path: String, message: String },

    /// Remote transport failure
    #[error("Transport error for stream '{stream}': {message}")]
    TransportError { stream: String, message: String },

    /// Remote sink queue is full
    #[error("Sink queue full: {capacity} payloads buffered")]
    QueueFull { capacity: usize },

    /// Sink worker is gone
    #[error("Sink already closed")]
    SinkClosed,

    /// Panic hook registered twice
    #[error("Uncaught-error capture is already installed")]
    CaptureAlreadyInstalled,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn unknown_level(name: impl Into<String>) -> Self {
        LoggerError::UnknownLevel { name: name.into() }
    }

    /// Create a file sink error
    pub fn file_sink(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileSinkError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a transport error for a stream
    pub fn transport(stream: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::TransportError {
            stream: stream.into(),
            message: message.into(),
        }
    }

    pub fn queue_full(capacity: usize) -> Self {
        LoggerError::QueueFull { capacity }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Whether this error was raised while assembling the startup configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LoggerError::InvalidConfiguration { .. }
                | LoggerError::UnknownLevel { .. }
                | LoggerError::DuplicateLevel { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::queue_full(1024);
        assert!(matches!(err, LoggerError::QueueFull { .. }));

        let err = LoggerError::config("RemoteStreamSink", "missing region");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        assert!(err.is_configuration());

        let err = LoggerError::file_sink("/var/log/app.log", "Permission denied");
        assert!(matches!(err, LoggerError::FileSinkError { .. }));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::unknown_level("loud");
        assert_eq!(err.to_string(), "Unknown log level: 'loud'");

        let err = LoggerError::transport("error-api", "connection refused");
        assert_eq!(
            err.to_string(),
            "Transport error for stream 'error-api': connection refused"
        );

        let err = LoggerError::config("LOG_GROUP_NAME", "value is required");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for LOG_GROUP_NAME: value is required"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("opening log file", "cannot open app.log", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("opening log file"));
        assert!(err.to_string().contains("cannot open app.log"));
    }
}
