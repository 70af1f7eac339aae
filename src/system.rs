//! The three purpose loggers a service needs, assembled once at startup

use crate::capture::UncaughtCapture;
use crate::config::LoggingConfig;
use crate::core::{LevelTable, Logger, Result};
use crate::factory::{Purpose, SinkFactory};
use crate::sinks::{TcpTransportProvider, TransportProvider};
use crate::translator::ErrorTranslator;

/// Ordinary, exception and rejection loggers built from one configuration
///
/// # Example
///
/// ```no_run
/// use rust_log_router::LoggingSystem;
///
/// // fails fast on missing remote settings outside development
/// let system = LoggingSystem::from_env().expect("logging configuration");
/// system.capture().install().expect("capture installed once");
///
/// system.logger().info("service started");
/// ```
#[derive(Debug, Clone)]
pub struct LoggingSystem {
    logger: Logger,
    exceptions: Logger,
    rejections: Logger,
}

impl LoggingSystem {
    /// Read the environment and build with the standard levels
    pub fn from_env() -> Result<Self> {
        Self::from_config(LoggingConfig::from_env()?, LevelTable::standard())
    }

    /// Prefix stream naming, TCP forwarding to the configured collector
    pub fn from_config(config: LoggingConfig, levels: LevelTable) -> Result<Self> {
        let transports = TcpTransportProvider::new(config.collector_addr.clone());
        let factory = SinkFactory::new(config, levels);
        Self::from_factory(&factory, &transports)
    }

    /// Build every purpose; the first configuration error aborts
    pub fn from_factory(factory: &SinkFactory, transports: &dyn TransportProvider) -> Result<Self> {
        // plan everything before opening files or spawning workers
        for purpose in Purpose::ALL {
            factory.plan(purpose)?;
        }

        Ok(Self {
            logger: factory.logger(Purpose::Logs, transports)?,
            exceptions: factory.logger(Purpose::Exceptions, transports)?,
            rejections: factory.logger(Purpose::Rejections, transports)?,
        })
    }

    /// Assemble from loggers built elsewhere, e.g. over in-memory sinks
    pub fn from_loggers(logger: Logger, exceptions: Logger, rejections: Logger) -> Self {
        Self {
            logger,
            exceptions,
            rejections,
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn exceptions(&self) -> &Logger {
        &self.exceptions
    }

    pub fn rejections(&self) -> &Logger {
        &self.rejections
    }

    pub fn translator(&self) -> ErrorTranslator {
        ErrorTranslator::new(self.logger.clone())
    }

    pub fn capture(&self) -> UncaughtCapture {
        UncaughtCapture::new(self.exceptions.clone(), self.rejections.clone())
    }

    pub fn flush(&self) -> Result<()> {
        let results = [
            self.logger.flush(),
            self.exceptions.flush(),
            self.rejections.flush(),
        ];
        results.into_iter().collect()
    }
}
