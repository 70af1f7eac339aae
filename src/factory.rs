//! Sink factory: profile × purpose → sink list
//!
//! Planning is pure and produces [`SinkConfig`] values, so the routing layout
//! can be inspected and tested without touching files or sockets. Building
//! turns a plan into live sinks.
//!
//! Layout outside development, for base stream `api-prod`:
//!
//! | purpose    | stream              | threshold | format    |
//! |------------|---------------------|-----------|-----------|
//! | logs       | `error-api-prod`    | error     | full      |
//! | logs       | `info-api-prod`     | info      | full      |
//! | logs       | `debug-api-prod`    | debug     | projected |
//! | exceptions | `exception-api-prod`| all       | full      |
//! | rejections | `rejection-api-prod`| all       | full      |
//!
//! Streams are split per tier and purpose so each can carry its own
//! retention and alerting in the aggregation backend.

use crate::config::{
    LoggingConfig, RemoteConnection, AWS_ACCESS_KEY_ID, AWS_REGION, AWS_SECRET_ACCESS_KEY,
    LOG_GROUP_NAME, LOG_STREAM_NAME,
};
use crate::core::{Level, LevelTable, Logger, LoggerError, OutputFormat, Result, Sink};
use crate::sinks::{FileSink, RemoteStreamSink, StreamTarget, TransportProvider};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Tiers of the ordinary-logging purpose and their formats
pub const LOG_TIERS: [(&str, OutputFormat); 3] = [
    ("error", OutputFormat::Full),
    ("info", OutputFormat::Full),
    ("debug", OutputFormat::Projected),
];

pub const EXCEPTION_TIER: &str = "exception";
pub const REJECTION_TIER: &str = "rejection";

/// What a sink list is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// Ordinary application logging
    Logs,
    /// Uncaught panics
    Exceptions,
    /// Errors nobody handled (failed background work)
    Rejections,
}

impl Purpose {
    pub const ALL: [Purpose; 3] = [Purpose::Logs, Purpose::Exceptions, Purpose::Rejections];
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Purpose::Logs => "logs",
            Purpose::Exceptions => "exceptions",
            Purpose::Rejections => "rejections",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Local,
    Remote,
}

/// Declarative description of one sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    pub kind: SinkKind,
    pub group_id: Option<String>,
    /// Stream id for remote sinks, file path for local ones
    pub stream_id: String,
    pub min_level: Level,
    pub format: OutputFormat,
    pub connection: Option<RemoteConnection>,
}

impl SinkConfig {
    /// Check required fields
    ///
    /// Remote sinks need a group, a stream, a region and both credential
    /// parts; local sinks need a path.
    pub fn validate(&self) -> Result<()> {
        if self.stream_id.trim().is_empty() {
            return Err(LoggerError::config(LOG_STREAM_NAME, "stream identifier is empty"));
        }
        if self.kind == SinkKind::Local {
            return Ok(());
        }

        let missing = |key: &str| {
            LoggerError::config(
                key,
                format!("required by remote stream '{}' but not set", self.stream_id),
            )
        };

        if self.group_id.as_deref().map_or(true, |g| g.trim().is_empty()) {
            return Err(missing(LOG_GROUP_NAME));
        }
        let connection = self.connection.as_ref().ok_or_else(|| missing(AWS_REGION))?;
        if connection.region.trim().is_empty() {
            return Err(missing(AWS_REGION));
        }
        if connection.credentials.access_key_id.trim().is_empty() {
            return Err(missing(AWS_ACCESS_KEY_ID));
        }
        if connection.credentials.secret_access_key.trim().is_empty() {
            return Err(missing(AWS_SECRET_ACCESS_KEY));
        }
        Ok(())
    }
}

/// Derives a stream id from the base id and a tier or purpose name
pub trait StreamNaming: Send + Sync {
    fn derive(&self, base: &str, tier: &str) -> String;
}

impl<F> StreamNaming for F
where
    F: Fn(&str, &str) -> String + Send + Sync,
{
    fn derive(&self, base: &str, tier: &str) -> String {
        self(base, tier)
    }
}

/// `<tier>-<base>`
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixNaming;

impl StreamNaming for PrefixNaming {
    fn derive(&self, base: &str, tier: &str) -> String {
        format!("{}-{}", tier, base)
    }
}

/// Layout keyed on the second `-` segment of the base id
///
/// The error and exception tiers write to the base stream itself; other tiers
/// go to `<alias>-<token>`. With base `api-prod`: info → `timeRes-prod`,
/// debug → `audit-prod`. A base without `-` is used whole as the token.
#[derive(Debug, Clone)]
pub struct TokenNaming {
    aliases: HashMap<String, String>,
    passthrough: Vec<String>,
}

impl TokenNaming {
    pub fn new() -> Self {
        Self {
            aliases: HashMap::from([
                ("info".to_string(), "timeRes".to_string()),
                ("debug".to_string(), "audit".to_string()),
            ]),
            passthrough: vec!["error".to_string(), EXCEPTION_TIER.to_string()],
        }
    }

    #[must_use]
    pub fn with_alias(mut self, tier: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.insert(tier.into(), alias.into());
        self
    }
}

impl Default for TokenNaming {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamNaming for TokenNaming {
    fn derive(&self, base: &str, tier: &str) -> String {
        if self.passthrough.iter().any(|t| t == tier) {
            return base.to_string();
        }
        let alias = self.aliases.get(tier).map_or(tier, String::as_str);
        let token = base.split('-').nth(1).unwrap_or(base);
        format!("{}-{}", alias, token)
    }
}

/// Builds sink lists for each [`Purpose`]
///
/// # Example
///
/// ```
/// use rust_log_router::config::LoggingConfig;
/// use rust_log_router::factory::{Purpose, SinkFactory, SinkKind};
/// use rust_log_router::LevelTable;
///
/// let factory = SinkFactory::new(LoggingConfig::development("app.log"), LevelTable::standard());
/// let plan = factory.plan(Purpose::Logs).unwrap();
/// assert_eq!(plan.len(), 1);
/// assert_eq!(plan[0].kind, SinkKind::Local);
/// assert_eq!(plan[0].stream_id, "app.log");
/// ```
pub struct SinkFactory {
    config: LoggingConfig,
    levels: LevelTable,
    naming: Arc<dyn StreamNaming>,
    files: Mutex<HashMap<PathBuf, FileSink>>,
}

impl SinkFactory {
    /// Factory with [`PrefixNaming`]
    pub fn new(config: LoggingConfig, levels: LevelTable) -> Self {
        Self {
            config,
            levels,
            naming: Arc::new(PrefixNaming),
            files: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_naming(mut self, naming: impl StreamNaming + 'static) -> Self {
        self.naming = Arc::new(naming);
        self
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    /// Sink configs for `purpose`, every one of them validated
    ///
    /// # Errors
    ///
    /// The first missing required value, as an
    /// [`LoggerError::InvalidConfiguration`] naming the key.
    pub fn plan(&self, purpose: Purpose) -> Result<Vec<SinkConfig>> {
        let base = self
            .config
            .log_stream
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                LoggerError::config(
                    LOG_STREAM_NAME,
                    format!("required in profile '{}'", self.config.profile),
                )
            })?;

        if self.config.profile.is_development() {
            let local = SinkConfig {
                kind: SinkKind::Local,
                group_id: None,
                stream_id: base.to_string(),
                min_level: self.levels.most_permissive(),
                format: OutputFormat::Full,
                connection: None,
            };
            local.validate()?;
            return Ok(vec![local]);
        }

        let configs = match purpose {
            Purpose::Logs => LOG_TIERS
                .iter()
                .map(|&(tier, format)| -> Result<SinkConfig> {
                    Ok(self.remote(base, tier, self.levels.get(tier)?, format))
                })
                .collect::<Result<Vec<_>>>()?,
            Purpose::Exceptions => vec![self.remote(
                base,
                EXCEPTION_TIER,
                self.levels.most_permissive(),
                OutputFormat::Full,
            )],
            Purpose::Rejections => vec![self.remote(
                base,
                REJECTION_TIER,
                self.levels.most_permissive(),
                OutputFormat::Full,
            )],
        };

        for config in &configs {
            config.validate()?;
        }
        Ok(configs)
    }

    fn remote(&self, base: &str, tier: &str, min_level: Level, format: OutputFormat) -> SinkConfig {
        SinkConfig {
            kind: SinkKind::Remote,
            group_id: self.config.log_group.clone(),
            stream_id: self.naming.derive(base, tier),
            min_level,
            format,
            connection: Some(self.config.connection()),
        }
    }

    /// Materialize configs into sinks, in order
    ///
    /// Local sinks on the same path share one open file.
    pub fn build(
        &self,
        configs: &[SinkConfig],
        transports: &dyn TransportProvider,
    ) -> Result<Vec<Arc<dyn Sink>>> {
        configs
            .iter()
            .map(|config| self.build_one(config, transports))
            .collect()
    }

    fn build_one(
        &self,
        config: &SinkConfig,
        transports: &dyn TransportProvider,
    ) -> Result<Arc<dyn Sink>> {
        config.validate()?;

        match config.kind {
            SinkKind::Local => {
                let path = PathBuf::from(&config.stream_id);
                let mut files = self.files.lock();
                let sink = match files.get(&path) {
                    Some(open) => open.share(config.min_level, config.format),
                    None => {
                        let opened = FileSink::open(&path, config.min_level, config.format)?;
                        let sink = opened.share(config.min_level, config.format);
                        files.insert(path, opened);
                        sink
                    }
                };
                Ok(Arc::new(sink))
            }
            SinkKind::Remote => {
                let target = StreamTarget {
                    group: config.group_id.clone().unwrap_or_default(),
                    stream: config.stream_id.clone(),
                    connection: config.connection.clone().unwrap_or_default(),
                };
                let transport = transports.connect(&target)?;
                let sink = RemoteStreamSink::new(
                    target,
                    config.min_level,
                    config.format,
                    transport,
                    self.config.queue_capacity,
                )?;
                Ok(Arc::new(sink))
            }
        }
    }

    /// Plan, build and wrap in a [`Logger`]
    pub fn logger(&self, purpose: Purpose, transports: &dyn TransportProvider) -> Result<Logger> {
        let sinks = self.build(&self.plan(purpose)?, transports)?;
        Logger::builder()
            .levels(self.levels.clone())
            .sinks(sinks)
            .build()
    }
}
