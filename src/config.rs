//! Startup configuration
//!
//! Values come from an opaque key → string lookup ([`ConfigSource`]), read
//! exactly once when the logging system is assembled. Blank values count as
//! absent. Whether a missing value is fatal depends on the profile and is
//! decided by the sink factory, which knows which sinks need it.

use crate::core::{LoggerError, Result};
use crate::sinks::DEFAULT_QUEUE_CAPACITY;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};

pub const APP_ENV: &str = "APP_ENV";
pub const LOG_GROUP_NAME: &str = "LOG_GROUP_NAME";
pub const LOG_STREAM_NAME: &str = "LOG_STREAM_NAME";
pub const AWS_REGION: &str = "AWS_REGION";
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const LOG_COLLECTOR_ADDR: &str = "LOG_COLLECTOR_ADDR";
pub const LOG_QUEUE_CAPACITY: &str = "LOG_QUEUE_CAPACITY";

pub const DEFAULT_COLLECTOR_ADDR: &str = "127.0.0.1:5170";

/// Key → string lookup
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl<K, V, S> ConfigSource for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
    S: BuildHasher,
{
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).map(|v| v.as_ref().to_string())
    }
}

/// Runtime profile; anything but `development` routes to remote streams
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Profile {
    Development,
    Other(String),
}

impl Profile {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) if v.eq_ignore_ascii_case("development") => Profile::Development,
            Some(v) => Profile::Other(v.to_string()),
            None => Profile::Other("production".to_string()),
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Profile::Development)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Development => f.write_str("development"),
            Profile::Other(name) => f.write_str(name),
        }
    }
}

/// Access key pair for the remote log service
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Opaque connection parameters of a remote sink
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteConnection {
    pub region: String,
    pub credentials: Credentials,
}

/// Everything the sink factory needs, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub profile: Profile,
    pub log_group: Option<String>,
    pub log_stream: Option<String>,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub collector_addr: String,
    pub queue_capacity: usize,
}

impl LoggingConfig {
    /// Read every key from `source`
    ///
    /// # Errors
    ///
    /// Only a malformed `LOG_QUEUE_CAPACITY` fails here; missing values are
    /// reported by the sink factory, which knows whether the profile needs
    /// them.
    pub fn load(source: &impl ConfigSource) -> Result<Self> {
        let read = |key: &str| {
            source
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let queue_capacity = match read(LOG_QUEUE_CAPACITY) {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(LoggerError::config(
                        LOG_QUEUE_CAPACITY,
                        format!("expected a positive integer, got '{}'", raw),
                    ))
                }
            },
            None => DEFAULT_QUEUE_CAPACITY,
        };

        Ok(Self {
            profile: Profile::parse(read(APP_ENV).as_deref()),
            log_group: read(LOG_GROUP_NAME),
            log_stream: read(LOG_STREAM_NAME),
            region: read(AWS_REGION),
            access_key_id: read(AWS_ACCESS_KEY_ID),
            secret_access_key: read(AWS_SECRET_ACCESS_KEY),
            collector_addr: read(LOG_COLLECTOR_ADDR)
                .unwrap_or_else(|| DEFAULT_COLLECTOR_ADDR.to_string()),
            queue_capacity,
        })
    }

    /// Read from the process environment
    pub fn from_env() -> Result<Self> {
        Self::load(&EnvSource)
    }

    /// Development profile writing to `log_file`
    pub fn development(log_file: impl Into<String>) -> Self {
        Self {
            profile: Profile::Development,
            log_group: None,
            log_stream: Some(log_file.into()),
            region: None,
            access_key_id: None,
            secret_access_key: None,
            collector_addr: DEFAULT_COLLECTOR_ADDR.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Connection parameters as configured; blanks stay empty for validation
    pub fn connection(&self) -> RemoteConnection {
        RemoteConnection {
            region: self.region.clone().unwrap_or_default(),
            credentials: Credentials::new(
                self.access_key_id.clone().unwrap_or_default(),
                self.secret_access_key.clone().unwrap_or_default(),
            ),
        }
    }
}
