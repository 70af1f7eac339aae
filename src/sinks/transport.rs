//! Remote transports for stream sinks
//!
//! A transport is the seam to whatever ships payloads to the log-aggregation
//! service. The crate ships a TCP forwarder that hands newline-delimited JSON
//! envelopes to a collector agent running next to the service; SDK-backed
//! transports plug in through [`RemoteTransport`] and [`TransportProvider`].

use crate::config::RemoteConnection;
use crate::core::{LoggerError, Result};
use serde::Serialize;
use std::io::Write;
use std::net::TcpStream;
use std::time::Duration;

/// Where a remote sink's payloads go: a log group, a stream inside it, and
/// the connection parameters to reach them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamTarget {
    pub group: String,
    pub stream: String,
    pub connection: RemoteConnection,
}

/// Ships one formatted payload to a stream
///
/// Called from a single worker thread per sink, in record order.
pub trait RemoteTransport: Send {
    fn put(&mut self, target: &StreamTarget, payload: &str) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Creates a transport for each remote sink the factory builds
pub trait TransportProvider: Send + Sync {
    fn connect(&self, target: &StreamTarget) -> Result<Box<dyn RemoteTransport>>;
}

impl<F> TransportProvider for F
where
    F: Fn(&StreamTarget) -> Result<Box<dyn RemoteTransport>> + Send + Sync,
{
    fn connect(&self, target: &StreamTarget) -> Result<Box<dyn RemoteTransport>> {
        self(target)
    }
}

const IO_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    log_group_name: &'a str,
    log_stream_name: &'a str,
    region: &'a str,
    message: &'a str,
}

/// Forwards envelopes to a collector agent over TCP
///
/// Connects lazily on the first payload so that startup never depends on the
/// collector being up. Credentials stay in-process; the collector
/// authenticates with the aggregation service on its own.
///
/// # Example
///
/// ```no_run
/// use rust_log_router::sinks::TcpTransport;
///
/// let transport = TcpTransport::new("127.0.0.1:5170").with_reconnect(false);
/// ```
pub struct TcpTransport {
    stream: Option<TcpStream>,
    address: String,
    reconnect_on_error: bool,
}

impl TcpTransport {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            stream: None,
            address: address.into(),
            reconnect_on_error: true,
        }
    }

    /// Enable or disable one reconnect-and-resend attempt on write errors
    ///
    /// Default: enabled
    #[must_use]
    pub fn with_reconnect(mut self, enable: bool) -> Self {
        self.reconnect_on_error = enable;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn connect(&mut self) -> Result<&mut TcpStream> {
        if self.stream.is_none() {
            let stream = TcpStream::connect(&self.address).map_err(|e| {
                LoggerError::io_operation(
                    "connecting to log collector",
                    format!("cannot reach '{}'", self.address),
                    e,
                )
            })?;
            stream.set_write_timeout(Some(IO_TIMEOUT))?;
            stream.set_read_timeout(Some(IO_TIMEOUT))?;
            stream.set_nodelay(true)?;
            self.stream = Some(stream);
        }
        self.stream
            .as_mut()
            .ok_or_else(|| LoggerError::other("collector stream missing after connect"))
    }

    fn send(&mut self, line: &[u8]) -> Result<()> {
        let stream = self.connect()?;
        if let Err(e) = stream.write_all(line) {
            self.stream = None;
            return Err(e.into());
        }
        Ok(())
    }
}

impl RemoteTransport for TcpTransport {
    fn put(&mut self, target: &StreamTarget, payload: &str) -> Result<()> {
        let envelope = Envelope {
            log_group_name: &target.group,
            log_stream_name: &target.stream,
            region: &target.connection.region,
            message: payload,
        };
        let mut line = serde_json::to_vec(&envelope)?;
        line.push(b'\n');

        match self.send(&line) {
            Ok(()) => Ok(()),
            Err(first) if self.reconnect_on_error => self.send(&line).map_err(|retry| {
                LoggerError::transport(
                    target.stream.clone(),
                    format!("{} (reconnect: {})", first, retry),
                )
            }),
            Err(e) => Err(LoggerError::transport(target.stream.clone(), e.to_string())),
        }
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut stream) = self.stream {
            stream.flush()?;
        }
        Ok(())
    }
}

/// Builds one [`TcpTransport`] per remote sink, all pointing at one collector
#[derive(Debug, Clone)]
pub struct TcpTransportProvider {
    address: String,
}

impl TcpTransportProvider {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

impl TransportProvider for TcpTransportProvider {
    fn connect(&self, _target: &StreamTarget) -> Result<Box<dyn RemoteTransport>> {
        Ok(Box::new(TcpTransport::new(self.address.clone())))
    }
}
