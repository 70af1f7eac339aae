//! Remote stream sink
//!
//! Formats records on the caller's thread and hands the payload to a
//! dedicated worker that owns the transport. Delivery is best-effort: the
//! caller never waits on the network, a full queue drops the payload, and
//! transport failures are reported on stderr and counted, never returned to
//! the logger.

use super::transport::{RemoteTransport, StreamTarget};
use crate::core::{Level, LogRecord, LoggerError, OutputFormat, Result, Sink, DEFAULT_SHUTDOWN_TIMEOUT};
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default number of payloads a remote sink buffers before dropping
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

enum Command {
    Payload(String),
    Flush(Sender<()>),
}

/// Counters shared between a sink and its worker
#[derive(Debug, Default)]
struct DeliveryStats {
    sent: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

pub struct RemoteStreamSink {
    name: String,
    target: StreamTarget,
    min_level: Level,
    format: OutputFormat,
    capacity: usize,
    sender: Option<Sender<Command>>,
    worker: Option<thread::JoinHandle<()>>,
    stats: Arc<DeliveryStats>,
}

impl RemoteStreamSink {
    /// Start the sink's worker thread
    ///
    /// # Errors
    ///
    /// Fails when the worker thread cannot be spawned or `capacity` is zero.
    pub fn new(
        target: StreamTarget,
        min_level: Level,
        format: OutputFormat,
        transport: Box<dyn RemoteTransport>,
        capacity: usize,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(LoggerError::config(
                "RemoteStreamSink",
                "queue capacity must be greater than zero",
            ));
        }

        let name = format!("remote:{}/{}", target.group, target.stream);
        let (sender, receiver) = bounded(capacity);
        let stats = Arc::new(DeliveryStats::default());

        let worker_stats = Arc::clone(&stats);
        let worker_target = target.clone();
        let worker = thread::Builder::new()
            .name(format!("log-{}", target.stream))
            .spawn(move || Self::run_worker(receiver, transport, worker_target, worker_stats))
            .map_err(|e| LoggerError::io_operation("spawning remote sink worker", name.clone(), e))?;

        Ok(Self {
            name,
            target,
            min_level,
            format,
            capacity,
            sender: Some(sender),
            worker: Some(worker),
            stats,
        })
    }

    fn run_worker(
        receiver: Receiver<Command>,
        mut transport: Box<dyn RemoteTransport>,
        target: StreamTarget,
        stats: Arc<DeliveryStats>,
    ) {
        // Ends when every sender is dropped and the queue is drained
        for command in receiver {
            match command {
                Command::Payload(payload) => match transport.put(&target, &payload) {
                    Ok(()) => {
                        stats.sent.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        let failed = stats.failed.fetch_add(1, Ordering::Relaxed);
                        if failed == 0 || (failed + 1) % 100 == 0 {
                            eprintln!(
                                "[LOGGER ERROR] Remote stream '{}' delivery failed ({} so far): {}",
                                target.stream,
                                failed + 1,
                                e
                            );
                        }
                    }
                },
                Command::Flush(ack) => {
                    if let Err(e) = transport.flush() {
                        eprintln!(
                            "[LOGGER ERROR] Remote stream '{}' flush failed: {}",
                            target.stream, e
                        );
                    }
                    let _ = ack.send(());
                }
            }
        }
        let _ = transport.flush();
    }

    pub fn target(&self) -> &StreamTarget {
        &self.target
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Payloads the transport accepted
    pub fn sent_count(&self) -> u64 {
        self.stats.sent.load(Ordering::Relaxed)
    }

    /// Payloads the transport rejected
    pub fn failed_count(&self) -> u64 {
        self.stats.failed.load(Ordering::Relaxed)
    }

    /// Payloads dropped because the queue was full
    pub fn dropped_count(&self) -> u64 {
        self.stats.dropped.load(Ordering::Relaxed)
    }

    /// Close the queue and wait up to `timeout` for the worker to drain it
    ///
    /// Returns `true` when the worker finished in time.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        drop(self.sender.take());

        let Some(handle) = self.worker.take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!(
                        "[LOGGER ERROR] Remote sink worker for '{}' panicked: {:?}",
                        self.target.stream, e
                    );
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Remote sink worker for '{}' did not finish within {:?}. \
                     Some logs may be lost.",
                    self.target.stream, timeout
                );
                return false;
            }

            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Sink for RemoteStreamSink {
    fn write(&self, record: &LogRecord) -> Result<()> {
        let sender = self.sender.as_ref().ok_or(LoggerError::SinkClosed)?;
        let payload = self.format.format(record);

        match sender.try_send(Command::Payload(payload)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                let dropped = self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                // Alert on first drop and periodically thereafter
                if dropped == 0 || (dropped + 1) % 1000 == 0 {
                    eprintln!(
                        "[LOGGER WARNING] Remote stream '{}' queue full, {} payloads dropped.",
                        self.target.stream,
                        dropped + 1
                    );
                }
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(LoggerError::SinkClosed),
        }
    }

    /// Wait until everything queued before this call has reached the transport
    fn flush(&self) -> Result<()> {
        let sender = self.sender.as_ref().ok_or(LoggerError::SinkClosed)?;
        let (ack_tx, ack_rx) = bounded(1);
        sender
            .send_timeout(Command::Flush(ack_tx), DEFAULT_SHUTDOWN_TIMEOUT)
            .map_err(|e| match e {
                SendTimeoutError::Timeout(_) => LoggerError::queue_full(self.capacity),
                SendTimeoutError::Disconnected(_) => LoggerError::SinkClosed,
            })?;
        ack_rx
            .recv_timeout(DEFAULT_SHUTDOWN_TIMEOUT)
            .map_err(|_| LoggerError::transport(self.target.stream.clone(), "flush timed out"))
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn format(&self) -> OutputFormat {
        self.format
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for RemoteStreamSink {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}
