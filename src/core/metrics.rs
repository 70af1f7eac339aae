//! Logger metrics for observability
//!
//! Counters for monitoring delivery health: successful deliveries, sink
//! failures, and records rejected for carrying an unregistered level.

use std::sync::atomic::{AtomicU64, Ordering};

/// Delivery counters shared by a logger and all of its children
///
/// # Example
///
/// ```
/// use rust_log_router::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_failed();
/// metrics.record_delivered();
///
/// assert_eq!(metrics.failed_count(), 1);
/// assert_eq!(metrics.delivered_count(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Sink deliveries that completed
    delivered: AtomicU64,

    /// Sink deliveries that returned an error or panicked
    failed: AtomicU64,

    /// Records dropped because their level is not in the table
    rejected: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn delivered_count(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected_count(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Record a successful sink delivery, returning the previous count
    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failed(&self) -> u64 {
        self.failed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rejected(&self) -> u64 {
        self.rejected.fetch_add(1, Ordering::Relaxed)
    }

    /// Get failure rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been delivered yet.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.failed_count() as f64;
        let total = self.delivered_count() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.delivered.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            delivered: AtomicU64::new(self.delivered_count()),
            failed: AtomicU64::new(self.failed_count()),
            rejected: AtomicU64::new(self.rejected_count()),
        }
    }
}
