//! Engine metrics collection

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Point-in-time copy of the engine counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub aggregations: u64,
    /// Windows that held fewer than the minimum data points
    pub quiet_windows: u64,
    pub signals: u64,
    pub errors: u64,
    pub uptime_secs: u64,
}

/// Thread-safe counters for the sentiment engine
#[derive(Debug)]
pub struct MetricsCollector {
    start_time: Instant,
    requests: AtomicU64,
    aggregations: AtomicU64,
    quiet_windows: AtomicU64,
    signals: AtomicU64,
    errors: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            requests: AtomicU64::new(0),
            aggregations: AtomicU64::new(0),
            quiet_windows: AtomicU64::new(0),
            signals: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    pub fn increment_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_aggregations(&self) {
        self.aggregations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_quiet_windows(&self) {
        self.quiet_windows.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_signals(&self) {
        self.signals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            aggregations: self.aggregations.load(Ordering::Relaxed),
            quiet_windows: self.quiet_windows.load(Ordering::Relaxed),
            signals: self.signals.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            uptime_secs: self.uptime().as_secs(),
        }
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
