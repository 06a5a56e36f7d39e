//! Delivery metrics for the device session.
//!
//! Counters are updated by the session task and by submitters, and read by
//! whoever holds a [`SessionHandle`](crate::SessionHandle). Everything is
//! atomic so reading a snapshot never waits on the delivery loop.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Point-in-time copy of [`SessionMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetricsSnapshot {
    /// Commands accepted into the queue.
    pub submitted: u64,
    /// Commands refused because the queue was full.
    pub rejected: u64,
    /// Commands written to the device.
    pub delivered: u64,
    /// Commands whose write failed.
    pub failed: u64,
    /// Commands dropped because the device was not connected.
    pub dropped_not_connected: u64,
    /// Commands still queued or in flight when shutdown gave up draining.
    pub abandoned: u64,
    /// Latency of the most recent successful write.
    pub last_write_ms: Option<u64>,
    /// Text of the most recent BLE error.
    pub last_error: Option<String>,
}

impl SessionMetricsSnapshot {
    /// Commands accepted but not yet accounted for by any outcome.
    pub fn pending(&self) -> u64 {
        self.submitted.saturating_sub(
            self.delivered + self.failed + self.dropped_not_connected + self.abandoned,
        )
    }
}

/// Thread-safe session counters.
#[derive(Debug)]
pub struct SessionMetrics {
    submitted: AtomicU64,
    rejected: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped_not_connected: AtomicU64,
    abandoned: AtomicU64,
    /// `u64::MAX` until the first successful write.
    last_write_ms: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMetrics {
    /// Create new empty metrics.
    pub fn new() -> Self {
        Self {
            submitted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            dropped_not_connected: AtomicU64::new(0),
            abandoned: AtomicU64::new(0),
            last_write_ms: AtomicU64::new(u64::MAX),
            last_error: Mutex::new(None),
        }
    }

    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self, latency: Duration) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        self.last_write_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self, error: &crate::Error) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.record_error(error);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped_not_connected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_abandoned(&self, count: u64) {
        self.abandoned.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self, error: &crate::Error) {
        let mut last = self.last_error.lock().unwrap_or_else(|e| e.into_inner());
        *last = Some(error.to_string());
    }

    /// Get a snapshot of the current metrics.
    pub fn snapshot(&self) -> SessionMetricsSnapshot {
        let last_write = self.last_write_ms.load(Ordering::Relaxed);
        let last_error = self
            .last_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        SessionMetricsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped_not_connected: self.dropped_not_connected.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            last_write_ms: (last_write != u64::MAX).then_some(last_write),
            last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_empty_snapshot() {
        let metrics = SessionMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot, SessionMetricsSnapshot::default());
        assert_eq!(snapshot.pending(), 0);
    }

    #[test]
    fn test_record_outcomes() {
        let metrics = SessionMetrics::new();
        for _ in 0..5 {
            metrics.record_submitted();
        }
        metrics.record_rejected();
        metrics.record_delivered(Duration::from_millis(42));
        metrics.record_failed(&Error::NotConnected);
        metrics.record_dropped();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.submitted, 5);
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(snapshot.delivered, 1);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.dropped_not_connected, 1);
        assert_eq!(snapshot.last_write_ms, Some(42));
        assert_eq!(snapshot.last_error.as_deref(), Some("Not connected to device"));
        assert_eq!(snapshot.pending(), 2);
    }

    #[test]
    fn test_abandoned_counts_toward_outcomes() {
        let metrics = SessionMetrics::new();
        metrics.record_submitted();
        metrics.record_submitted();
        metrics.record_abandoned(2);
        assert_eq!(metrics.snapshot().pending(), 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = SessionMetrics::new();
        metrics.record_submitted();
        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["submitted"], 1);
        assert!(json["last_write_ms"].is_null());
    }
}
