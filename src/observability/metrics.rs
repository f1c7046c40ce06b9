//! Daemon counters and the sink the request loop records into.
//!
//! # Metrics
//! - `price_requester_requests_handling_count` (gauge): submissions in flight
//! - `price_requester_requests_pending_count` (gauge): built requests not yet committed
//! - `price_requester_requests_error_total` (counter): failed submissions
//! - `price_requester_requests_submitted_total` (counter): committed requests
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Each counter is an independent scalar; snapshots may be torn across counters
//! - The loop only sees [`MetricsSink`], so the exporter can change freely

use std::sync::atomic::{AtomicI64, Ordering};

pub const HANDLING_GAUGE: &str = "price_requester_requests_handling_count";
pub const PENDING_GAUGE: &str = "price_requester_requests_pending_count";
pub const ERROR_COUNTER: &str = "price_requester_requests_error_total";
pub const SUBMITTED_COUNTER: &str = "price_requester_requests_submitted_total";

/// Events the request loop reports.
pub trait MetricsSink: Send + Sync {
    fn set_handling(&self, value: i64);
    fn set_pending(&self, value: i64);
    fn record_error(&self);
    fn record_submitted(&self);
}

/// Sink used when metrics are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn set_handling(&self, _value: i64) {}
    fn set_pending(&self, _value: i64) {}
    fn record_error(&self) {}
    fn record_submitted(&self) {}
}

/// Atomic counters shared between the loop and the exporter.
#[derive(Debug, Default)]
pub struct DaemonCounters {
    handling: AtomicI64,
    pending: AtomicI64,
    error_count: AtomicI64,
    submitted_count: AtomicI64,
}

/// Point-in-time copy of [`DaemonCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub handling: i64,
    pub pending: i64,
    pub error_count: i64,
    pub submitted_count: i64,
}

impl DaemonCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            handling: self.handling.load(Ordering::Relaxed),
            pending: self.pending.load(Ordering::Relaxed),
            error_count: self.error_count.load(Ordering::Relaxed),
            submitted_count: self.submitted_count.load(Ordering::Relaxed),
        }
    }
}

impl MetricsSink for DaemonCounters {
    fn set_handling(&self, value: i64) {
        self.handling.store(value, Ordering::Relaxed);
    }

    fn set_pending(&self, value: i64) {
        self.pending.store(value, Ordering::Relaxed);
    }

    fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    fn record_submitted(&self) {
        self.submitted_count.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counters_record() {
        let counters = DaemonCounters::new();
        counters.record_error();
        counters.record_error();
        counters.record_submitted();
        counters.set_handling(1);
        counters.set_pending(1);
        counters.set_handling(0);

        assert_eq!(
            counters.snapshot(),
            CounterSnapshot {
                handling: 0,
                pending: 1,
                error_count: 2,
                submitted_count: 1,
            }
        );
    }

    #[test]
    fn test_concurrent_reads_are_monotonic() {
        let counters = Arc::new(DaemonCounters::new());
        let writer = {
            let counters = counters.clone();
            thread::spawn(move || {
                for _ in 0..10_000 {
                    counters.record_error();
                    counters.record_submitted();
                }
            })
        };

        let mut last = CounterSnapshot::default();
        while !writer.is_finished() {
            let snap = counters.snapshot();
            // Each counter only ever grows, so a torn read would show up as a step back.
            assert!(snap.error_count >= last.error_count);
            assert!(snap.submitted_count >= last.submitted_count);
            assert!(snap.error_count <= 10_000);
            last = snap;
        }
        writer.join().unwrap();

        let done = counters.snapshot();
        assert_eq!(done.error_count, 10_000);
        assert_eq!(done.submitted_count, 10_000);
    }
}
