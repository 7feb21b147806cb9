//! Pipeline counters.
//!
//! All updates are relaxed; readers get an eventually-consistent view.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct Metrics {
    dropped: AtomicU64,
    enqueued: AtomicU64,
    dequeued: AtomicU64,
    flushed: AtomicU64,
    queue_size: AtomicU64,
}

impl Metrics {
    #[inline]
    pub(crate) fn incr_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn incr_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn incr_dequeued(&self) {
        self.dequeued.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_dequeued(&self, n: u64) {
        self.dequeued.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn incr_flushed(&self) {
        self.flushed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn set_queue_size(&self, size: u64) {
        self.queue_size.store(size, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dropped: self.dropped.load(Ordering::Relaxed),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dequeued: self.dequeued.load(Ordering::Relaxed),
            flushed: self.flushed.load(Ordering::Relaxed),
            queue_size: self.queue_size.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the logger's counters, returned by
/// [`Logger::stats`](crate::Logger::stats).
///
/// The counters are monotonically non-decreasing; `queue_size` is a
/// sample of the async queue occupancy (0 outside async mode).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub dropped: u64,
    pub enqueued: u64,
    pub dequeued: u64,
    pub flushed: u64,
    pub queue_size: u64,
}
