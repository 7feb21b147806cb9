//! Bounded, lock-free queueing for the async engine.
//!
//! [`MpscRing`] is a fixed-capacity multi-producer single-consumer ring
//! with per-cell sequence counters; [`DualQueue`] pairs a high- and a
//! low-priority ring behind one wait structure so warn+ records keep
//! reserved capacity under low-priority bursts.

mod dual;
mod ring;

pub(crate) use dual::DualQueue;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Wait/wake state shared by both rings and their producers/consumer.
///
/// Producers wake the consumer through a binary semaphore, but only when
/// the `sleeping` hint says the consumer is actually parked; in steady
/// state no wake traffic happens. The not-full side is a plain condvar
/// that blocked producers poll with short timeouts.
pub(crate) struct QueueWait {
    stop: AtomicBool,
    sleeping: AtomicBool,
    not_empty: Semaphore,
    not_full_lock: Mutex<()>,
    not_full: Condvar,
}

impl QueueWait {
    pub(crate) fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            sleeping: AtomicBool::new(false),
            not_empty: Semaphore::new(),
            not_full_lock: Mutex::new(()),
            not_full: Condvar::new(),
        }
    }

    #[inline]
    pub(crate) fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Called by producers after a successful push. Releases the
    /// semaphore at most once per consumer sleep.
    #[inline]
    pub(crate) fn wake_consumer(&self) {
        if self.sleeping.swap(false, Ordering::Relaxed) {
            self.not_empty.release();
        }
    }

    /// Parks the consumer for up to `timeout` waiting for data.
    pub(crate) fn consumer_sleep(&self, timeout: Duration) {
        self.sleeping.store(true, Ordering::Relaxed);
        if self.stopped() {
            self.sleeping.store(false, Ordering::Relaxed);
            return;
        }
        self.not_empty.acquire_timeout(timeout);
        self.sleeping.store(false, Ordering::Relaxed);
    }

    /// Parks a producer for up to `timeout` waiting for a free slot.
    pub(crate) fn producer_wait_not_full(&self, timeout: Duration) {
        let mut guard = self.not_full_lock.lock();
        if self.stopped() {
            return;
        }
        let _ = self.not_full.wait_for(&mut guard, timeout);
    }

    /// Called by the consumer after a successful pop batch.
    pub(crate) fn notify_not_full(&self) {
        self.not_full.notify_all();
    }

    /// Signals shutdown and wakes both sides.
    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
        self.not_empty.release();
        let _guard = self.not_full_lock.lock();
        self.not_full.notify_all();
    }
}

/// Binary semaphore: `release` makes at most one permit available,
/// regardless of how many times it is called before the next acquire.
struct Semaphore {
    permit: Mutex<bool>,
    available: Condvar,
}

impl Semaphore {
    fn new() -> Self {
        Self {
            permit: Mutex::new(false),
            available: Condvar::new(),
        }
    }

    fn release(&self) {
        let mut permit = self.permit.lock();
        *permit = true;
        self.available.notify_one();
    }

    /// Takes the permit if one becomes available within `timeout`.
    /// Returns whether the permit was taken.
    fn acquire_timeout(&self, timeout: Duration) -> bool {
        let mut permit = self.permit.lock();
        if !*permit {
            let _ = self.available.wait_for(&mut permit, timeout);
        }
        std::mem::replace(&mut *permit, false)
    }
}
