//! Two-tier priority queue: a high-priority ring with reserved capacity
//! next to a larger low-priority ring, sharing one wait structure.

use std::sync::Arc;
use std::time::Duration;

use crate::level::HIGH_PRIORITY_WEIGHT;

use super::ring::MpscRing;
use super::QueueWait;

pub(crate) struct DualQueue<T> {
    wait: Arc<QueueWait>,
    high: MpscRing<T>,
    low: MpscRing<T>,
}

impl<T> DualQueue<T> {
    /// Splits `total_capacity` between the rings: the high ring gets
    /// `max(1, total/4)`, the low ring the remainder (at least 1). Each
    /// ring independently rounds its share up to a power of two, so
    /// low-priority floods can never occupy the high ring's slots.
    pub(crate) fn new(total_capacity: usize) -> Self {
        let wait = Arc::new(QueueWait::new());
        let high_capacity = (total_capacity / 4).max(1);
        let low_capacity = total_capacity.saturating_sub(high_capacity).max(1);
        Self {
            high: MpscRing::new(high_capacity, Arc::clone(&wait)),
            low: MpscRing::new(low_capacity, Arc::clone(&wait)),
            wait,
        }
    }

    #[inline]
    fn ring(&self, weight: u8) -> &MpscRing<T> {
        if weight >= HIGH_PRIORITY_WEIGHT {
            &self.high
        } else {
            &self.low
        }
    }

    pub(crate) fn try_push(&self, value: T, weight: u8) -> Result<(), T> {
        self.ring(weight).try_push(value)
    }

    pub(crate) fn push_blocking(&self, value: T, weight: u8) -> Result<(), T> {
        self.ring(weight).push_blocking(value)
    }

    /// Dequeues up to `max` values, draining the high ring before
    /// touching the low ring. Single consumer only.
    pub(crate) fn pop_batch(&self, out: &mut Vec<T>, max: usize) -> usize {
        let mut n = self.high.pop_batch(out, max);
        if n < max {
            n += self.low.pop_batch(out, max - n);
        }
        n
    }

    /// Parks the consumer until data arrives, stop is signaled, or
    /// `timeout` elapses. Returns immediately if data is already queued.
    pub(crate) fn wait_for_data(&self, timeout: Duration) {
        if self.len() > 0 {
            return;
        }
        self.wait.consumer_sleep(timeout);
    }

    pub(crate) fn signal_stop(&self) {
        self.wait.request_stop();
    }

    /// Approximate total occupancy across both rings.
    pub(crate) fn len(&self) -> usize {
        self.high.len() + self.low.len()
    }

    #[cfg(test)]
    pub(crate) fn high_capacity(&self) -> usize {
        self.high.capacity()
    }

    #[cfg(test)]
    pub(crate) fn low_capacity(&self) -> usize {
        self.low.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOW: u8 = 1;
    const HIGH: u8 = 4;

    #[test]
    fn capacity_split_reserves_a_quarter_for_high() {
        let q: DualQueue<u32> = DualQueue::new(16);
        assert_eq!(q.high_capacity(), 4);
        assert_eq!(q.low_capacity(), 16); // 12 rounded up

        let q: DualQueue<u32> = DualQueue::new(64);
        assert_eq!(q.high_capacity(), 16);
        assert_eq!(q.low_capacity(), 64); // 48 rounded up

        // Degenerate capacities still give both rings a slot.
        let q: DualQueue<u32> = DualQueue::new(1);
        assert_eq!(q.high_capacity(), 1);
        assert_eq!(q.low_capacity(), 1);
    }

    #[test]
    fn batches_drain_high_before_low() {
        let q: DualQueue<u32> = DualQueue::new(16);
        q.try_push(10, LOW).expect("push");
        q.try_push(11, LOW).expect("push");
        q.try_push(90, HIGH).expect("push");
        q.try_push(91, HIGH).expect("push");
        q.try_push(12, LOW).expect("push");

        let mut out = Vec::new();
        assert_eq!(q.pop_batch(&mut out, 16), 5);
        assert_eq!(out, vec![90, 91, 10, 11, 12]);
    }

    #[test]
    fn saturated_low_ring_cannot_evict_high_records() {
        let q: DualQueue<u32> = DualQueue::new(16);
        let mut accepted = 0;
        while q.try_push(accepted, LOW).is_ok() {
            accepted += 1;
        }
        assert_eq!(accepted, q.low_capacity() as u32);

        // The high ring still has its full reserved capacity.
        for i in 0..q.high_capacity() as u32 {
            assert!(q.try_push(1000 + i, HIGH).is_ok());
        }
        assert!(q.try_push(9999, HIGH).is_err());
    }

    #[test]
    fn wait_for_data_returns_immediately_when_nonempty() {
        let q: DualQueue<u32> = DualQueue::new(4);
        q.try_push(1, LOW).expect("push");
        let start = std::time::Instant::now();
        q.wait_for_data(Duration::from_secs(1));
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
