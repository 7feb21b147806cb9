//! Bounded MPSC ring with per-cell sequence counters.
//!
//! Each cell carries an atomic sequence number; cell `i` starts at `i`.
//! A producer claims the slot at `tail` by CAS when the cell's sequence
//! equals `tail`, writes the value, then republishes the cell at
//! `tail + 1`. The consumer mirrors this on `head` and recycles the cell
//! at `head + capacity`. Cells are allocated once up front, so there is
//! no memory reclamation and the producer fast path never touches
//! `head`.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_utils::CachePadded;

use crate::utils::{likely, unlikely};

use super::QueueWait;

const BLOCKING_PUSH_WAIT: Duration = Duration::from_millis(1);

struct Cell<T> {
    seq: AtomicUsize,
    value: UnsafeCell<MaybeUninit<T>>,
}

pub(crate) struct MpscRing<T> {
    buffer: Box<[Cell<T>]>,
    mask: usize,
    head: CachePadded<AtomicUsize>,
    tail: CachePadded<AtomicUsize>,
    wait: Arc<QueueWait>,
}

// SAFETY: cells are handed off between threads through the seq protocol:
// a value is only read after the release-store that published it, and
// each slot has exactly one writer and one reader per lap.
unsafe impl<T: Send> Send for MpscRing<T> {}
unsafe impl<T: Send> Sync for MpscRing<T> {}

impl<T> MpscRing<T> {
    /// Creates a ring with capacity rounded up to a power of two (at
    /// least 1).
    pub(crate) fn new(capacity: usize, wait: Arc<QueueWait>) -> Self {
        let capacity = capacity.max(1).next_power_of_two();
        let buffer = (0..capacity)
            .map(|i| Cell {
                seq: AtomicUsize::new(i),
                value: UnsafeCell::new(MaybeUninit::uninit()),
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            buffer,
            mask: capacity - 1,
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            wait,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Approximate occupancy; may transiently include slots that are
    /// claimed but not yet published.
    pub(crate) fn len(&self) -> usize {
        self.tail
            .load(Ordering::Relaxed)
            .wrapping_sub(self.head.load(Ordering::Relaxed))
    }

    /// Attempts to enqueue without blocking. Fails (returning the value)
    /// when the ring is full or stop has been signaled.
    pub(crate) fn try_push(&self, value: T) -> Result<(), T> {
        if unlikely(self.wait.stopped()) {
            return Err(value);
        }

        let mut pos = self.tail.load(Ordering::Relaxed);
        let cell = loop {
            let cell = &self.buffer[pos & self.mask];
            let seq = cell.seq.load(Ordering::Acquire);
            let diff = (seq as isize).wrapping_sub(pos as isize);

            if likely(diff == 0) {
                match self.tail.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => break cell,
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                return Err(value);
            } else {
                pos = self.tail.load(Ordering::Relaxed);
            }
        };

        // SAFETY: the CAS above made this thread the unique writer of
        // the slot for this lap; the release-store below publishes it.
        unsafe { (*cell.value.get()).write(value) };
        cell.seq.store(pos.wrapping_add(1), Ordering::Release);

        self.wait.wake_consumer();
        Ok(())
    }

    /// Enqueues, waiting for a free slot if necessary. Gives up and
    /// returns the value once stop is signaled.
    pub(crate) fn push_blocking(&self, value: T) -> Result<(), T> {
        let mut value = value;
        loop {
            if self.wait.stopped() {
                return Err(value);
            }
            match self.try_push(value) {
                Ok(()) => return Ok(()),
                Err(rejected) => value = rejected,
            }
            self.wait.producer_wait_not_full(BLOCKING_PUSH_WAIT);
        }
    }

    /// Dequeues one value. Must only be called from the single consumer.
    pub(crate) fn try_pop(&self) -> Option<T> {
        let mut pos = self.head.load(Ordering::Relaxed);
        let cell = loop {
            let cell = &self.buffer[pos & self.mask];
            let seq = cell.seq.load(Ordering::Acquire);
            let diff = (seq as isize).wrapping_sub(pos.wrapping_add(1) as isize);

            if likely(diff == 0) {
                match self.head.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => break cell,
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                return None;
            } else {
                pos = self.head.load(Ordering::Relaxed);
            }
        };

        // SAFETY: the producer's release-store at `pos + 1` published
        // this slot, and the head CAS made this thread its unique reader
        // for this lap.
        let value = unsafe { (*cell.value.get()).assume_init_read() };
        cell.seq
            .store(pos.wrapping_add(self.capacity()), Ordering::Release);
        Some(value)
    }

    /// Dequeues up to `max` values into `out`, then signals not-full if
    /// anything was freed. Single consumer only.
    pub(crate) fn pop_batch(&self, out: &mut Vec<T>, max: usize) -> usize {
        let mut n = 0;
        while n < max {
            match self.try_pop() {
                Some(value) => {
                    out.push(value);
                    n += 1;
                }
                None => break,
            }
        }
        if n > 0 {
            self.wait.notify_not_full();
        }
        n
    }
}

impl<T> Drop for MpscRing<T> {
    fn drop(&mut self) {
        while self.try_pop().is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    fn ring(capacity: usize) -> MpscRing<u64> {
        MpscRing::new(capacity, Arc::new(QueueWait::new()))
    }

    #[test]
    fn capacity_rounds_up_to_power_of_two() {
        assert_eq!(ring(0).capacity(), 1);
        assert_eq!(ring(1).capacity(), 1);
        assert_eq!(ring(12).capacity(), 16);
        assert_eq!(ring(16).capacity(), 16);
        assert_eq!(ring(17).capacity(), 32);
    }

    #[test]
    fn fill_and_drain() {
        let ring = ring(8);
        for i in 0..8 {
            assert!(ring.try_push(i).is_ok());
        }
        assert_eq!(ring.len(), 8);
        // Full: the value comes back.
        assert_eq!(ring.try_push(99), Err(99));

        for i in 0..8 {
            assert_eq!(ring.try_pop(), Some(i));
        }
        assert_eq!(ring.try_pop(), None);
        assert_eq!(ring.len(), 0);
    }

    #[test]
    fn cells_recycle_across_many_laps() {
        let ring = ring(4);
        for lap in 0..256u64 {
            for i in 0..4 {
                assert!(ring.try_push(lap * 4 + i).is_ok());
            }
            assert!(ring.try_push(0).is_err());
            for i in 0..4 {
                assert_eq!(ring.try_pop(), Some(lap * 4 + i));
            }
            assert_eq!(ring.try_pop(), None);
        }
    }

    #[test]
    fn pop_batch_respects_max() {
        let ring = ring(8);
        for i in 0..6 {
            ring.try_push(i).expect("push");
        }
        let mut out = Vec::new();
        assert_eq!(ring.pop_batch(&mut out, 4), 4);
        assert_eq!(out, vec![0, 1, 2, 3]);
        assert_eq!(ring.pop_batch(&mut out, 4), 2);
        assert_eq!(out, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(ring.pop_batch(&mut out, 4), 0);
    }

    #[test]
    fn rejects_pushes_after_stop() {
        let wait = Arc::new(QueueWait::new());
        let ring: MpscRing<u64> = MpscRing::new(4, Arc::clone(&wait));
        assert!(ring.try_push(1).is_ok());
        wait.request_stop();
        assert_eq!(ring.try_push(2), Err(2));
        assert_eq!(ring.push_blocking(3), Err(3));
        // Already-queued values remain poppable for draining.
        assert_eq!(ring.try_pop(), Some(1));
    }

    #[test]
    fn multi_producer_values_all_arrive() {
        const PRODUCERS: u64 = 4;
        const PER_PRODUCER: u64 = 10_000;

        let wait = Arc::new(QueueWait::new());
        let ring: Arc<MpscRing<u64>> = Arc::new(MpscRing::new(64, Arc::clone(&wait)));
        let popped = Arc::new(AtomicUsize::new(0));

        let consumer = {
            let ring = Arc::clone(&ring);
            let popped = Arc::clone(&popped);
            thread::spawn(move || {
                let mut seen = vec![0u64; PRODUCERS as usize];
                let mut total = 0u64;
                let mut sum = 0u64;
                while total < PRODUCERS * PER_PRODUCER {
                    match ring.try_pop() {
                        Some(value) => {
                            let producer = (value >> 32) as usize;
                            let i = value & 0xffff_ffff;
                            // Per-producer FIFO: each producer's values
                            // arrive in push order.
                            assert_eq!(i, seen[producer]);
                            seen[producer] += 1;
                            sum += i;
                            total += 1;
                            popped.fetch_add(1, Ordering::Relaxed);
                        }
                        None => thread::yield_now(),
                    }
                }
                sum
            })
        };

        let producers: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let ring = Arc::clone(&ring);
                thread::spawn(move || {
                    for i in 0..PER_PRODUCER {
                        let mut value = (p << 32) | i;
                        loop {
                            match ring.try_push(value) {
                                Ok(()) => break,
                                Err(rejected) => {
                                    value = rejected;
                                    thread::yield_now();
                                }
                            }
                        }
                    }
                })
            })
            .collect();

        for p in producers {
            p.join().expect("producer panicked");
        }
        let sum = consumer.join().expect("consumer panicked");
        assert_eq!(sum, PRODUCERS * (PER_PRODUCER - 1) * PER_PRODUCER / 2);
        assert_eq!(popped.load(Ordering::Relaxed) as u64, PRODUCERS * PER_PRODUCER);
    }
}
