//! The async consumer loop: batched drain, periodic flush, shutdown
//! drain.

use std::time::{Duration, Instant};

use crate::logger::Shared;
use crate::record::Record;

/// Upper bound on one consumer sleep, so the periodic flush stays
/// responsive even when no records arrive.
const CONSUMER_IDLE_WAIT: Duration = Duration::from_millis(100);

pub(crate) fn run(shared: &Shared) {
    let Some(queue) = shared.queue.as_ref() else {
        return;
    };
    let batch_max = shared.batch_max;
    let mut batch: Vec<Record> = Vec::with_capacity(batch_max);
    let mut last_flush = Instant::now();

    while !shared.stop_requested() {
        batch.clear();
        let n = queue.pop_batch(&mut batch, batch_max);
        if n == 0 {
            queue.wait_for_data(CONSUMER_IDLE_WAIT);
        } else {
            shared.metrics.add_dequeued(n as u64);
            let sinks = shared.sinks_snapshot();
            let flush_on = shared.flush_on();
            for record in &batch {
                for sink in sinks.iter() {
                    if sink.level_threshold().enables(record.level) {
                        sink.log(record);
                    }
                }
                if flush_on.enables(record.level) {
                    for sink in sinks.iter() {
                        sink.flush();
                    }
                    shared.metrics.incr_flushed();
                }
            }
        }

        if last_flush.elapsed() >= shared.flush_every {
            shared.flush_all();
            last_flush = Instant::now();
        }
        shared.metrics.set_queue_size(queue.len() as u64);
    }

    // Drain whatever producers managed to enqueue before the stop
    // signal. Per-record flush-on-level gating no longer applies; each
    // drained batch ends in an unconditional flush.
    loop {
        batch.clear();
        let n = queue.pop_batch(&mut batch, batch_max);
        if n == 0 {
            break;
        }
        shared.metrics.add_dequeued(n as u64);
        let sinks = shared.sinks_snapshot();
        for record in &batch {
            for sink in sinks.iter() {
                if sink.level_threshold().enables(record.level) {
                    sink.log(record);
                }
            }
        }
        for sink in sinks.iter() {
            sink.flush();
        }
        shared.metrics.incr_flushed();
    }
    shared.metrics.set_queue_size(0);
}
