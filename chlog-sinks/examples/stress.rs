//! Multi-threaded stress harness: four sinks, mixed severities, async
//! dispatch. Accepts `--iters N` (messages per producer) or the
//! `CHLOG_BENCH_ITERS` environment variable.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chlog::{config, debug, error, info, warn, LevelFilter, Logger};
use chlog_sinks::{ConsoleSink, ConsoleStyle, DailyFileSink, JsonFileSink, RotatingFileSink};

const THREADS: usize = 20;

fn messages_per_thread() -> u64 {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--iters" {
            if let Some(n) = args.next().and_then(|n| n.parse().ok()) {
                return n;
            }
        }
    }
    std::env::var("CHLOG_BENCH_ITERS")
        .ok()
        .and_then(|n| n.parse().ok())
        .unwrap_or(15_000)
}

fn main() -> std::io::Result<()> {
    let messages = messages_per_thread();

    let logger = Arc::new(Logger::new(
        config()
            .name("stress")
            .level(LevelFilter::Trace)
            .pattern("[{date} {time}.{ms}][{lvl}][tid={tid}][{name}] {msg}")
            .flush_on_level(LevelFilter::Warn)
            .async_enabled(true)
            .queue_capacity(1 << 16)
            .batch_max(256)
            .flush_every(Duration::from_millis(200))
            .drop_when_full(true),
    ));
    logger.add_sink(Arc::new(ConsoleSink::new(ConsoleStyle::Plain)));
    logger.add_sink(Arc::new(RotatingFileSink::new(
        "logs/stress.log",
        32 * 1024 * 1024,
        5,
    )?));
    logger.add_sink(Arc::new(JsonFileSink::new("logs/stress.json")?));
    logger.add_sink(Arc::new(DailyFileSink::new("logs/daily")?));

    let start = Instant::now();

    let producers: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            std::thread::spawn(move || {
                for i in 0..messages {
                    // Mixed levels to simulate realistic workloads.
                    if i % 1000 == 0 {
                        error!(logger, "E thread={} i={}", t, i);
                    } else if i % 200 == 0 {
                        warn!(logger, "W thread={} i={}", t, i);
                    } else if i % 5 == 0 {
                        info!(logger, "I thread={} i={}", t, i);
                    } else {
                        debug!(logger, "D thread={} i={}", t, i);
                    }
                }
            })
        })
        .collect();

    for producer in producers {
        let _ = producer.join();
    }
    logger.shutdown();

    let elapsed = start.elapsed();
    let stats = logger.stats();
    println!("Total time: {} ms", elapsed.as_millis());
    println!("Enqueued:   {}", stats.enqueued);
    println!("Dequeued:   {}", stats.dequeued);
    println!("Dropped:    {}", stats.dropped);
    println!("Flushed:    {}", stats.flushed);
    println!("Queue size: {}", stats.queue_size);
    println!(
        "Throughput: {:.0} msgs/s",
        stats.dequeued as f64 / elapsed.as_secs_f64()
    );

    Ok(())
}
