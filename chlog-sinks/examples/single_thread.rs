//! Single-threaded fast-path harness against a null sink. Accepts
//! `--iters N` or the `CHLOG_BENCH_ITERS` environment variable.

use std::sync::Arc;
use std::time::Instant;

use chlog::{config, info, LevelFilter, Logger};
use chlog_sinks::NullSink;

fn iterations() -> u64 {
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
        .unwrap_or(5_000_000)
}

fn main() {
    let iterations = iterations();

    let logger = Logger::new(
        config()
            .name("st_bench")
            .level(LevelFilter::Info)
            .pattern("{msg}")
            .flush_on_level(LevelFilter::Critical)
            .single_threaded(true),
    );
    logger.add_sink(Arc::new(NullSink));

    // Warmup to stabilize codegen/caches.
    for i in 0..1_000u64 {
        info!(logger, "warmup {}", i);
    }

    let start = Instant::now();
    for i in 0..iterations {
        info!(logger, "v {}", i);
    }
    let elapsed = start.elapsed();
    logger.shutdown();

    let stats = logger.stats();
    let seconds = elapsed.as_secs_f64();
    println!("Iterations:  {iterations}");
    println!("Seconds:     {seconds:.3}");
    println!("Dequeued:    {}", stats.dequeued);
    println!(
        "Throughput:  {:.0} msgs/s",
        stats.dequeued as f64 / seconds
    );
}
