mod common;

use std::sync::Arc;

use chlog::{config, info, Logger};
use common::MemorySink;

#[test]
fn json_lines_round_trip() {
    let logger = Logger::new(
        config()
            .name("svc")
            .pattern("{json}")
            .parallel_sinks(false),
    );
    let sink = MemorySink::new();
    logger.add_sink(sink.clone());

    let nasty = "quote \" slash \\ tab \t newline \n ctl \u{1} done";
    info!(logger, "{}", nasty);
    logger.shutdown();

    let lines = sink.lines();
    assert_eq!(lines.len(), 1);
    let value: serde_json::Value = serde_json::from_str(&lines[0]).expect("line must be valid JSON");

    let object = value.as_object().expect("one object per line");
    assert_eq!(object.len(), 9);
    // Fixed field order in the emitted text (the parsed map re-sorts).
    let mut last = 0;
    for key in ["\"ts\"", "\"lvl\"", "\"tid\"", "\"name\"", "\"seq\"", "\"file\"", "\"line\"", "\"func\"", "\"msg\""] {
        let at = lines[0].find(key).unwrap_or_else(|| panic!("{key} missing"));
        assert!(at >= last, "{key} out of order");
        last = at;
    }

    assert_eq!(value["lvl"], "INFO");
    assert_eq!(value["name"], "svc");
    assert_eq!(value["seq"], 0);
    assert_eq!(value["msg"], nasty);
    assert!(value["tid"].as_str().unwrap().parse::<u64>().unwrap() > 0);
    assert!(value["file"].as_str().unwrap().ends_with(".rs"));
    assert!(value["line"].as_u64().unwrap() > 0);
    assert!(!value["func"].as_str().unwrap().is_empty());
    assert_eq!(value["ts"].as_str().unwrap().len(), 23);
}

/// Sequence numbers form a contiguous prefix of the naturals across all
/// producers, and each producer's records come out in its call order.
#[test]
fn sequences_are_contiguous_across_producers() {
    const THREADS: u64 = 4;
    const PER_THREAD: u64 = 500;

    let logger = Arc::new(Logger::new(
        config()
            .pattern("{json}")
            .async_enabled(true)
            .queue_capacity(1 << 12),
    ));
    let sink = MemorySink::new();
    logger.add_sink(sink.clone());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            std::thread::spawn(move || {
                for i in 0..PER_THREAD {
                    info!(logger, "t{} {}", t, i);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.shutdown();

    let lines = sink.lines();
    assert_eq!(lines.len() as u64, THREADS * PER_THREAD);

    let mut seqs = Vec::new();
    let mut per_thread: Vec<Vec<u64>> = vec![Vec::new(); THREADS as usize];
    for line in &lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        seqs.push(value["seq"].as_u64().unwrap());
        let msg = value["msg"].as_str().unwrap();
        let (tag, i) = msg.split_once(' ').unwrap();
        let t: usize = tag.strip_prefix('t').unwrap().parse().unwrap();
        per_thread[t].push(i.parse().unwrap());
    }

    seqs.sort_unstable();
    let expected: Vec<u64> = (0..THREADS * PER_THREAD).collect();
    assert_eq!(seqs, expected, "sequence numbers must be contiguous");

    for (t, seen) in per_thread.iter().enumerate() {
        let expected: Vec<u64> = (0..PER_THREAD).collect();
        assert_eq!(seen, &expected, "producer {t} out of order");
    }

    let stats = logger.stats();
    assert_eq!(stats.enqueued, THREADS * PER_THREAD);
    assert_eq!(stats.dequeued, THREADS * PER_THREAD);
    assert_eq!(stats.dropped, 0);
}
