// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use chlog::{LevelFilter, Record, Sink, SinkCore};

/// Collects rendered lines in memory.
pub struct MemorySink {
    core: SinkCore,
    lines: Mutex<Vec<String>>,
    flushes: AtomicU64,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            core: SinkCore::new(),
            lines: Mutex::new(Vec::new()),
            flushes: AtomicU64::new(0),
        })
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }
}

impl Sink for MemorySink {
    fn log(&self, record: &Record) {
        if !self.core.enabled(record.level) {
            return;
        }
        let mut line = String::new();
        self.core.render(record, &mut line);
        self.lines.lock().unwrap().push(line);
    }

    fn flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    fn set_pattern(&self, pattern: &str) {
        self.core.set_pattern(pattern);
    }

    fn set_level(&self, level: LevelFilter) {
        self.core.set_level(level);
    }

    fn set_thread_safe(&self, enabled: bool) {
        self.core.set_thread_safe(enabled);
    }

    fn level_threshold(&self) -> LevelFilter {
        self.core.level()
    }
}

/// A collector whose `log` blocks until the gate is opened, to hold the
/// consumer in place while producers overload the queue.
pub struct GateSink {
    core: SinkCore,
    open: Mutex<bool>,
    opened: Condvar,
    lines: Mutex<Vec<String>>,
}

impl GateSink {
    pub fn closed() -> Arc<Self> {
        Arc::new(Self {
            core: SinkCore::new(),
            open: Mutex::new(false),
            opened: Condvar::new(),
            lines: Mutex::new(Vec::new()),
        })
    }

    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.opened.notify_all();
    }

    fn wait_open(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.opened.wait(open).unwrap();
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Sink for GateSink {
    fn log(&self, record: &Record) {
        if !self.core.enabled(record.level) {
            return;
        }
        self.wait_open();
        let mut line = String::new();
        self.core.render(record, &mut line);
        self.lines.lock().unwrap().push(line);
    }

    fn set_pattern(&self, pattern: &str) {
        self.core.set_pattern(pattern);
    }

    fn set_level(&self, level: LevelFilter) {
        self.core.set_level(level);
    }

    fn set_thread_safe(&self, enabled: bool) {
        self.core.set_thread_safe(enabled);
    }

    fn level_threshold(&self) -> LevelFilter {
        self.core.level()
    }
}

/// Counts deliveries and flushes, discarding the content.
pub struct CountingSink {
    records: AtomicU64,
    flushes: AtomicU64,
}

impl CountingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            records: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
        })
    }

    pub fn records(&self) -> u64 {
        self.records.load(Ordering::Relaxed)
    }

    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }
}

impl Sink for CountingSink {
    fn log(&self, _record: &Record) {
        self.records.fetch_add(1, Ordering::Relaxed);
    }

    fn flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }
}
