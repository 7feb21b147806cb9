//! Logger front-end: level gate, record construction, mode dispatch.

use std::cell::UnsafeCell;
use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime};

use dyn_fmt::AsStrFormatExt;
use parking_lot::{Mutex, RwLock};

use crate::config::Config;
use crate::level::{Level, LevelFilter};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::pattern::Pattern;
use crate::pool::ThreadPool;
use crate::queue::DualQueue;
use crate::record::{current_thread_id, Record, SourceLoc};
use crate::sink::Sink;
use crate::worker;

type SinkList = Arc<Vec<Arc<dyn Sink>>>;

/// State shared between producers and the consumer thread.
pub(crate) struct Shared {
    name: String,
    level: AtomicUsize,
    flush_on_level: AtomicUsize,
    pattern: Mutex<String>,
    /// Copy-on-write sink list: readers clone the inner `Arc` under a
    /// read lock, writers publish a freshly built vector.
    sinks: RwLock<SinkList>,
    pub(crate) metrics: Metrics,
    pub(crate) queue: Option<DualQueue<Record>>,
    seq: AtomicU64,
    stop: AtomicBool,
    pub(crate) batch_max: usize,
    pub(crate) flush_every: Duration,
}

impl Shared {
    #[inline]
    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    #[inline]
    fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_usize(self.level.load(Ordering::Relaxed))
    }

    #[inline]
    pub(crate) fn flush_on(&self) -> LevelFilter {
        LevelFilter::from_usize(self.flush_on_level.load(Ordering::Relaxed))
    }

    #[inline]
    pub(crate) fn sinks_snapshot(&self) -> SinkList {
        self.sinks.read().clone()
    }

    pub(crate) fn flush_all(&self) {
        let sinks = self.sinks_snapshot();
        for sink in sinks.iter() {
            sink.flush();
        }
        self.metrics.incr_flushed();
    }
}

/// Counters and sink list for single-threaded mode; deliberately free of
/// atomics and locks.
struct SingleThreadState {
    seq: u64,
    dropped: u64,
    enqueued: u64,
    dequeued: u64,
    flushed: u64,
    sinks: Vec<Arc<dyn Sink>>,
}

/// The logging handle.
///
/// One `Logger` owns its sinks, its configuration, and (in async mode)
/// its consumer thread. Multiple loggers coexist without coordination.
/// Dropping the logger shuts it down.
///
/// With `single_threaded` configured the logger keeps non-atomic
/// internal state and must not be shared across threads, mirroring its
/// "no locks, no atomics" contract; in the other modes it is freely
/// shareable (e.g. in an `Arc`).
pub struct Logger {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
    pool: Mutex<Option<ThreadPool>>,
    shutdown_done: AtomicBool,
    single_threaded: bool,
    parallel_sinks: bool,
    sink_pool_size: usize,
    drop_when_full: bool,
    capture_timestamp: bool,
    capture_thread_id: bool,
    capture_logger_name: bool,
    capture_source_location: bool,
    st: UnsafeCell<SingleThreadState>,
}

// SAFETY: every field except `st` is Sync. `st` is only touched when
// `single_threaded` is set, and a single-threaded logger's contract
// (documented on the type and on `Config::single_threaded`) is that it
// is used from exactly one thread.
unsafe impl Sync for Logger {}

impl Logger {
    /// Builds a logger from `config` and, in async mode, starts its
    /// consumer thread.
    pub fn new(config: Config) -> Self {
        let mut cfg = config;
        if cfg.single_threaded {
            // Keep the runtime truly single-threaded.
            cfg.async_cfg.enabled = false;
            cfg.parallel_sinks = false;
        }
        // Opting into message-only output skips all metadata capture.
        // Evaluated once; later pattern changes do not revisit this.
        if Pattern::parse(&cfg.pattern).is_message_only() {
            cfg.capture_timestamp = false;
            cfg.capture_thread_id = false;
            cfg.capture_logger_name = false;
            cfg.capture_source_location = false;
        }

        let queue = cfg
            .async_cfg
            .enabled
            .then(|| DualQueue::new(cfg.async_cfg.queue_capacity));

        let shared = Arc::new(Shared {
            name: cfg.name,
            level: AtomicUsize::new(cfg.level as usize),
            flush_on_level: AtomicUsize::new(cfg.flush_on_level as usize),
            pattern: Mutex::new(cfg.pattern),
            sinks: RwLock::new(Arc::new(Vec::new())),
            metrics: Metrics::default(),
            queue,
            seq: AtomicU64::new(0),
            stop: AtomicBool::new(false),
            batch_max: cfg.async_cfg.batch_max.max(1),
            flush_every: cfg.async_cfg.flush_every,
        });

        let worker = shared.queue.is_some().then(|| {
            let shared = Arc::clone(&shared);
            std::thread::Builder::new()
                .name("chlog-worker".to_string())
                .spawn(move || worker::run(&shared))
                .expect("failed to spawn chlog-worker thread")
        });

        Self {
            shared,
            worker: Mutex::new(worker),
            pool: Mutex::new(None),
            shutdown_done: AtomicBool::new(false),
            single_threaded: cfg.single_threaded,
            parallel_sinks: cfg.parallel_sinks,
            sink_pool_size: cfg.sink_pool_size,
            drop_when_full: cfg.async_cfg.drop_when_full,
            capture_timestamp: cfg.capture_timestamp,
            capture_thread_id: cfg.capture_thread_id,
            capture_logger_name: cfg.capture_logger_name,
            capture_source_location: cfg.capture_source_location,
            st: UnsafeCell::new(SingleThreadState {
                seq: 0,
                dropped: 0,
                enqueued: 0,
                dequeued: 0,
                flushed: 0,
                sinks: Vec::new(),
            }),
        }
    }

    /// Whether a record at `level` would pass the global threshold.
    /// Rejected levels cost a single relaxed load: no timestamp, thread
    /// id, source or payload work happens.
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        self.shared.level_filter().enables(level)
    }

    /// Logs with an explicit callsite and the raw template, as captured
    /// by the [`log!`](crate::log!) family of macros. If a formatting
    /// argument's `Display`/`Debug` implementation errors, the payload
    /// falls back to the raw template; the record is never lost to a
    /// formatting failure.
    #[inline]
    pub fn log_at(&self, level: Level, loc: SourceLoc, template: &str, args: fmt::Arguments) {
        if !self.enabled(level) {
            return;
        }
        self.dispatch(level, loc, format_payload(template, args));
    }

    /// Logs pre-built format arguments, capturing the caller's file and
    /// line.
    #[track_caller]
    #[inline]
    pub fn log(&self, level: Level, args: fmt::Arguments) {
        if !self.enabled(level) {
            return;
        }
        let caller = Location::caller();
        let loc = SourceLoc::new(caller.file(), caller.line(), "");
        self.dispatch(level, loc, format_payload("", args));
    }

    /// Logs through a template known only at runtime: `{}` placeholders
    /// are substituted with `args` in order. Surplus placeholders render
    /// empty, surplus arguments are ignored.
    #[track_caller]
    pub fn log_dyn<D: fmt::Display>(&self, level: Level, template: &str, args: &[D]) {
        if !self.enabled(level) {
            return;
        }
        let caller = Location::caller();
        let loc = SourceLoc::new(caller.file(), caller.line(), "");
        self.dispatch(level, loc, template.format(args));
    }

    fn dispatch(&self, level: Level, loc: SourceLoc, payload: String) {
        let record = Record {
            ts: if self.capture_timestamp {
                SystemTime::now()
            } else {
                SystemTime::UNIX_EPOCH
            },
            level,
            thread_id: if self.capture_thread_id {
                current_thread_id()
            } else {
                0
            },
            name: if self.capture_logger_name {
                self.shared.name.clone()
            } else {
                String::new()
            },
            payload,
            seq: 0,
            loc: if self.capture_source_location {
                loc
            } else {
                SourceLoc::default()
            },
        };

        if self.single_threaded {
            self.dispatch_single_threaded(record);
            return;
        }

        let mut record = record;
        record.seq = self.shared.seq.fetch_add(1, Ordering::Relaxed);

        match self.shared.queue.as_ref() {
            Some(queue) => self.dispatch_async(queue, record),
            None => self.dispatch_sync(record),
        }
    }

    fn dispatch_single_threaded(&self, mut record: Record) {
        let level = record.level;
        {
            // SAFETY: single-threaded mode, see the Sync impl.
            let st = unsafe { &mut *self.st.get() };
            record.seq = st.seq;
            st.seq += 1;
            for sink in &st.sinks {
                if sink.level_threshold().enables(level) {
                    sink.log(&record);
                }
            }
            st.enqueued += 1;
            st.dequeued += 1;
        }
        if self.shared.flush_on().enables(level) {
            self.flush();
        }
    }

    fn dispatch_async(&self, queue: &DualQueue<Record>, record: Record) {
        let metrics = &self.shared.metrics;
        let level = record.level;
        let weight = level.weight();
        match queue.try_push(record, weight) {
            Ok(()) => metrics.incr_enqueued(),
            Err(record) => {
                if self.drop_when_full && !level.is_high_priority() {
                    metrics.incr_dropped();
                } else if queue.push_blocking(record, weight).is_ok() {
                    metrics.incr_enqueued();
                }
                // A blocking push abandoned on stop loses the record;
                // shutdown permits that.
            }
        }
    }

    fn dispatch_sync(&self, record: Record) {
        let level = record.level;
        let sinks = self.shared.sinks_snapshot();
        self.shared.metrics.incr_enqueued();

        let dispatched_to_pool = self.parallel_sinks && {
            let pool = self.pool.lock();
            match pool.as_ref() {
                Some(pool) => {
                    for sink in sinks.iter() {
                        let sink = Arc::clone(sink);
                        let record = record.clone();
                        pool.execute(move || {
                            if sink.level_threshold().enables(record.level) {
                                sink.log(&record);
                            }
                        });
                    }
                    true
                }
                None => false,
            }
        };
        if !dispatched_to_pool {
            for sink in sinks.iter() {
                if sink.level_threshold().enables(level) {
                    sink.log(&record);
                }
            }
        }

        self.shared.metrics.incr_dequeued();
        if self.shared.flush_on().enables(level) {
            self.flush();
        }
    }

    /// Appends a sink. The sink receives the logger's current pattern
    /// and is marked thread-safe except in single-threaded mode. Sinks
    /// can be added at any time, including while logging is in flight.
    pub fn add_sink(&self, sink: Arc<dyn Sink>) {
        if self.single_threaded {
            sink.set_pattern(&self.shared.pattern.lock());
            sink.set_thread_safe(false);
            // SAFETY: single-threaded mode, see the Sync impl.
            let st = unsafe { &mut *self.st.get() };
            st.sinks.push(sink);
            return;
        }

        let mut sinks = self.shared.sinks.write();
        sink.set_pattern(&self.shared.pattern.lock());
        sink.set_thread_safe(true);
        let mut next = Vec::with_capacity(sinks.len() + 1);
        next.extend(sinks.iter().cloned());
        next.push(sink);
        *sinks = Arc::new(next);
        let sink_count = sinks.len();
        drop(sinks);

        // The pool only ever serves sync-mode parallel dispatch; async
        // mode keeps sink writes on the consumer thread.
        if self.shared.queue.is_none() && self.parallel_sinks {
            let mut pool = self.pool.lock();
            if pool.is_none() {
                let size = if self.sink_pool_size != 0 {
                    self.sink_pool_size
                } else {
                    sink_count
                };
                *pool = Some(ThreadPool::new(size));
            }
        }
    }

    /// Updates the global level threshold.
    pub fn set_level(&self, level: LevelFilter) {
        self.shared.level.store(level as usize, Ordering::Relaxed);
    }

    /// Replaces the output template and broadcasts it to every current
    /// sink. Metadata capture flags are not revisited (they are fixed at
    /// construction).
    pub fn set_pattern(&self, template: &str) {
        if self.single_threaded {
            *self.shared.pattern.lock() = template.to_string();
            // SAFETY: single-threaded mode, see the Sync impl.
            let st = unsafe { &*self.st.get() };
            for sink in &st.sinks {
                sink.set_pattern(template);
            }
            return;
        }

        let sinks = self.shared.sinks.write();
        *self.shared.pattern.lock() = template.to_string();
        for sink in sinks.iter() {
            sink.set_pattern(template);
        }
    }

    /// Updates the flush-on-level threshold.
    pub fn set_flush_on(&self, level: LevelFilter) {
        self.shared
            .flush_on_level
            .store(level as usize, Ordering::Relaxed);
    }

    /// Flushes every sink and counts one flush.
    pub fn flush(&self) {
        if self.single_threaded {
            // SAFETY: single-threaded mode, see the Sync impl.
            let st = unsafe { &mut *self.st.get() };
            for sink in &st.sinks {
                sink.flush();
            }
            st.flushed += 1;
            return;
        }
        self.shared.flush_all();
    }

    /// Stops the logger: signals the consumer, joins it (which drains
    /// the queue), shuts the sync pool down, and issues a final flush.
    /// Idempotent; repeated calls are no-ops.
    pub fn shutdown(&self) {
        if self
            .shutdown_done
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        if self.single_threaded {
            self.flush();
            return;
        }

        self.shared.stop.store(true, Ordering::Relaxed);
        if let Some(queue) = self.shared.queue.as_ref() {
            queue.signal_stop();
        }
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
        if let Some(mut pool) = self.pool.lock().take() {
            pool.shutdown();
        }
        self.flush();
    }

    /// Eventually-consistent counters snapshot.
    pub fn stats(&self) -> MetricsSnapshot {
        if self.single_threaded {
            // SAFETY: single-threaded mode, see the Sync impl.
            let st = unsafe { &*self.st.get() };
            return MetricsSnapshot {
                dropped: st.dropped,
                enqueued: st.enqueued,
                dequeued: st.dequeued,
                flushed: st.flushed,
                queue_size: 0,
            };
        }

        let mut snapshot = self.shared.metrics.snapshot();
        snapshot.queue_size = self
            .shared
            .queue
            .as_ref()
            .map_or(0, |queue| queue.len() as u64);
        snapshot
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn format_payload(template: &str, args: fmt::Arguments) -> String {
    // Plain literals skip the formatting machinery.
    if let Some(s) = args.as_str() {
        return s.to_string();
    }
    let mut payload = String::new();
    if fmt::write(&mut payload, args).is_err() {
        payload.clear();
        payload.push_str(template);
    }
    payload
}
