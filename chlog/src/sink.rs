//! The polymorphic output contract.
//!
//! A [`Sink`] receives fully-constructed [`Record`]s from the logger (on
//! the consumer thread in async mode, on producer or pool threads in
//! sync mode) and writes them somewhere. Implementations hold their own
//! pattern and level threshold; [`SinkCore`] bundles that state so
//! concrete sinks only supply the actual I/O.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::level::{Level, LevelFilter};
use crate::pattern::Pattern;
use crate::record::Record;

/// Default template used by sinks that were never given a pattern.
pub const DEFAULT_SINK_PATTERN: &str = "[{date} {time}.{ms}][{lvl}][{name}] {msg}";

/// An output destination for log records.
///
/// Implementations must be callable from the thread the logger dispatches
/// on: the single consumer thread in async mode, arbitrary producer or
/// pool threads in sync mode (the logger marks this via
/// [`set_thread_safe`](Sink::set_thread_safe)). When the thread-safe flag
/// is clear the caller guarantees exclusive access.
///
/// Sinks must contain their own failures: `log` and `flush` are
/// infallible from the framework's point of view, and implementations
/// must not panic. A record handed to a failing sink counts as delivered.
pub trait Sink: Send + Sync {
    /// Writes one record. The implementation applies its own level
    /// threshold; the logger has already applied the global one.
    fn log(&self, record: &Record);

    /// Forces buffered output to its destination.
    fn flush(&self) {}

    /// Replaces the sink's output template.
    fn set_pattern(&self, _pattern: &str) {}

    /// Replaces the sink's own level threshold.
    fn set_level(&self, _level: LevelFilter) {}

    /// Informs the sink whether it may be called from several threads.
    fn set_thread_safe(&self, _enabled: bool) {}

    /// The sink's own level threshold.
    fn level_threshold(&self) -> LevelFilter {
        LevelFilter::Trace
    }
}

/// Shared state for sink implementations: parsed pattern, level
/// threshold and the thread-safe flag, each independently updatable
/// through `&self`.
pub struct SinkCore {
    pattern: RwLock<Pattern>,
    level: AtomicUsize,
    thread_safe: AtomicBool,
}

impl SinkCore {
    pub fn new() -> Self {
        Self::with_pattern(DEFAULT_SINK_PATTERN)
    }

    pub fn with_pattern(template: &str) -> Self {
        Self {
            pattern: RwLock::new(Pattern::parse(template)),
            level: AtomicUsize::new(LevelFilter::Trace as usize),
            thread_safe: AtomicBool::new(true),
        }
    }

    pub fn set_pattern(&self, template: &str) {
        *self.pattern.write() = Pattern::parse(template);
    }

    pub fn set_level(&self, level: LevelFilter) {
        self.level.store(level as usize, Ordering::Relaxed);
    }

    pub fn level(&self) -> LevelFilter {
        LevelFilter::from_usize(self.level.load(Ordering::Relaxed))
    }

    pub fn set_thread_safe(&self, enabled: bool) {
        self.thread_safe.store(enabled, Ordering::Relaxed);
    }

    pub fn thread_safe(&self) -> bool {
        self.thread_safe.load(Ordering::Relaxed)
    }

    /// Whether the sink's own threshold admits `level`.
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        self.level().enables(level)
    }

    /// Renders `record` with the current pattern, appending to `out`.
    pub fn render(&self, record: &Record, out: &mut String) {
        self.pattern.read().render(record, out);
    }
}

impl Default for SinkCore {
    fn default() -> Self {
        Self::new()
    }
}
