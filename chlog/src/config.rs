//! Logger configuration.

use std::time::Duration;

use crate::level::LevelFilter;

/// Default output template.
pub const DEFAULT_PATTERN: &str = "[{date} {time}.{ms}][{lvl}][tid={tid}][{name}] {msg}";

/// Returns the default [`Config`], ready for chained customization:
///
/// ```
/// use chlog::{config, LevelFilter, Logger};
///
/// let logger = Logger::new(
///     config()
///         .name("app")
///         .level(LevelFilter::Debug)
///         .async_enabled(true)
///         .queue_capacity(1 << 16),
/// );
/// # logger.shutdown();
/// ```
pub fn config() -> Config {
    Config::default()
}

/// Settings for the asynchronous dispatch engine.
#[derive(Clone, Debug)]
pub struct AsyncConfig {
    /// Route records through the background consumer thread.
    pub enabled: bool,
    /// Total capacity across both priority rings. Each ring's share is
    /// rounded up to a power of two.
    pub queue_capacity: usize,
    /// Maximum records per consumer pop. `0` is treated as `1`.
    pub batch_max: usize,
    /// Interval of the consumer's periodic flush.
    pub flush_every: Duration,
    /// When the queue is full: `true` drops trace/debug/info and blocks
    /// for warn+; `false` blocks all producers.
    pub drop_when_full: bool,
    /// Retained for configuration compatibility; dispatch always uses
    /// the two-tier priority queue.
    pub weighted_queue: bool,
}

impl Default for AsyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            queue_capacity: 1 << 14,
            batch_max: 256,
            flush_every: Duration::from_millis(500),
            drop_when_full: true,
            weighted_queue: true,
        }
    }
}

/// Logger configuration. Construct via [`config()`] and the chainable
/// setters, or fill the fields directly.
#[derive(Clone, Debug)]
pub struct Config {
    /// Logger name, rendered by the `{name}` token.
    pub name: String,
    /// Threshold applied before any record work happens.
    pub level: LevelFilter,
    /// Optimizes for a logger owned and used by exactly one thread: no
    /// background thread, no sink pool, non-atomic counters. Such a
    /// logger must not be shared across threads. Forces `async_cfg.enabled`
    /// and `parallel_sinks` off.
    pub single_threaded: bool,
    /// Output template (see [`Pattern`](crate::pattern::Pattern)), or
    /// `"{json}"` for structured output.
    ///
    /// The exact template `"{msg}"` additionally disables all metadata
    /// capture at construction. That shortcut is evaluated once: later
    /// [`set_pattern`](crate::Logger::set_pattern) calls never change
    /// which fields are captured.
    pub pattern: String,
    /// Capture the wall-clock timestamp per record.
    pub capture_timestamp: bool,
    /// Capture the calling thread's id per record.
    pub capture_thread_id: bool,
    /// Copy the logger name into each record.
    pub capture_logger_name: bool,
    /// Capture file/line/function per record.
    pub capture_source_location: bool,
    /// Records at or above this level force a sink flush after delivery.
    pub flush_on_level: LevelFilter,
    /// Async engine settings.
    pub async_cfg: AsyncConfig,
    /// In sync mode, dispatch each record to the worker pool per sink.
    pub parallel_sinks: bool,
    /// Worker count for `parallel_sinks`; `0` means the sink count at
    /// pool creation.
    pub sink_pool_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            level: LevelFilter::Info,
            single_threaded: false,
            pattern: DEFAULT_PATTERN.to_string(),
            capture_timestamp: true,
            capture_thread_id: true,
            capture_logger_name: true,
            capture_source_location: true,
            flush_on_level: LevelFilter::Error,
            async_cfg: AsyncConfig::default(),
            parallel_sinks: true,
            sink_pool_size: 0,
        }
    }
}

impl Config {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn single_threaded(mut self, enabled: bool) -> Self {
        self.single_threaded = enabled;
        self
    }

    pub fn pattern(mut self, template: impl Into<String>) -> Self {
        self.pattern = template.into();
        self
    }

    pub fn capture_timestamp(mut self, enabled: bool) -> Self {
        self.capture_timestamp = enabled;
        self
    }

    pub fn capture_thread_id(mut self, enabled: bool) -> Self {
        self.capture_thread_id = enabled;
        self
    }

    pub fn capture_logger_name(mut self, enabled: bool) -> Self {
        self.capture_logger_name = enabled;
        self
    }

    pub fn capture_source_location(mut self, enabled: bool) -> Self {
        self.capture_source_location = enabled;
        self
    }

    pub fn flush_on_level(mut self, level: LevelFilter) -> Self {
        self.flush_on_level = level;
        self
    }

    pub fn async_enabled(mut self, enabled: bool) -> Self {
        self.async_cfg.enabled = enabled;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.async_cfg.queue_capacity = capacity;
        self
    }

    pub fn batch_max(mut self, batch_max: usize) -> Self {
        self.async_cfg.batch_max = batch_max;
        self
    }

    pub fn flush_every(mut self, interval: Duration) -> Self {
        self.async_cfg.flush_every = interval;
        self
    }

    pub fn drop_when_full(mut self, enabled: bool) -> Self {
        self.async_cfg.drop_when_full = enabled;
        self
    }

    pub fn parallel_sinks(mut self, enabled: bool) -> Self {
        self.parallel_sinks = enabled;
        self
    }

    pub fn sink_pool_size(mut self, size: usize) -> Self {
        self.sink_pool_size = size;
        self
    }
}
