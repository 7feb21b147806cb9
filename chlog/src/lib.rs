//! High-throughput structured logging with a bounded, priority-aware
//! asynchronous engine.
//!
//! # Overview
//!
//! `chlog` accepts records from one or more producer threads, classifies
//! them by severity, formats them against a pattern, and fans them out
//! to a set of [`Sink`]s. Three operating modes share one API:
//!
//! * **Single-threaded**: no background threads, no locks, no atomic
//!   counters on the hot path. For embedded contexts and tight loops; a
//!   logger configured this way must stay on one thread.
//! * **Synchronous multi-threaded**: producers format and write to sinks
//!   directly, optionally spreading per-sink work over a small pool.
//! * **Asynchronous multi-threaded**: producers enqueue into a bounded
//!   two-tier lock-free queue; a single consumer thread drains in
//!   batches. Warn-and-above records get a structurally reserved slice
//!   of the queue, so debug floods cannot starve them, and the overload
//!   policy decides between dropping low-priority records and blocking.
//!
//! # Usage
//!
//! ```no_run
//! use chlog::{config, info, LevelFilter, Logger};
//! use std::sync::Arc;
//!
//! let logger = Arc::new(Logger::new(
//!     config()
//!         .name("app")
//!         .level(LevelFilter::Debug)
//!         .async_enabled(true),
//! ));
//! // logger.add_sink(...);
//!
//! info!(logger, "listening on {}", "0.0.0.0:8080");
//!
//! logger.shutdown();
//! ```
//!
//! Sinks decide where lines go; the `chlog-sinks` crate provides
//! console, rotating-file, daily-file and JSON-file implementations.
//! The logging never diverts the caller's control flow: formatting
//! failures fall back to the raw template, a full queue either drops or
//! briefly blocks per policy, and sink I/O failures are contained in the
//! sink.
//!
//! # Patterns
//!
//! Output is driven by a template over `{ts} {date} {time} {ms} {lvl}
//! {tid} {name} {msg} {file} {line} {func}`, or the special `"{json}"`
//! pattern for one JSON object per record. See [`pattern`].
//!
//! # Shutdown
//!
//! [`Logger::shutdown`] (also run on drop) signals the consumer, drains
//! everything already enqueued, flushes every sink once more, and joins
//! all threads the logger started. It is idempotent and safe to race
//! with producers; records that lose the race with the stop signal may
//! be rejected.

/// Logger configuration and defaults.
pub mod config;
/// Logging levels and the runtime threshold filter.
pub mod level;
/// Logging macros with callsite capture.
pub mod macros;
/// Pattern parsing, rendering, and the JSON line format.
pub mod pattern;
/// The [`Sink`] output contract and shared sink state.
pub mod sink;

mod logger;
mod metrics;
mod pool;
mod queue;
mod record;
mod utils;
mod worker;

pub use config::{config, AsyncConfig, Config, DEFAULT_PATTERN};
pub use level::{Level, LevelFilter, ParseLevelError};
pub use logger::Logger;
pub use metrics::MetricsSnapshot;
pub use pattern::Pattern;
pub use record::{Record, SourceLoc};
pub use sink::{Sink, SinkCore, DEFAULT_SINK_PATTERN};
