//! Output sinks for [`chlog`]: console (plain or ANSI-colored),
//! size-rotated file, daily file, JSON-lines file, and a null sink for
//! measurements.
//!
//! Constructors that touch the filesystem return `io::Result`; once a
//! sink exists, all of its I/O failures are contained inside `log` /
//! `flush`, per the [`Sink`](chlog::Sink) contract.

/// Implements the sink state methods by delegating to the `core` field.
macro_rules! delegate_sink_core {
    () => {
        fn set_pattern(&self, pattern: &str) {
            self.core.set_pattern(pattern);
        }

        fn set_level(&self, level: chlog::LevelFilter) {
            self.core.set_level(level);
        }

        fn set_thread_safe(&self, enabled: bool) {
            self.core.set_thread_safe(enabled);
        }

        fn level_threshold(&self) -> chlog::LevelFilter {
            self.core.level()
        }
    };
}

mod console;
mod daily_file;
mod json_file;
mod null;
mod rotating_file;

pub use console::{ConsoleSink, ConsoleStyle};
pub use daily_file::DailyFileSink;
pub use json_file::JsonFileSink;
pub use null::NullSink;
pub use rotating_file::RotatingFileSink;
