use std::io::Write;

use parking_lot::Mutex;

use chlog::{Record, Sink, SinkCore};

/// Whether console output is colorized by severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleStyle {
    Plain,
    Color,
}

/// Writes one rendered line per record, to stdout by default.
pub struct ConsoleSink {
    core: SinkCore,
    style: ConsoleStyle,
    target: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    pub fn new(style: ConsoleStyle) -> Self {
        Self::with_writer(Box::new(std::io::stdout()), style)
    }

    pub fn stderr(style: ConsoleStyle) -> Self {
        Self::with_writer(Box::new(std::io::stderr()), style)
    }

    /// Redirects output to an arbitrary writer (memory collectors,
    /// pipes).
    pub fn with_writer(writer: Box<dyn Write + Send>, style: ConsoleStyle) -> Self {
        Self {
            core: SinkCore::new(),
            style,
            target: Mutex::new(writer),
        }
    }
}

impl Sink for ConsoleSink {
    fn log(&self, record: &Record) {
        if !self.core.enabled(record.level) {
            return;
        }
        let mut line = String::new();
        self.core.render(record, &mut line);

        let mut target = self.target.lock();
        let _ = match self.style {
            ConsoleStyle::Color => writeln!(target, "{}{line}\x1b[0m", sgr_prefix(record.level)),
            ConsoleStyle::Plain => writeln!(target, "{line}"),
        };
    }

    fn flush(&self) {
        let _ = self.target.lock().flush();
    }

    delegate_sink_core!();
}

fn sgr_prefix(level: chlog::Level) -> &'static str {
    match level {
        chlog::Level::Trace => "\x1b[37m",
        chlog::Level::Debug => "\x1b[36m",
        chlog::Level::Info => "\x1b[32m",
        chlog::Level::Warn => "\x1b[33m",
        chlog::Level::Error => "\x1b[31m",
        chlog::Level::Critical => "\x1b[1;31m",
    }
}
