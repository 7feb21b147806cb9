//! Defines the levels of verbosity available for logging.
//!
//! [`Level`] tags individual records; [`LevelFilter`] is the runtime
//! threshold and adds [`LevelFilter::Off`] to disable logging entirely.
//! Levels compare numerically, so `Level::Warn >= Level::Info`.
//!
//! Separately from the threshold ordering, every level has a *priority
//! weight* used by the async queue to segregate records: `Warn` and above
//! are high priority and are routed to the reserved high ring.

use std::str::FromStr;

use thiserror::Error;

/// Weight at or above which a record is considered high priority.
pub(crate) const HIGH_PRIORITY_WEIGHT: u8 = 3;

/// Verbosity of a single log record.
///
/// `Trace` is the lowest level, `Critical` the highest. Whether a record
/// is actually emitted is decided by comparing against the logger's
/// [`LevelFilter`].
#[repr(usize)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Very fine-grained information, usually only of interest when
    /// chasing a specific problem.
    Trace = 0,
    /// Debugging information.
    Debug = 1,
    /// Useful operational information.
    Info = 2,
    /// Potentially hazardous situations.
    Warn = 3,
    /// Serious errors.
    Error = 4,
    /// Errors after which the process may not be able to continue.
    Critical = 5,
}

impl Level {
    /// Upper-case name, as rendered by the `{lvl}` pattern token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Priority weight used by the async queue. Distinct from the
    /// threshold ordering: `Trace` and `Debug` share a weight.
    pub const fn weight(self) -> u8 {
        match self {
            Self::Trace | Self::Debug => 1,
            Self::Info => 2,
            Self::Warn => 3,
            Self::Error => 4,
            Self::Critical => 5,
        }
    }

    /// Whether records at this level go to the reserved high-priority ring.
    pub const fn is_high_priority(self) -> bool {
        self.weight() >= HIGH_PRIORITY_WEIGHT
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Debug for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// Runtime threshold for which [`Level`]s get recorded, with the addition
/// of `Off`, which disables all logging.
#[repr(usize)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LevelFilter {
    /// Enables trace and above.
    Trace = 0,
    /// Enables debug and above.
    Debug = 1,
    /// Enables info and above.
    Info = 2,
    /// Enables warn and above.
    Warn = 3,
    /// Enables error and above.
    Error = 4,
    /// Enables critical only.
    Critical = 5,
    /// Disables all logging.
    Off = 6,
}

impl LevelFilter {
    /// Whether a record at `level` passes this threshold.
    #[inline]
    pub const fn enables(self, level: Level) -> bool {
        level as usize >= self as usize
    }

    /// Decodes a value previously stored with `as usize`. Values outside
    /// the valid range fall back to `Off`.
    pub(crate) const fn from_usize(value: usize) -> Self {
        match value {
            0 => Self::Trace,
            1 => Self::Debug,
            2 => Self::Info,
            3 => Self::Warn,
            4 => Self::Error,
            5 => Self::Critical,
            _ => Self::Off,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
            Self::Off => "OFF",
        }
    }
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> Self {
        Self::from_usize(level as usize)
    }
}

impl std::fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Debug for LevelFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// Error returned when parsing a [`LevelFilter`] from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level: {0:?}")]
pub struct ParseLevelError(String);

impl FromStr for LevelFilter {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" => Ok(Self::Critical),
            "OFF" => Ok(Self::Off),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}
