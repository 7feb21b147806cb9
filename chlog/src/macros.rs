/// Captures the callsite as a [`SourceLoc`](crate::SourceLoc): file,
/// line, and enclosing module path.
#[macro_export]
macro_rules! source_loc {
    () => {
        $crate::SourceLoc::new(file!(), line!(), module_path!())
    };
}

/// Logs at an explicit [`Level`](crate::Level) with source capture:
///
/// ```
/// # use chlog::{config, Level, Logger};
/// # let logger = Logger::new(config());
/// chlog::log!(logger, Level::Info, "started in {} ms", 12);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $lvl:expr, $fmt:tt) => {
        $logger.log_at($lvl, $crate::source_loc!(), $fmt, ::core::format_args!($fmt))
    };
    ($logger:expr, $lvl:expr, $fmt:tt, $($arg:tt)+) => {
        $logger.log_at(
            $lvl,
            $crate::source_loc!(),
            $fmt,
            ::core::format_args!($fmt, $($arg)+),
        )
    };
}

/// Logs at trace level. See [`log!`].
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Trace, $($rest)+)
    };
}

/// Logs at debug level. See [`log!`].
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($rest)+)
    };
}

/// Logs at info level. See [`log!`].
#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($rest)+)
    };
}

/// Logs at warn level. See [`log!`].
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Warn, $($rest)+)
    };
}

/// Logs at error level. See [`log!`].
#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($rest)+)
    };
}

/// Logs at critical level. See [`log!`].
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Critical, $($rest)+)
    };
}
