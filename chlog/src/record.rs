//! The materialized log record passed through the pipeline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use crate::level::Level;

/// Source position captured at the logging callsite.
///
/// The default value is the sentinel used when source capture is
/// disabled: empty file and function, line zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourceLoc {
    pub file: &'static str,
    pub line: u32,
    pub func: &'static str,
}

impl SourceLoc {
    pub const fn new(file: &'static str, line: u32, func: &'static str) -> Self {
        Self { file, line, func }
    }
}

/// A single log event, immutable once constructed.
///
/// Fields that were not captured (per the logger configuration) hold
/// their sentinel values: `UNIX_EPOCH`, thread id 0, empty name, default
/// [`SourceLoc`].
#[derive(Clone, Debug)]
pub struct Record {
    pub ts: SystemTime,
    pub level: Level,
    pub thread_id: u64,
    pub name: String,
    pub payload: String,
    pub seq: u64,
    pub loc: SourceLoc,
}

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

/// Small dense identifier for the calling thread, assigned on first use.
/// Id 0 is reserved as the "not captured" sentinel.
#[inline]
pub(crate) fn current_thread_id() -> u64 {
    THREAD_ID.with(|id| *id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_ids_are_stable_and_distinct() {
        let here = current_thread_id();
        assert_eq!(here, current_thread_id());
        assert_ne!(here, 0);

        let other = std::thread::spawn(current_thread_id)
            .join()
            .expect("thread panicked");
        assert_ne!(here, other);
    }
}
