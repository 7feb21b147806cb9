use chlog::{Record, Sink};

/// Discards every record. Useful for measuring logger overhead in
/// isolation from sink I/O.
pub struct NullSink;

impl Sink for NullSink {
    fn log(&self, _record: &Record) {}
}
