use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use parking_lot::Mutex;

use chlog::pattern::write_json_line;
use chlog::{Record, Sink, SinkCore};

/// Writes one JSON object per record, regardless of the configured
/// pattern. Field order is `ts,lvl,tid,name,seq,file,line,func,msg`.
pub struct JsonFileSink {
    core: SinkCore,
    file: Mutex<Option<BufWriter<File>>>,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = BufWriter::new(OpenOptions::new().create(true).append(true).open(&path)?);
        Ok(Self {
            core: SinkCore::new(),
            file: Mutex::new(Some(file)),
        })
    }
}

impl Sink for JsonFileSink {
    fn log(&self, record: &Record) {
        if !self.core.enabled(record.level) {
            return;
        }
        let mut line = String::new();
        write_json_line(record, &mut line);
        line.push('\n');

        let mut file = self.file.lock();
        if let Some(file) = file.as_mut() {
            let _ = file.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }

    delegate_sink_core!();
}
