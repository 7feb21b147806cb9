use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::SystemTime;

use parking_lot::Mutex;

use chlog::pattern::date_string;
use chlog::{Record, Sink, SinkCore};

/// One file per local date (`YYYY-MM-DD.log`) under a directory,
/// rolling over on the first record after the date changes.
pub struct DailyFileSink {
    core: SinkCore,
    dir: PathBuf,
    state: Mutex<DayState>,
}

struct DayState {
    day: String,
    file: Option<BufWriter<File>>,
}

impl DailyFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let day = date_string(SystemTime::now());
        let file = open_day(&dir, &day)?;
        Ok(Self {
            core: SinkCore::new(),
            dir,
            state: Mutex::new(DayState {
                day,
                file: Some(file),
            }),
        })
    }
}

impl Sink for DailyFileSink {
    fn log(&self, record: &Record) {
        if !self.core.enabled(record.level) {
            return;
        }
        let day = date_string(record.ts);

        let mut state = self.state.lock();
        if day != state.day {
            if let Some(mut file) = state.file.take() {
                let _ = file.flush();
            }
            state.file = open_day(&self.dir, &day).ok();
            state.day = day;
        }
        let Some(file) = state.file.as_mut() else {
            return;
        };
        let mut line = String::new();
        self.core.render(record, &mut line);
        line.push('\n');
        let _ = file.write_all(line.as_bytes());
    }

    fn flush(&self) {
        if let Some(file) = self.state.lock().file.as_mut() {
            let _ = file.flush();
        }
    }

    delegate_sink_core!();
}

fn open_day(dir: &std::path::Path, day: &str) -> io::Result<BufWriter<File>> {
    Ok(BufWriter::new(
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("{day}.log")))?,
    ))
}
