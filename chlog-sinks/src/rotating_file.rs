use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use chlog::{Record, Sink, SinkCore};

/// Appends rendered lines to `path`, rotating by size.
///
/// When the in-process byte count reaches `max_bytes`, the current file
/// becomes `path.1` after shifting `path.1 → path.2` and so on; the
/// oldest file, `path.N` for `max_files` N, is deleted. `path.1` is
/// always the newest rotated file.
pub struct RotatingFileSink {
    core: SinkCore,
    path: PathBuf,
    max_bytes: u64,
    max_files: usize,
    state: Mutex<FileState>,
}

struct FileState {
    file: Option<BufWriter<File>>,
    bytes: u64,
}

impl RotatingFileSink {
    pub fn new(path: impl Into<PathBuf>, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = open_append(&path)?;
        let bytes = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            core: SinkCore::new(),
            path,
            max_bytes,
            max_files: max_files.max(1),
            state: Mutex::new(FileState {
                file: Some(file),
                bytes,
            }),
        })
    }

    fn rotate(&self, state: &mut FileState) {
        if let Some(mut file) = state.file.take() {
            let _ = file.flush();
        }

        // Delete the oldest slot, then shift the rest up by one.
        let _ = fs::remove_file(indexed(&self.path, self.max_files));
        for i in (1..self.max_files).rev() {
            let _ = fs::rename(indexed(&self.path, i), indexed(&self.path, i + 1));
        }
        let _ = fs::rename(&self.path, indexed(&self.path, 1));

        state.file = open_append(&self.path).ok();
        state.bytes = 0;
    }
}

impl Sink for RotatingFileSink {
    fn log(&self, record: &Record) {
        if !self.core.enabled(record.level) {
            return;
        }
        let mut line = String::new();
        self.core.render(record, &mut line);
        line.push('\n');

        let mut state = self.state.lock();
        let Some(file) = state.file.as_mut() else {
            return;
        };
        if file.write_all(line.as_bytes()).is_err() {
            return;
        }
        state.bytes += line.len() as u64;
        if state.bytes >= self.max_bytes {
            self.rotate(&mut state);
        }
    }

    fn flush(&self) {
        if let Some(file) = self.state.lock().file.as_mut() {
            let _ = file.flush();
        }
    }

    delegate_sink_core!();
}

fn open_append(path: &Path) -> io::Result<BufWriter<File>> {
    Ok(BufWriter::new(
        OpenOptions::new().create(true).append(true).open(path)?,
    ))
}

fn indexed(path: &Path, i: usize) -> PathBuf {
    PathBuf::from(format!("{}.{}", path.display(), i))
}
