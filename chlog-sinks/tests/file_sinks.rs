use std::fs;
use std::path::Path;
use std::time::SystemTime;

use tempfile::tempdir;

use chlog::pattern::date_string;
use chlog::{Level, Record, Sink, SourceLoc};
use chlog_sinks::{DailyFileSink, JsonFileSink, RotatingFileSink};

fn record(seq: u64, payload: impl Into<String>) -> Record {
    Record {
        ts: SystemTime::now(),
        level: Level::Info,
        thread_id: 7,
        name: "files".to_string(),
        payload: payload.into(),
        seq,
        loc: SourceLoc::new("src/io.rs", 42, "app::io"),
    }
}

#[test]
fn rotation_keeps_bounded_files_with_newest_as_dot_one() {
    const MAX_BYTES: u64 = 1024;
    const MAX_FILES: usize = 3;

    let dir = tempdir().unwrap();
    let base = dir.path().join("app.log");
    let sink = RotatingFileSink::new(&base, MAX_BYTES, MAX_FILES).unwrap();
    sink.set_pattern("{msg}");

    // ~101 bytes per line, ~10 KiB total: several full rotations.
    let mut last_line = String::new();
    for i in 0..100 {
        last_line = format!("line {i:03} {}", "x".repeat(91));
        sink.log(&record(i, last_line.clone()));
    }
    sink.flush();

    assert!(base.exists());
    for i in 1..=MAX_FILES {
        // After 100 lines every rotation slot is occupied.
        assert!(indexed(&base, i).exists(), "missing rotation {i}");
    }
    assert!(!indexed(&base, MAX_FILES + 1).exists());

    // Size bound: each file holds at most max_bytes plus the line that
    // tripped the rotation.
    let mut on_disk = 0;
    for path in std::iter::once(base.clone()).chain((1..=MAX_FILES).map(|i| indexed(&base, i))) {
        let len = fs::metadata(&path).unwrap().len();
        assert!(len <= MAX_BYTES + 102, "{} too large: {len}", path.display());
        on_disk += len;
    }
    assert!(on_disk <= (MAX_FILES as u64 + 1) * MAX_BYTES + 102);

    // `.1` is the most recently rotated file: its content is newer than
    // `.2`'s.
    let newest = first_line_index(&indexed(&base, 1));
    let older = first_line_index(&indexed(&base, 2));
    assert!(newest > older, "rotation order wrong: {newest} <= {older}");

    // The active file carries the tail of the stream.
    let base_content = fs::read_to_string(&base).unwrap();
    assert_eq!(base_content.lines().last().unwrap(), last_line);
}

#[test]
fn rotation_resumes_byte_count_from_existing_file() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("resume.log");
    fs::write(&base, "already here\n").unwrap();

    let sink = RotatingFileSink::new(&base, 1 << 20, 3).unwrap();
    sink.set_pattern("{msg}");
    sink.log(&record(0, "appended"));
    sink.flush();

    let content = fs::read_to_string(&base).unwrap();
    assert_eq!(content, "already here\nappended\n");
}

#[test]
fn daily_sink_names_file_after_local_date() {
    let dir = tempdir().unwrap();
    let sink = DailyFileSink::new(dir.path()).unwrap();
    sink.set_pattern("{msg}");

    let before = date_string(SystemTime::now());
    sink.log(&record(0, "daily hello"));
    sink.flush();
    let after = date_string(SystemTime::now());

    // Tolerate a midnight rollover between the two samples.
    let path = [&before, &after]
        .iter()
        .map(|day| dir.path().join(format!("{day}.log")))
        .find(|p| p.exists())
        .expect("expected a dated log file");
    assert!(fs::read_to_string(path).unwrap().contains("daily hello"));
}

#[test]
fn json_sink_emits_one_parseable_object_per_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.json");
    let sink = JsonFileSink::new(&path).unwrap();

    sink.log(&record(0, "plain"));
    sink.log(&record(1, "escaped \"quotes\" and\nnewline"));
    sink.flush();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    for (i, line) in lines.iter().enumerate() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["seq"], i as u64);
        assert_eq!(value["lvl"], "INFO");
        assert_eq!(value["tid"], "7");
        assert_eq!(value["name"], "files");
        assert_eq!(value["file"], "src/io.rs");
        assert_eq!(value["line"], 42);
        assert_eq!(value["func"], "app::io");
    }
    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["msg"], "escaped \"quotes\" and\nnewline");
}

#[test]
fn sinks_honor_their_level_threshold() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("filtered.log");
    let sink = RotatingFileSink::new(&path, 1 << 20, 1).unwrap();
    sink.set_pattern("{msg}");
    sink.set_level(chlog::LevelFilter::Error);

    sink.log(&record(0, "dropped info"));
    let mut error_record = record(1, "kept error");
    error_record.level = Level::Error;
    sink.log(&error_record);
    sink.flush();

    assert_eq!(fs::read_to_string(&path).unwrap(), "kept error\n");
}

fn indexed(base: &Path, i: usize) -> std::path::PathBuf {
    std::path::PathBuf::from(format!("{}.{}", base.display(), i))
}

fn first_line_index(path: &Path) -> u64 {
    let content = fs::read_to_string(path).unwrap();
    let first = content.lines().next().unwrap();
    first
        .split_whitespace()
        .nth(1)
        .unwrap()
        .parse()
        .unwrap()
}
