//! Pattern renderer: maps a [`Record`] plus a template to an output line.
//!
//! Templates are parsed once into a segment list, so rendering a record
//! is a single left-to-right pass with no re-scanning and no recursion
//! into expanded values. The recognized tokens are `{ts}`, `{date}`,
//! `{time}`, `{ms}`, `{lvl}`, `{tid}`, `{name}`, `{msg}`, `{file}`,
//! `{line}` and `{func}`; anything else (including unknown `{…}`
//! sequences) is kept as literal text.
//!
//! The exact template `"{json}"` selects structured output instead: one
//! self-contained JSON object with fixed field order
//! `ts,lvl,tid,name,seq,file,line,func,msg`.

use std::fmt::Write;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::record::Record;

/// A parsed output template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    kind: Kind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Kind {
    Json,
    Template(Vec<Segment>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Ts,
    Date,
    Time,
    Ms,
    Lvl,
    Tid,
    Name,
    Msg,
    File,
    Line,
    Func,
}

impl Pattern {
    /// Parses a template. Never fails: unrecognized `{…}` sequences and
    /// unbalanced braces stay literal.
    pub fn parse(template: &str) -> Self {
        if template == "{json}" {
            return Self { kind: Kind::Json };
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            let (before, from_open) = rest.split_at(open);
            literal.push_str(before);

            let Some(close) = from_open.find('}') else {
                literal.push_str(from_open);
                rest = "";
                break;
            };
            match Segment::for_token(&from_open[..close + 1]) {
                Some(segment) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                    rest = &from_open[close + 1..];
                }
                None => {
                    // Not a token; keep the brace and rescan right after
                    // it, so later tokens still expand.
                    literal.push('{');
                    rest = &from_open[1..];
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            kind: Kind::Template(segments),
        }
    }

    /// Whether this is the structured `{json}` pattern.
    pub fn is_json(&self) -> bool {
        matches!(self.kind, Kind::Json)
    }

    /// Whether the template is exactly `{msg}`, i.e. renders no record
    /// metadata at all.
    pub fn is_message_only(&self) -> bool {
        matches!(&self.kind, Kind::Template(segments) if segments == &[Segment::Msg])
    }

    /// Renders `record` to the end of `out`, without a trailing newline.
    pub fn render(&self, record: &Record, out: &mut String) {
        let segments = match &self.kind {
            Kind::Json => return write_json_line(record, out),
            Kind::Template(segments) => segments,
        };

        for segment in segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Ts => format_timestamp(record.ts, out),
                Segment::Date => {
                    let dt: DateTime<Local> = record.ts.into();
                    let _ = write!(out, "{}", dt.format("%Y-%m-%d"));
                }
                Segment::Time => {
                    let dt: DateTime<Local> = record.ts.into();
                    let _ = write!(out, "{}", dt.format("%H:%M:%S"));
                }
                Segment::Ms => {
                    let dt: DateTime<Local> = record.ts.into();
                    let _ = write!(out, "{:03}", dt.timestamp_subsec_millis());
                }
                Segment::Lvl => out.push_str(record.level.as_str()),
                Segment::Tid => {
                    let _ = write!(out, "{}", record.thread_id);
                }
                Segment::Name => out.push_str(&record.name),
                Segment::Msg => out.push_str(&record.payload),
                Segment::File => out.push_str(record.loc.file),
                Segment::Line => {
                    let _ = write!(out, "{}", record.loc.line);
                }
                Segment::Func => out.push_str(record.loc.func),
            }
        }
    }
}

impl Segment {
    fn for_token(token: &str) -> Option<Self> {
        Some(match token {
            "{ts}" => Self::Ts,
            "{date}" => Self::Date,
            "{time}" => Self::Time,
            "{ms}" => Self::Ms,
            "{lvl}" => Self::Lvl,
            "{tid}" => Self::Tid,
            "{name}" => Self::Name,
            "{msg}" => Self::Msg,
            "{file}" => Self::File,
            "{line}" => Self::Line,
            "{func}" => Self::Func,
            _ => return None,
        })
    }
}

/// Renders `ts` in local time as `YYYY-MM-DD HH:MM:SS.mmm`.
pub fn format_timestamp(ts: SystemTime, out: &mut String) {
    let dt: DateTime<Local> = ts.into();
    let _ = write!(out, "{}", dt.format("%Y-%m-%d %H:%M:%S%.3f"));
}

/// Local date of `ts` as `YYYY-MM-DD`.
pub fn date_string(ts: SystemTime) -> String {
    let dt: DateTime<Local> = ts.into();
    dt.format("%Y-%m-%d").to_string()
}

/// Writes `record` as one JSON object (no trailing newline) with field
/// order `ts,lvl,tid,name,seq,file,line,func,msg`. `seq` and `line` are
/// integers, everything else is an escaped string.
pub fn write_json_line(record: &Record, out: &mut String) {
    out.push_str("{\"ts\":\"");
    format_timestamp(record.ts, out);
    out.push_str("\",\"lvl\":\"");
    out.push_str(record.level.as_str());
    out.push_str("\",\"tid\":\"");
    let _ = write!(out, "{}", record.thread_id);
    out.push_str("\",\"name\":\"");
    escape_json_into(&record.name, out);
    let _ = write!(out, "\",\"seq\":{},\"file\":\"", record.seq);
    escape_json_into(record.loc.file, out);
    let _ = write!(out, "\",\"line\":{},\"func\":\"", record.loc.line);
    escape_json_into(record.loc.func, out);
    out.push_str("\",\"msg\":\"");
    escape_json_into(&record.payload, out);
    out.push_str("\"}");
}

fn escape_json_into(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
}
