//! Record formatting for the append pipeline.
//!
//! Records are written in the same shape the indexer recognises as header
//! lines, so a file produced by the pipeline can be paged by the indexer.

use crate::level::Level;
use chrono::{DateTime, Local, TimeZone};
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Fallback when the executable name cannot be determined
const FALLBACK_PROCESS: &str = "logkit";

/// Identity stamped on every record written by one process
#[derive(Debug, Clone)]
pub struct RecordFormatter {
    pid: u32,
    process: String,
}

impl RecordFormatter {
    pub fn new(process: Option<&str>) -> Self {
        let process = match process {
            Some(name) => sanitize_process(name),
            None => default_process_name(),
        };
        Self {
            pid: std::process::id(),
            process,
        }
    }

    pub fn process(&self) -> &str {
        &self.process
    }

    /// Format a record stamped with the current local time
    pub fn format(&self, level: Level, tag: &str, message: &str) -> String {
        format_record(&Local::now(), self.pid, &self.process, level, tag, message)
    }
}

impl Default for RecordFormatter {
    fn default() -> Self {
        Self::new(None)
    }
}

/// `<timestamp> <pid>/<process> <L>/<tag>: <message>\n`
pub fn format_record<Tz>(
    at: &DateTime<Tz>,
    pid: u32,
    process: &str,
    level: Level,
    tag: &str,
    message: &str,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut record = format!(
        "{} {}/{} {}/{}: {}",
        at.format(TIMESTAMP_FORMAT),
        pid,
        process,
        level.letter(),
        sanitize_tag(tag),
        message
    );
    if !record.ends_with('\n') {
        record.push('\n');
    }
    record
}

/// Executable stem of the running process
pub fn default_process_name() -> String {
    std::env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::file_stem)
        .and_then(|stem| stem.to_str())
        .map(sanitize_process)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_PROCESS.to_string())
}

/// Process names are restricted to word characters and dots
fn sanitize_process(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '.' { c } else { '_' })
        .collect()
}

/// Tags end at the first `:` and may not span lines
fn sanitize_tag(tag: &str) -> String {
    let tag = tag.trim();
    if tag.is_empty() {
        return "-".to_string();
    }
    tag.replace("::", ".")
        .chars()
        .map(|c| match c {
            ':' => '.',
            '\n' | '\r' => ' ',
            c => c,
        })
        .collect()
}
