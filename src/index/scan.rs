//! Page scanning: turn lines from a [`BufferedReader`] into entry ranges.
//!
//! An entry starts at a header line and runs up to the start of the next
//! header line (or the end of the stream). Lines in between are
//! continuation lines and belong to the open entry. Entries rejected by the
//! filter are still walked so the cursor and the grouping stay in step.

use super::filter::FilterCriteria;
use super::header::parse_header;
use super::range::LogRange;
use crate::reader::{BufferedReader, ByteSource};
use std::io;

/// Result of one scan
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Matching entries in stream order
    pub ranges: Vec<LogRange>,
    /// Set when the scan stopped because an offset no longer fits a `LogRange`
    pub overflowed: bool,
}

/// Collect up to `count` matching entries starting at the reader's cursor.
///
/// On return the cursor sits right after the last line that belongs to the
/// page. When the page fills up, the header that would open the next entry
/// is left unread so the following scan starts on it.
pub fn scan_page<S: ByteSource>(
    reader: &mut BufferedReader<S>,
    filter: &FilterCriteria,
    count: usize,
) -> io::Result<ScanOutcome> {
    let mut outcome = ScanOutcome::default();
    if count == 0 {
        return Ok(outcome);
    }

    // Start offset of the matching entry currently being extended
    let mut open: Option<u64> = None;

    loop {
        let line_start = reader.position();
        let Some(line) = reader.read_line()? else {
            if let Some(start) = open.take() {
                push(&mut outcome, start, line_start);
            }
            break;
        };

        let Some(header) = parse_header(&line) else {
            continue;
        };

        if let Some(start) = open.take() {
            if !push(&mut outcome, start, line_start) {
                reader.seek(start);
                break;
            }
        }

        if outcome.ranges.len() >= count {
            reader.seek(line_start);
            break;
        }

        if filter.matches(&header) {
            open = Some(line_start);
        }
    }

    Ok(outcome)
}

/// Record a closed entry. Returns false if it does not fit in 32-bit offsets.
fn push(outcome: &mut ScanOutcome, start: u64, end: u64) -> bool {
    match LogRange::new(start, end) {
        Ok(range) => {
            outcome.ranges.push(range);
            true
        }
        Err(e) => {
            tracing::warn!(%e, "stopping scan, stream exceeds addressable size");
            outcome.overflowed = true;
            false
        }
    }
}
