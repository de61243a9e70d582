use crate::index::Page;
use crate::level::Level;
use std::io::{self, Write};
use std::sync::mpsc::Receiver;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Build a logcat-style header line (no trailing newline)
pub fn header_line(level: Level, tag: &str, message: &str) -> String {
    format!(
        "2021-11-10 18:56:46.811 12401-13067/com.logtool.dev {}/{}: {}",
        level.letter(),
        tag,
        message
    )
}

/// A small log with every level, repeated tags and multi-line entries
pub fn sample_log() -> String {
    let mut out = String::new();
    let entries: [(Level, &str, &str, &[&str]); 10] = [
        (Level::Info, "System.out", "(HTTPLog)-Static: isSBSettingEnabled false", &[]),
        (Level::Debug, "Glide", "load started", &[]),
        (
            Level::Info,
            "Glide",
            "Root cause (1 of 1)",
            &[
                "     com.bumptech.glide.load.HttpException: Not Found, status code: 404",
                "     at com.bumptech.glide.integration.okhttp3.OkHttpStreamFetcher.onResponse(OkHttpStreamFetcher.java:71)",
                "     [...]",
            ],
        ),
        (Level::Verbose, "Choreographer", "Skipped 31 frames", &[]),
        (Level::Warn, "Network", "retrying request", &["    attempt 2 of 3"]),
        (Level::Error, "Network", "request failed", &[]),
        (Level::Assert, "Watchdog", "main thread blocked", &[""]),
        (Level::Info, "System.out", "done", &[]),
        (Level::Debug, "Glide", "cache hit", &["    key=abc"]),
        (Level::Error, "Glide", "decode failed", &[]),
    ];

    for (level, tag, message, continuation) in entries {
        out.push_str(&header_line(level, tag, message));
        out.push('\n');
        for line in continuation {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

/// Write `content` to a fresh temp file
pub fn write_temp(content: &str) -> io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Wait for the next page on a fetch receiver
pub fn next_page(rx: &Receiver<Page>) -> Page {
    rx.recv_timeout(Duration::from_secs(5))
        .expect("page should arrive")
}
