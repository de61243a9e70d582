//! `logkit page`: print matching entries, optionally following the file.
//!
//! One reader feeds the indexer worker; a second, independent reader
//! materializes the text of each returned range.

use super::PageArgs;
use crate::signal::Shutdown;
use crate::watcher::FileWatcher;
use anyhow::{Context, Result};
use logkit::config::IndexerConfig;
use logkit::index::LineIndexer;
use logkit::reader::BufferedReader;
use std::io::Write;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

/// How long to wait for a page before checking signals and the watcher
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Returns the number of entries printed.
pub fn run_page<W: Write>(
    args: &PageArgs,
    config: &IndexerConfig,
    out: &mut W,
    shutdown: &Shutdown,
) -> Result<u64> {
    let open = || {
        BufferedReader::open(&args.file, config.buffer_capacity)
            .with_context(|| format!("Failed to open log file: {}", args.file.display()))
    };
    let indexing = open()?;
    let mut text = open()?;

    let options = config.options(args.tag.clone(), args.level);
    // Nothing here reacts to state changes; dropping the receiver discards them
    let (indexer, _) = LineIndexer::spawn(indexing, options).context("Failed to start indexer")?;

    let watcher = if args.follow {
        Some(FileWatcher::new(&args.file)?)
    } else {
        None
    };

    let initial = args.page_size.unwrap_or(config.initial_page).max(1);
    let page_size = args.page_size.unwrap_or(config.page_size).max(1);

    let mut pages = indexer.fetch_initial(initial);
    let mut printed = 0u64;

    while !shutdown.is_requested() {
        match pages.recv_timeout(POLL_INTERVAL) {
            Ok(page) => {
                for range in &page.ranges {
                    let Some(entry) = text.read_range(*range)? else {
                        continue;
                    };
                    out.write_all(entry.as_bytes())?;
                    if !entry.ends_with('\n') {
                        out.write_all(b"\n")?;
                    }
                    printed += 1;
                }
                out.flush()?;

                if page.exhausted {
                    tracing::warn!(file = %args.file.display(), "log exceeds the indexable size, stopping");
                    break;
                }

                if page.pending {
                    // Parked; the next page comes on the same channel
                    if watcher.is_none() {
                        break;
                    }
                } else if page.ranges.is_empty() && watcher.is_none() {
                    break;
                } else {
                    pages = indexer.fetch_more(page_size);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(watcher) = &watcher {
            if watcher.drain() {
                indexer.invalidate();
            }
        }
    }

    indexer.close();
    Ok(printed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logkit::level::Level;
    use std::fs::{self, OpenOptions};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Instant;
    use tempfile::TempDir;

    const LOG: &str = "\
2021-11-10 18:56:46.811 1-2/app I/Net: connected
2021-11-10 18:56:46.812 1-2/app D/Net: handshake
2021-11-10 18:56:46.813 1-2/app E/Db: query failed
    at Db.query(Db.java:10)
2021-11-10 18:56:46.814 1-2/app W/Net: slow response
";

    fn args(file: PathBuf) -> PageArgs {
        PageArgs {
            file,
            tag: None,
            level: None,
            page_size: Some(1),
            follow: false,
        }
    }

    fn config() -> IndexerConfig {
        IndexerConfig {
            debounce: Duration::from_millis(10),
            ..IndexerConfig::default()
        }
    }

    fn write_log(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("app.log");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_prints_entries_at_or_above_level() {
        let dir = TempDir::new().unwrap();
        let path = write_log(&dir, LOG);
        let mut out = Vec::new();

        let printed = run_page(&args(path), &config(), &mut out, &Shutdown::new()).unwrap();

        assert_eq!(printed, 3);
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("handshake"));
        assert!(text.contains("E/Db: query failed\n    at Db.query(Db.java:10)\n"));
        assert!(text.ends_with("W/Net: slow response\n"));
    }

    #[test]
    fn test_tag_and_level_filters() {
        let dir = TempDir::new().unwrap();
        let path = write_log(&dir, LOG);
        let mut page_args = args(path);
        page_args.tag = Some("Net".into());
        page_args.level = Some(Level::Verbose);
        let mut out = Vec::new();

        let printed = run_page(&page_args, &config(), &mut out, &Shutdown::new()).unwrap();

        assert_eq!(printed, 3);
        assert!(!String::from_utf8(out).unwrap().contains("Db"));
    }

    #[test]
    fn test_empty_file_prints_nothing() {
        let dir = TempDir::new().unwrap();
        let path = write_log(&dir, "");
        let mut out = Vec::new();

        let printed = run_page(&args(path), &config(), &mut out, &Shutdown::new()).unwrap();

        assert_eq!(printed, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        let result = run_page(
            &args(dir.path().join("absent.log")),
            &config(),
            &mut out,
            &Shutdown::new(),
        );
        assert!(result.is_err());
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_follow_prints_appended_entries() {
        let dir = TempDir::new().unwrap();
        let path = write_log(&dir, LOG);
        let mut page_args = args(path.clone());
        page_args.follow = true;

        let shutdown = Shutdown::new();
        let buf = SharedBuf::default();
        let worker = {
            let shutdown = shutdown.clone();
            let mut buf = buf.clone();
            thread::spawn(move || run_page(&page_args, &config(), &mut buf, &shutdown))
        };

        let wait_for = |needle: &str| {
            let deadline = Instant::now() + Duration::from_secs(5);
            while !buf.text().contains(needle) && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(20));
            }
            buf.text().contains(needle)
        };

        assert!(wait_for("slow response"));

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "2021-11-10 18:56:47.000 1-2/app E/Net: connection reset").unwrap();
        file.flush().unwrap();
        drop(file);

        assert!(wait_for("connection reset"));

        shutdown.request();
        let printed = worker.join().unwrap().unwrap();
        assert_eq!(printed, 4);
    }
}
