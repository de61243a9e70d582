//! Live-tailing pagination over a growing log file.
//!
//! A [`LineIndexer`] owns one [`BufferedReader`] and answers fetch requests
//! with pages of [`LogRange`]s. When a fetch arrives while every byte has
//! already been read, the request is parked and an empty pending page is
//! sent right away. A later `invalidate` (typically after the writer
//! flushed) re-issues the parked request once the debounce delay passes,
//! so a burst of flushes costs a single re-scan.
//!
//! [`LineIndexer::spawn`] moves the indexer onto a background worker that
//! is driven by [`IndexCommand`]s through an [`IndexerHandle`]. All scans
//! and state bookkeeping happen on that one thread, so a parked request can
//! never be consumed twice.

use super::filter::FilterCriteria;
use super::range::LogRange;
use super::scan::scan_page;
use crate::level::Level;
use crate::reader::{BufferedReader, ByteSource};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Delay between an invalidate and the re-issued fetch
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Where the indexer is in its fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    Ready,
    InitialFetching,
    AppendFetching,
    /// An initial fetch found nothing to read and is parked
    PendingInitial,
    /// An append fetch found nothing to read and is parked
    PendingAppend,
    Done,
    /// Filter changed; the owner should restart pagination
    Invalid,
}

impl FetchState {
    pub fn is_pending(self) -> bool {
        matches!(self, FetchState::PendingInitial | FetchState::PendingAppend)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// First page after (re)starting pagination
    Initial,
    /// Following pages
    Append,
}

impl FetchKind {
    fn fetching_state(self) -> FetchState {
        match self {
            FetchKind::Initial => FetchState::InitialFetching,
            FetchKind::Append => FetchState::AppendFetching,
        }
    }

    fn pending_state(self) -> FetchState {
        match self {
            FetchKind::Initial => FetchState::PendingInitial,
            FetchKind::Append => FetchState::PendingAppend,
        }
    }
}

/// One answer to a fetch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub kind: FetchKind,
    /// Matching entries, in stream order
    pub ranges: Vec<LogRange>,
    /// No data was available; the request is parked and a second page
    /// will follow on the same channel once new data is indexed
    pub pending: bool,
    /// Number of filter changes applied when this page was computed
    pub generation: u64,
    /// The next entry lies past the addressable offset range; further
    /// fetches return nothing until the filter changes
    pub exhausted: bool,
}

/// Notifications for the indexer's owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEvent {
    State(FetchState),
    /// Pagination must start over from the first page
    Restart { generation: u64 },
}

/// Requests understood by the indexer worker
#[derive(Debug)]
pub enum IndexCommand {
    Fetch {
        kind: FetchKind,
        count: usize,
        sink: Sender<Page>,
    },
    Invalidate,
    SetKeyword(Option<String>),
    SetLevel(Level),
    Close,
}

/// Tunables for a [`LineIndexer`]
#[derive(Debug, Clone)]
pub struct IndexerOptions {
    pub debounce: Duration,
    pub filter: FilterCriteria,
}

impl Default for IndexerOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            filter: FilterCriteria::default(),
        }
    }
}

/// A fetch parked until new data shows up
#[derive(Debug)]
struct PendingRequest {
    kind: FetchKind,
    count: usize,
    sink: Sender<Page>,
}

pub struct LineIndexer<S> {
    reader: BufferedReader<S>,
    filter: FilterCriteria,
    state: FetchState,
    /// Mirror of `state` readable from other threads
    observed: Arc<Mutex<FetchState>>,
    pending: Option<PendingRequest>,
    /// When the parked request should be re-issued
    refetch_at: Option<Instant>,
    debounce: Duration,
    generation: u64,
    /// Set when a scan hit the offset limit
    exhausted: bool,
    events: Sender<IndexEvent>,
}

impl<S: ByteSource> LineIndexer<S> {
    pub fn new(reader: BufferedReader<S>, options: IndexerOptions) -> (Self, Receiver<IndexEvent>) {
        let (events, rx) = channel();
        let indexer = Self {
            reader,
            filter: options.filter,
            state: FetchState::Ready,
            observed: Arc::new(Mutex::new(FetchState::Ready)),
            pending: None,
            refetch_at: None,
            debounce: options.debounce,
            generation: 0,
            exhausted: false,
            events,
        };
        (indexer, rx)
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn filter(&self) -> &FilterCriteria {
        &self.filter
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Deadline of the scheduled re-fetch, if one is armed
    pub fn refetch_deadline(&self) -> Option<Instant> {
        self.refetch_at
    }

    pub fn reader(&self) -> &BufferedReader<S> {
        &self.reader
    }

    fn set_state(&mut self, state: FetchState) {
        trace!(from = ?self.state, to = ?state, "fetch state");
        self.state = state;
        *self.observed.lock().unwrap_or_else(PoisonError::into_inner) = state;
        let _ = self.events.send(IndexEvent::State(state));
    }

    fn send_page(&self, sink: &Sender<Page>, kind: FetchKind, ranges: Vec<LogRange>, pending: bool) {
        let page = Page {
            kind,
            ranges,
            pending,
            generation: self.generation,
            exhausted: self.exhausted,
        };
        // The requester may have lost interest
        let _ = sink.send(page);
    }

    /// Scan for up to `count` entries and deliver them on `sink`.
    ///
    /// With nothing left to read the request is parked instead and an
    /// empty pending page is delivered.
    pub fn fetch(&mut self, kind: FetchKind, count: usize, sink: Sender<Page>) {
        if !self.reader.is_open() || self.exhausted {
            self.send_page(&sink, kind, Vec::new(), false);
            return;
        }

        match self.reader.is_at_end() {
            Ok(true) => {
                debug!(?kind, count, position = self.reader.position(), "no unread data, parking fetch");
                self.set_state(kind.pending_state());
                self.send_page(&sink, kind, Vec::new(), true);
                self.pending = Some(PendingRequest { kind, count, sink });
                return;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(%e, "could not stat log stream");
                self.send_page(&sink, kind, Vec::new(), false);
                self.set_state(FetchState::Done);
                return;
            }
        }

        // A fresh fetch supersedes whatever was parked
        self.pending = None;
        self.refetch_at = None;
        self.set_state(kind.fetching_state());

        let ranges = match scan_page(&mut self.reader, &self.filter, count) {
            Ok(outcome) => {
                self.exhausted = outcome.overflowed;
                outcome.ranges
            }
            Err(e) => {
                warn!(%e, "scan failed");
                Vec::new()
            }
        };

        debug!(?kind, found = ranges.len(), position = self.reader.position(), "page scanned");
        self.send_page(&sink, kind, ranges, false);
        self.set_state(FetchState::Done);
    }

    /// React to "the stream may have changed".
    ///
    /// Pending: (re)arm the debounced re-fetch. Invalid: rewind and tell
    /// the owner to restart. Any other state: nothing to do.
    pub fn invalidate(&mut self) {
        match self.state {
            FetchState::PendingInitial | FetchState::PendingAppend => {
                self.refetch_at = Some(Instant::now() + self.debounce);
                trace!(debounce = ?self.debounce, "re-fetch scheduled");
            }
            FetchState::Invalid => {
                self.reader.seek(0);
                self.pending = None;
                self.refetch_at = None;
                self.set_state(FetchState::Ready);
                let _ = self.events.send(IndexEvent::Restart {
                    generation: self.generation,
                });
            }
            state => trace!(?state, "invalidate ignored"),
        }
    }

    /// Re-issue the parked request. Called when the debounce deadline passes.
    pub fn run_due_refetch(&mut self) {
        self.refetch_at = None;
        if !self.state.is_pending() {
            return;
        }
        if let Some(request) = self.pending.take() {
            self.fetch(request.kind, request.count, request.sink);
        }
    }

    pub fn set_keyword(&mut self, keyword: Option<String>) {
        self.filter.keyword = keyword;
        self.filter_changed();
    }

    pub fn set_level(&mut self, level: Level) {
        self.filter.min_level = level;
        self.filter_changed();
    }

    fn filter_changed(&mut self) {
        self.generation += 1;
        self.exhausted = false;
        self.pending = None;
        self.refetch_at = None;
        self.reader.seek(0);
        debug!(filter = ?self.filter, generation = self.generation, "filter changed");
        self.set_state(FetchState::Invalid);
    }

    pub fn close(&mut self) {
        self.pending = None;
        self.refetch_at = None;
        self.reader.close();
    }

    /// Apply one command. Returns false once the indexer is closed.
    pub fn handle(&mut self, command: IndexCommand) -> bool {
        match command {
            IndexCommand::Fetch { kind, count, sink } => self.fetch(kind, count, sink),
            IndexCommand::Invalidate => self.invalidate(),
            IndexCommand::SetKeyword(keyword) => self.set_keyword(keyword),
            IndexCommand::SetLevel(level) => self.set_level(level),
            IndexCommand::Close => {
                self.close();
                return false;
            }
        }
        true
    }

    /// Worker loop: serve commands and fire the debounce deadline
    fn run(mut self, commands: Receiver<IndexCommand>) {
        loop {
            let command = match self.refetch_at {
                Some(deadline) => {
                    let now = Instant::now();
                    if deadline <= now {
                        self.run_due_refetch();
                        continue;
                    }
                    match commands.recv_timeout(deadline - now) {
                        Ok(command) => command,
                        Err(RecvTimeoutError::Timeout) => {
                            self.run_due_refetch();
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match commands.recv() {
                    Ok(command) => command,
                    Err(_) => break,
                },
            };

            if !self.handle(command) {
                break;
            }
        }

        self.close();
        debug!("indexer worker stopped");
    }
}

impl<S: ByteSource + 'static> LineIndexer<S> {
    /// Move the indexer onto its own worker thread
    pub fn spawn(
        reader: BufferedReader<S>,
        options: IndexerOptions,
    ) -> io::Result<(IndexerHandle, Receiver<IndexEvent>)> {
        let (indexer, events) = Self::new(reader, options);
        let (tx, rx) = channel();

        let handle = IndexerHandle {
            commands: tx,
            generation: Arc::new(AtomicU64::new(indexer.generation)),
            state: Arc::clone(&indexer.observed),
        };

        thread::Builder::new()
            .name("logkit-indexer".into())
            .spawn(move || indexer.run(rx))?;

        Ok((handle, events))
    }
}

/// Cloneable front end to a spawned [`LineIndexer`].
///
/// None of the calls block; pages arrive on the returned receivers.
#[derive(Clone)]
pub struct IndexerHandle {
    commands: Sender<IndexCommand>,
    /// Filter changes requested so far
    generation: Arc<AtomicU64>,
    state: Arc<Mutex<FetchState>>,
}

impl IndexerHandle {
    fn send(&self, command: IndexCommand) {
        if self.commands.send(command).is_err() {
            trace!("indexer worker is gone");
        }
    }

    fn fetch(&self, kind: FetchKind, count: usize) -> Receiver<Page> {
        let (sink, rx) = channel();
        self.send(IndexCommand::Fetch { kind, count, sink });
        rx
    }

    pub fn fetch_initial(&self, count: usize) -> Receiver<Page> {
        self.fetch(FetchKind::Initial, count)
    }

    pub fn fetch_more(&self, count: usize) -> Receiver<Page> {
        self.fetch(FetchKind::Append, count)
    }

    pub fn invalidate(&self) {
        self.send(IndexCommand::Invalidate);
    }

    pub fn set_filter_keyword(&self, keyword: Option<String>) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.send(IndexCommand::SetKeyword(keyword));
    }

    pub fn set_filter_level(&self, level: Level) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.send(IndexCommand::SetLevel(level));
    }

    pub fn close(&self) {
        self.send(IndexCommand::Close);
    }

    /// Last state published by the worker
    pub fn state(&self) -> FetchState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// True if the page was computed under filter criteria that have since
    /// been replaced
    pub fn is_stale(&self, page: &Page) -> bool {
        page.generation != self.generation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{header_line, next_page, sample_log, write_temp};
    use std::fs::OpenOptions;
    use std::io::{Cursor, Write};
    use std::path::Path;

    fn options(debounce_ms: u64, min_level: Level) -> IndexerOptions {
        IndexerOptions {
            debounce: Duration::from_millis(debounce_ms),
            filter: FilterCriteria::new(None, min_level),
        }
    }

    fn append(path: &Path, text: &str) {
        let mut file = OpenOptions::new().append(true).open(path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file.flush().unwrap();
    }

    fn wait_for_event(events: &Receiver<IndexEvent>, wanted: &IndexEvent) {
        loop {
            let event = events
                .recv_timeout(Duration::from_secs(5))
                .expect("event should arrive");
            if &event == wanted {
                return;
            }
        }
    }

    #[test]
    fn test_fetch_initial_then_more() {
        let data = sample_log();
        let reader = BufferedReader::new(Cursor::new(data.into_bytes()), 16);
        let (mut indexer, _events) = LineIndexer::new(reader, options(10, Level::Verbose));

        let (tx, rx) = channel();
        indexer.fetch(FetchKind::Initial, 4, tx.clone());
        let first = rx.try_recv().unwrap();
        assert_eq!(first.kind, FetchKind::Initial);
        assert_eq!(first.ranges.len(), 4);
        assert!(!first.pending);
        assert_eq!(indexer.state(), FetchState::Done);

        indexer.fetch(FetchKind::Append, 100, tx);
        let second = rx.try_recv().unwrap();
        assert_eq!(second.kind, FetchKind::Append);
        assert_eq!(second.ranges.len(), 6);
        assert_eq!(second.ranges[0].start(), first.ranges[3].end());
    }

    #[test]
    fn test_fetch_at_end_parks_and_refetches_once() {
        let file = write_temp("").unwrap();
        let reader = BufferedReader::open(file.path(), 8).unwrap();
        let (mut indexer, events) = LineIndexer::new(reader, options(0, Level::Info));

        let (tx, rx) = channel();
        indexer.fetch(FetchKind::Initial, 10, tx);

        let parked = rx.try_recv().unwrap();
        assert!(parked.pending);
        assert!(parked.ranges.is_empty());
        assert_eq!(indexer.state(), FetchState::PendingInitial);
        assert_eq!(
            events.try_recv().unwrap(),
            IndexEvent::State(FetchState::PendingInitial)
        );

        append(file.path(), &format!("{}\n", header_line(Level::Info, "TagA", "hello")));
        indexer.invalidate();
        assert!(indexer.refetch_deadline().is_some());

        indexer.run_due_refetch();
        let page = rx.try_recv().unwrap();
        assert!(!page.pending);
        assert_eq!(page.ranges.len(), 1);
        assert_eq!(indexer.state(), FetchState::Done);

        // The parked request was used up
        indexer.run_due_refetch();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_invalidate_outside_pending_is_ignored() {
        let reader = BufferedReader::new(Cursor::new(sample_log().into_bytes()), 64);
        let (mut indexer, _events) = LineIndexer::new(reader, options(0, Level::Info));

        indexer.invalidate();
        assert_eq!(indexer.state(), FetchState::Ready);
        assert!(indexer.refetch_deadline().is_none());

        let (tx, _rx) = channel();
        indexer.fetch(FetchKind::Initial, 2, tx);
        let position = indexer.reader().position();
        indexer.invalidate();
        assert_eq!(indexer.state(), FetchState::Done);
        assert_eq!(indexer.reader().position(), position);
    }

    #[test]
    fn test_filter_change_rewinds_and_restarts() {
        let reader = BufferedReader::new(Cursor::new(sample_log().into_bytes()), 64);
        let (mut indexer, events) = LineIndexer::new(reader, options(0, Level::Verbose));

        let (tx, rx) = channel();
        indexer.fetch(FetchKind::Initial, 3, tx.clone());
        assert_eq!(rx.try_recv().unwrap().generation, 0);
        assert!(indexer.reader().position() > 0);

        indexer.set_level(Level::Error);
        assert_eq!(indexer.state(), FetchState::Invalid);
        assert_eq!(indexer.reader().position(), 0);
        assert_eq!(indexer.generation(), 1);

        indexer.invalidate();
        assert_eq!(indexer.state(), FetchState::Ready);
        assert!(events
            .try_iter()
            .any(|e| e == IndexEvent::Restart { generation: 1 }));

        indexer.fetch(FetchKind::Initial, 100, tx);
        let page = rx.try_recv().unwrap();
        assert_eq!(page.generation, 1);
        // Error, Assert, Error
        assert_eq!(page.ranges.len(), 3);
    }

    #[test]
    fn test_filter_change_discards_parked_request() {
        let file = write_temp("").unwrap();
        let reader = BufferedReader::open(file.path(), 8).unwrap();
        let (mut indexer, _events) = LineIndexer::new(reader, options(0, Level::Info));

        let (tx, rx) = channel();
        indexer.fetch(FetchKind::Append, 10, tx);
        assert!(rx.try_recv().unwrap().pending);

        indexer.set_keyword(Some("TagA".into()));
        append(file.path(), &format!("{}\n", header_line(Level::Info, "TagA", "hi")));
        indexer.invalidate();
        indexer.run_due_refetch();

        // Sink was dropped together with the parked request
        assert!(matches!(
            rx.try_recv(),
            Err(std::sync::mpsc::TryRecvError::Disconnected)
        ));
        assert_eq!(indexer.state(), FetchState::Ready);
    }

    /// Serves `data` as if it started at byte `base` of a larger stream
    struct OffsetSource {
        base: u64,
        data: Vec<u8>,
        pos: u64,
    }

    impl std::io::Read for OffsetSource {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let Some(at) = self.pos.checked_sub(self.base) else {
                return Ok(0);
            };
            let rest = self.data.get(at as usize..).unwrap_or(&[]);
            let n = rest.len().min(buf.len());
            buf[..n].copy_from_slice(&rest[..n]);
            self.pos += n as u64;
            Ok(n)
        }
    }

    impl std::io::Seek for OffsetSource {
        fn seek(&mut self, to: std::io::SeekFrom) -> std::io::Result<u64> {
            if let std::io::SeekFrom::Start(offset) = to {
                self.pos = offset;
            }
            Ok(self.pos)
        }
    }

    impl ByteSource for OffsetSource {
        fn size(&self) -> io::Result<u64> {
            Ok(self.base + self.data.len() as u64)
        }
    }

    #[test]
    fn test_offset_limit_stops_paging() {
        let base = crate::index::range::MAX_OFFSET - 10;
        let data = format!(
            "{}\n{}\n",
            header_line(Level::Info, "A", "straddles the limit"),
            header_line(Level::Info, "B", "past the limit")
        );
        let source = OffsetSource {
            base,
            data: data.into_bytes(),
            pos: 0,
        };
        let mut reader = BufferedReader::new(source, 16);
        reader.seek(base);
        let (mut indexer, _events) = LineIndexer::new(reader, options(0, Level::Info));

        let (tx, rx) = channel();
        indexer.fetch(FetchKind::Initial, 10, tx.clone());
        let page = rx.try_recv().unwrap();
        assert!(page.exhausted);
        assert!(page.ranges.is_empty());
        assert!(!page.pending);
        assert_eq!(indexer.reader().position(), base);

        // No rescan of the same region
        indexer.fetch(FetchKind::Append, 10, tx);
        let again = rx.try_recv().unwrap();
        assert!(again.exhausted);
        assert_eq!(indexer.reader().position(), base);

        indexer.set_level(Level::Warn);
        assert_eq!(indexer.reader().position(), 0);
    }

    #[test]
    fn test_worker_runs_without_event_listener() {
        let reader = BufferedReader::new(Cursor::new(sample_log().into_bytes()), 64);
        let (handle, events) = LineIndexer::spawn(reader, options(0, Level::Verbose)).unwrap();
        drop(events);

        let mut total = next_page(&handle.fetch_initial(3)).ranges.len();
        loop {
            let page = next_page(&handle.fetch_more(3));
            if page.pending {
                break;
            }
            total += page.ranges.len();
        }

        assert_eq!(total, 10);
        assert_eq!(handle.state(), FetchState::PendingAppend);
        handle.close();
    }

    #[test]
    fn test_closed_reader_yields_empty_page() {
        let reader = BufferedReader::new(Cursor::new(sample_log().into_bytes()), 64);
        let (mut indexer, _events) = LineIndexer::new(reader, options(0, Level::Info));
        indexer.close();

        let (tx, rx) = channel();
        indexer.fetch(FetchKind::Initial, 10, tx);
        let page = rx.try_recv().unwrap();
        assert!(page.ranges.is_empty());
        assert!(!page.pending);
    }

    #[test]
    fn test_spawned_indexer_follows_appends() {
        let file = write_temp("").unwrap();
        let reader = BufferedReader::open(file.path(), 32).unwrap();
        let (handle, events) = LineIndexer::spawn(reader, options(20, Level::Info)).unwrap();

        let rx = handle.fetch_initial(10);
        let parked = next_page(&rx);
        assert!(parked.pending);
        wait_for_event(&events, &IndexEvent::State(FetchState::PendingInitial));
        assert_eq!(handle.state(), FetchState::PendingInitial);

        let text = format!(
            "{}\n{}\n  continuation\n",
            header_line(Level::Debug, "Quiet", "skipped"),
            header_line(Level::Warn, "Loud", "kept")
        );
        append(file.path(), &text);
        handle.invalidate();

        let page = next_page(&rx);
        assert!(!page.pending);
        assert_eq!(page.ranges.len(), 1);
        let start = text.find(&header_line(Level::Warn, "Loud", "kept")).unwrap();
        assert_eq!(page.ranges[0].start(), start as u64);
        assert_eq!(page.ranges[0].end(), text.len() as u64);
        wait_for_event(&events, &IndexEvent::State(FetchState::Done));

        handle.close();
    }

    #[test]
    fn test_rapid_invalidates_coalesce_into_one_refetch() {
        let file = write_temp("").unwrap();
        let reader = BufferedReader::open(file.path(), 32).unwrap();
        let (handle, _events) = LineIndexer::spawn(reader, options(50, Level::Info)).unwrap();

        let rx = handle.fetch_more(10);
        assert!(next_page(&rx).pending);

        append(file.path(), &format!("{}\n", header_line(Level::Info, "A", "one")));
        for _ in 0..5 {
            handle.invalidate();
        }

        let page = next_page(&rx);
        assert_eq!(page.ranges.len(), 1);
        assert_eq!(page.kind, FetchKind::Append);

        // No second delivery for the same request
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        handle.close();
    }

    #[test]
    fn test_handle_detects_stale_pages() {
        let reader = BufferedReader::new(Cursor::new(sample_log().into_bytes()), 64);
        let (handle, events) = LineIndexer::spawn(reader, options(0, Level::Verbose)).unwrap();

        let page = next_page(&handle.fetch_initial(5));
        assert!(!handle.is_stale(&page));

        handle.set_filter_keyword(Some("Glide".into()));
        assert!(handle.is_stale(&page));
        wait_for_event(&events, &IndexEvent::State(FetchState::Invalid));

        handle.invalidate();
        wait_for_event(&events, &IndexEvent::Restart { generation: 1 });

        let fresh = next_page(&handle.fetch_initial(100));
        assert!(!handle.is_stale(&fresh));
        assert_eq!(fresh.ranges.len(), 4);
        handle.close();
    }
}
