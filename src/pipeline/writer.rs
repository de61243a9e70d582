//! Multi-producer, single-consumer batched log writer.
//!
//! Producers call [`PipelineHandle::post`] from any thread; the call only
//! pushes onto a shared queue. One consumer thread drains the queue in
//! batches and appends them to the output file. A batch is written when
//! the queue reaches the flush threshold, when the quiescence window has
//! passed since the last flush, or on stop.

use super::counter::FlushCounter;
use super::record::RecordFormatter;
use crate::level::Level;
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, trace};

pub const DEFAULT_FLUSH_THRESHOLD: usize = 1;
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("output directory does not exist: {}", .0.display())]
    MissingOutputLocation(PathBuf),

    #[error("cannot open output file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start writer thread: {0}")]
    Spawn(#[source] io::Error),
}

/// Construction parameters for an [`AppendPipeline`]
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Directory that receives the output file; must already exist
    pub output_dir: PathBuf,
    /// File name inside `output_dir`; defaults to `yy_MM_dd.log`
    pub file_name: Option<String>,
    /// Queue length that wakes the consumer
    pub flush_threshold: usize,
    /// Longest a queued record waits before being flushed
    pub max_wait: Duration,
    /// Process name stamped on records; defaults to the executable name
    pub process_name: Option<String>,
}

impl PipelineOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_name: None,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            max_wait: DEFAULT_MAX_WAIT,
            process_name: None,
        }
    }
}

/// Daily file name, e.g. `21_11_10.log`
pub fn default_file_name(date: &DateTime<Local>) -> String {
    format!("{}.log", date.format("%y_%m_%d"))
}

struct QueueState {
    queue: Vec<String>,
    last_flush: Instant,
    stop_requested: bool,
    /// Set by the final drain of `stop`; later records are discarded
    closed: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Where and how batches are written
#[derive(Clone)]
struct Sink {
    path: PathBuf,
    counter: FlushCounter,
}

impl Sink {
    fn write_batch(&self, batch: &[String]) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(batch.concat().as_bytes())?;
        file.flush()
    }

    /// Write a batch; failures are reported and the batch is dropped
    fn flush(&self, batch: &[String]) -> bool {
        match self.write_batch(batch) {
            Ok(()) => {
                let flushes = self.counter.increment();
                trace!(records = batch.len(), flushes, "batch flushed");
                true
            }
            Err(e) => {
                error!(path = %self.path.display(), records = batch.len(), %e, "failed to flush log records");
                false
            }
        }
    }
}

/// Cheap, cloneable producer side of an [`AppendPipeline`]
#[derive(Clone)]
pub struct PipelineHandle {
    shared: Arc<Shared>,
    formatter: Arc<RecordFormatter>,
    flush_threshold: usize,
    max_wait: Duration,
}

impl PipelineHandle {
    /// Queue an already formatted record. Never blocks on I/O.
    ///
    /// A trailing newline is added if missing.
    pub fn post(&self, record: impl Into<String>) {
        let mut record = record.into();
        if !record.ends_with('\n') {
            record.push('\n');
        }

        let mut state = self.shared.lock();
        if state.closed {
            trace!("pipeline stopped, record discarded");
            return;
        }
        state.queue.push(record);
        let due = state.queue.len() >= self.flush_threshold
            || state.last_flush.elapsed() >= self.max_wait;
        drop(state);

        if due {
            self.shared.wake.notify_one();
        }
    }

    /// Format and queue a record
    pub fn log(&self, level: Level, tag: &str, message: &str) {
        self.post(self.formatter.format(level, tag, message));
    }

    pub fn verbose(&self, tag: &str, message: &str) {
        self.log(Level::Verbose, tag, message);
    }

    pub fn debug(&self, tag: &str, message: &str) {
        self.log(Level::Debug, tag, message);
    }

    pub fn info(&self, tag: &str, message: &str) {
        self.log(Level::Info, tag, message);
    }

    pub fn warn(&self, tag: &str, message: &str) {
        self.log(Level::Warn, tag, message);
    }

    pub fn error(&self, tag: &str, message: &str) {
        self.log(Level::Error, tag, message);
    }

    /// Records queued but not yet written
    pub fn queued(&self) -> usize {
        self.shared.lock().queue.len()
    }
}

/// Owner of the consumer thread.
///
/// `start` launches the consumer, `stop` (also run on drop) performs one
/// final drain so nothing queued before it is lost.
pub struct AppendPipeline {
    handle: PipelineHandle,
    sink: Sink,
    worker: Option<JoinHandle<()>>,
}

impl AppendPipeline {
    /// Validate the output location and create the output file.
    pub fn new(options: PipelineOptions) -> Result<Self, PipelineError> {
        if !options.output_dir.is_dir() {
            return Err(PipelineError::MissingOutputLocation(options.output_dir));
        }

        let file_name = options
            .file_name
            .unwrap_or_else(|| default_file_name(&Local::now()));
        let path = options.output_dir.join(file_name);

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| PipelineError::Io {
                path: path.clone(),
                source,
            })?;

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                queue: Vec::new(),
                last_flush: Instant::now(),
                stop_requested: false,
                closed: false,
            }),
            wake: Condvar::new(),
        });

        debug!(path = %path.display(), threshold = options.flush_threshold, "pipeline created");

        Ok(Self {
            handle: PipelineHandle {
                shared,
                formatter: Arc::new(RecordFormatter::new(options.process_name.as_deref())),
                flush_threshold: options.flush_threshold.max(1),
                max_wait: options.max_wait,
            },
            sink: Sink {
                path,
                counter: FlushCounter::new(),
            },
            worker: None,
        })
    }

    /// Path of the output file
    pub fn path(&self) -> &Path {
        &self.sink.path
    }

    pub fn handle(&self) -> PipelineHandle {
        self.handle.clone()
    }

    pub fn counter(&self) -> FlushCounter {
        self.sink.counter.clone()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn post(&self, record: impl Into<String>) {
        self.handle.post(record);
    }

    pub fn log(&self, level: Level, tag: &str, message: &str) {
        self.handle.log(level, tag, message);
    }

    /// Launch the consumer thread. No-op if already running.
    pub fn start(&mut self) -> Result<(), PipelineError> {
        if self.worker.is_some() {
            return Ok(());
        }

        {
            let mut state = self.handle.shared.lock();
            state.stop_requested = false;
            state.closed = false;
        }

        let consumer = Consumer {
            shared: Arc::clone(&self.handle.shared),
            sink: self.sink.clone(),
            flush_threshold: self.handle.flush_threshold,
            max_wait: self.handle.max_wait,
        };

        let worker = thread::Builder::new()
            .name("logkit-writer".into())
            .spawn(move || consumer.run())
            .map_err(PipelineError::Spawn)?;

        self.worker = Some(worker);
        Ok(())
    }

    /// Stop the consumer and write out everything still queued.
    ///
    /// Records posted through a handle after this are discarded until the
    /// next `start`.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.handle.shared.lock().stop_requested = true;
            self.handle.shared.wake.notify_all();
            if worker.join().is_err() {
                error!("writer thread panicked");
            }
        }

        // Anything posted after the consumer took its last batch
        let remaining = {
            let mut state = self.handle.shared.lock();
            state.closed = true;
            mem::take(&mut state.queue)
        };
        if !remaining.is_empty() {
            self.sink.flush(&remaining);
        }
        debug!(path = %self.sink.path.display(), "pipeline stopped");
    }
}

impl Drop for AppendPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Consumer {
    shared: Arc<Shared>,
    sink: Sink,
    flush_threshold: usize,
    max_wait: Duration,
}

impl Consumer {
    fn run(self) {
        loop {
            let (batch, stopping) = self.next_batch();
            if !batch.is_empty() && self.sink.flush(&batch) {
                self.shared.lock().last_flush = Instant::now();
            }
            if stopping {
                break;
            }
        }
    }

    /// Block until a batch is due, then take the whole queue.
    ///
    /// The lock is released before the batch is written.
    fn next_batch(&self) -> (Vec<String>, bool) {
        let mut state = self.shared.lock();
        let deadline = Instant::now() + self.max_wait;

        loop {
            if state.stop_requested
                || state.queue.len() >= self.flush_threshold
                || (!state.queue.is_empty() && state.last_flush.elapsed() >= self.max_wait)
            {
                break;
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }

            state = self
                .shared
                .wake
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        (mem::take(&mut state.queue), state.stop_requested)
    }
}
