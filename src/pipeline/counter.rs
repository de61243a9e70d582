use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};

/// Number of completed flushes, observable from any thread.
///
/// Readers of the output file subscribe to learn when new records landed
/// (typically to call `invalidate` on an indexer).
#[derive(Debug, Clone, Default)]
pub struct FlushCounter {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    count: AtomicU64,
    subscribers: Mutex<Vec<Sender<u64>>>,
}

impl FlushCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        self.inner.count.load(Ordering::SeqCst)
    }

    /// Receive every subsequent counter value
    pub fn subscribe(&self) -> Receiver<u64> {
        let (tx, rx) = channel();
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Record one flush and notify subscribers. Returns the new value.
    pub(crate) fn increment(&self) -> u64 {
        let value = self.inner.count.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|tx| tx.send(value).is_ok());
        value
    }
}
