//! Graceful shutdown on SIGINT/SIGTERM.
//!
//! The first signal only raises a flag so the running command can flush
//! and exit on its own. A second signal exits immediately with code 1.

use signal_hook::consts::TERM_SIGNALS;
use signal_hook::flag;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    requested: Arc<AtomicBool>,
}

impl Shutdown {
    /// A flag not connected to any signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the termination signal handlers
    pub fn install() -> io::Result<Self> {
        let shutdown = Self::new();
        for sig in TERM_SIGNALS {
            // Armed only once the flag is already set
            flag::register_conditional_shutdown(*sig, 1, Arc::clone(&shutdown.requested))?;
            flag::register(*sig, Arc::clone(&shutdown.requested))?;
        }
        Ok(shutdown)
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }
}
