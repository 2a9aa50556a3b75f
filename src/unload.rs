//! Host-level exit interception.
//!
//! Closing the host (window, terminal, process) bypasses the in-app exit
//! guard entirely, so the controller arms a separate guard for exactly as
//! long as the questioning screen is showing.

use std::sync::atomic::{AtomicBool, Ordering};

/// Registration point for the host's close/navigate signal.
pub trait UnloadGuard: Send + Sync {
    fn arm(&self);
    fn disarm(&self);
}

/// Guard state held in a flag the host's exit path can query.
#[derive(Debug, Default)]
pub struct UnloadLatch {
    armed: AtomicBool,
}

impl UnloadLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether leaving now should ask "are you sure".
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }
}

impl UnloadGuard for UnloadLatch {
    fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }
}
