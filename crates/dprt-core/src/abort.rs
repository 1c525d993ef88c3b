//! Cooperative cancellation flag shared between a host and the engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared abort flag.
///
/// Clones share the same underlying flag, so a host can keep a handle and
/// set it from another thread while a reduction is running. The engine reads
/// it at each checkpoint and never caches the value.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    flag: Arc<AtomicBool>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request (`true`) or withdraw (`false`) an abort.
    pub fn set(&self, value: bool) {
        self.flag.store(value, Ordering::SeqCst);
    }

    /// Current value of the flag.
    pub fn get(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear the flag ahead of a new top-level call.
    pub fn reset(&self) {
        self.set(false);
    }
}
