use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Set-once stop flag owned by a single orchestration run.
///
/// Clones share the flag. Setting it prevents further submissions; work
/// already executing is left to settle.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    stopped: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Returns `true` only for the call that actually set it.
    pub fn stop(&self) -> bool {
        !self.stopped.swap(true, Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}
