use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Render loop lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed, waiting for the load event
    Idle,
    /// Every tick schedules the next one
    Running,
    /// A stop was requested and observed, no further ticks run
    Stopped,
}

/// Cloneable stop flag for a render loop
///
/// The loop never stops on its own. Calling [`LoopHandle::stop`] from any
/// clone makes the next tick end the loop instead of running.
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    stop_requested: Arc<AtomicBool>,
}

impl LoopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }
}
