use std::time::Instant;

/// Frame clock - measures time between ticks
/// Starts on the first tick, so the first delta is always zero
#[derive(Debug, Default)]
pub struct Clock {
    started_at: Option<Instant>,
    last_tick: Option<Instant>,
}

impl Clock {
    /// Create a clock that has not started yet
    pub fn new() -> Self {
        Self {
            started_at: None,
            last_tick: None,
        }
    }

    /// Get delta time since last tick and advance clock
    /// Returns delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = match self.last_tick {
            Some(last) => now.duration_since(last).as_secs_f32(),
            None => {
                self.started_at = Some(now);
                0.0
            }
        };
        self.last_tick = Some(now);
        delta
    }

    /// Seconds since the first tick
    pub fn elapsed(&self) -> f32 {
        self.started_at
            .map(|start| start.elapsed().as_secs_f32())
            .unwrap_or(0.0)
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Restart on the next tick
    pub fn reset(&mut self) {
        self.started_at = None;
        self.last_tick = None;
    }
}
