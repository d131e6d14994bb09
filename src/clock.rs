//! Monotonic millisecond clock for the frame loop

use std::time::Instant;

/// Milliseconds elapsed since the clock was started
#[derive(Debug, Clone, Copy)]
pub struct GameClock {
    start: Instant,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl GameClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
