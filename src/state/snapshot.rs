//! Observable timer values

use serde::{Deserialize, Serialize};

/// Point-in-time copy of the timer, published after every change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub time_remaining: u32,
    pub time_limit: u32,
    pub running: bool,
    /// Fraction of the dial still remaining, in `[0, 1]`
    pub progress: f32,
    /// Whether the reset control should be offered
    pub reset_visible: bool,
}

impl TimerSnapshot {
    /// Build a snapshot and derive progress and reset visibility
    pub fn new(time_remaining: u32, time_limit: u32, running: bool) -> Self {
        let progress = if time_limit == 0 {
            0.0
        } else {
            (time_remaining as f32 / time_limit as f32).clamp(0.0, 1.0)
        };

        Self {
            time_remaining,
            time_limit,
            running,
            progress,
            reset_visible: time_remaining != time_limit,
        }
    }

    /// A full dial that is not counting down
    pub fn idle(time_limit: u32) -> Self {
        Self::new(time_limit, time_limit, false)
    }

    pub fn is_finished(&self) -> bool {
        !self.running && self.time_remaining == 0
    }
}
