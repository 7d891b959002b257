//! Change notifications emitted by the timer

use serde::{Deserialize, Serialize};

/// What a mutation did, sent alongside the new snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimerEvent {
    Started { time_remaining: u32 },
    Stopped { time_remaining: u32 },
    Ticked { time_remaining: u32 },
    /// The countdown reached zero on its own
    Finished,
    Reset { time_remaining: u32 },
    TimeSet { time_remaining: u32 },
}

impl TimerEvent {
    /// Short name used for last-action tracking and logs
    pub fn action(&self) -> &'static str {
        match self {
            Self::Started { .. } => "start",
            Self::Stopped { .. } => "stop",
            Self::Ticked { .. } => "tick",
            Self::Finished => "finish",
            Self::Reset { .. } => "reset",
            Self::TimeSet { .. } => "set-time",
        }
    }
}
