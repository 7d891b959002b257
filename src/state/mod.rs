//! State management module
//!
//! This module contains the countdown state machine and the values it publishes.

pub mod events;
pub mod snapshot;
pub mod timer_state;

// Re-export main types
pub use events::TimerEvent;
pub use snapshot::TimerSnapshot;
pub use timer_state::TimerState;
