//! Dial Timer - a countdown timer driven from a circular tick dial
//!
//! The library holds the countdown state machine, the mapping from a touch on
//! the dial to a time value, and the per-tick drawing parameters. A terminal
//! front end in `main.rs` renders the dial and forwards commands.

pub mod commands;
pub mod config;
pub mod geometry;
pub mod render;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, TimerConfig};
pub use geometry::{dial_ticks, position_to_time, DialTick, Point};
pub use state::{TimerEvent, TimerSnapshot, TimerState};
pub use utils::signals::shutdown_signal;
