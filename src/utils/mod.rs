//! Process-level helpers for the terminal front end

pub mod signals;

pub use signals::shutdown_signal;
