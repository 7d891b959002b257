//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

/// Default dial range in seconds
pub const DEFAULT_TIME_LIMIT: u32 = 60;

/// Default countdown period
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "dial-timer")]
#[command(about = "A countdown timer with a circular tick dial")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Dial range in seconds; also the number of ticks drawn
    #[arg(short, long, default_value_t = DEFAULT_TIME_LIMIT,
          value_parser = clap::value_parser!(u32).range(1..=3600))]
    pub limit: u32,

    /// Countdown tick period in milliseconds
    #[arg(long, default_value = "1000",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Size of the rendered dial in character cells
    #[arg(short, long, default_value = "21",
          value_parser = clap::value_parser!(u16).range(7..=99))]
    pub size: u16,

    /// Print snapshots as JSON lines instead of drawing the dial
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Library-side timer settings derived from the CLI
    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig {
            time_limit: self.limit,
            tick_period: Duration::from_millis(self.tick_ms),
        }
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// Settings fixed when a [`TimerState`](crate::state::TimerState) is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    /// Upper bound of the countdown, in seconds. Never zero.
    pub time_limit: u32,
    /// Delay between the end of one tick and the next
    pub tick_period: Duration,
}

impl TimerConfig {
    pub fn with_limit(time_limit: u32) -> Self {
        Self {
            time_limit: time_limit.max(1),
            ..Self::default()
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            tick_period: DEFAULT_TICK_PERIOD,
        }
    }
}
