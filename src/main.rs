//! Dial Timer - a countdown timer driven from a circular tick dial
//!
//! This is the terminal front end: it draws the dial whenever the timer
//! changes and turns input lines into timer operations.

use std::{
    io::{IsTerminal, Write},
    sync::Arc,
    time::Duration,
};
use tokio::io::BufReader;
use tracing::{info, warn};

use dial_timer::{
    commands::{read_commands, HELP},
    config::Config,
    render::DialCanvas,
    state::{TimerSnapshot, TimerState},
    utils::shutdown_signal,
};

/// How long shutdown waits for blocking work, such as a pending stdin read
const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so the dial owns stdout
    tracing_subscriber::fmt()
        .with_env_filter(format!("dial_timer={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(config));

    // A stdin read parked on the blocking pool cannot be cancelled; don't wait for it
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    info!("Timer shutdown complete");
    result
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!("Starting dial-timer v1.0.0");
    info!("Configuration: limit={}s, tick={}ms, size={}, json={}",
          config.limit, config.tick_ms, config.size, config.json);

    let timer = Arc::new(TimerState::new(config.timer_config()));
    let canvas = DialCanvas::new(config.size);
    let display = Display {
        canvas: canvas.clone(),
        json: config.json,
        clear: !config.json && std::io::stdout().is_terminal(),
    };

    // Redraw on every published snapshot
    let mut snapshots = timer.subscribe();
    let redraw = tokio::spawn(async move {
        let initial = *snapshots.borrow_and_update();
        display.show(&initial);
        while snapshots.changed().await.is_ok() {
            let snapshot = *snapshots.borrow_and_update();
            display.show(&snapshot);
            if snapshot.is_finished() && !display.json {
                println!("Time's up!");
            }
        }
    });

    if !config.json {
        println!("{}", HELP);
    }

    let input = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = read_commands(input, &timer, &canvas, config.json) => {
            if let Err(e) = result {
                tracing::error!("Input error: {:#}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    timer.reset();
    redraw.abort();
    Ok(())
}

struct Display {
    canvas: DialCanvas,
    json: bool,
    clear: bool,
}

impl Display {
    fn show(&self, snapshot: &TimerSnapshot) {
        let mut stdout = std::io::stdout().lock();
        let result = if self.json {
            match serde_json::to_string(snapshot) {
                Ok(line) => writeln!(stdout, "{}", line),
                Err(e) => {
                    warn!("Failed to serialize snapshot: {}", e);
                    return;
                }
            }
        } else {
            let prefix = if self.clear { "\x1b[2J\x1b[H" } else { "" };
            write!(stdout, "{}{}", prefix, self.canvas.draw(snapshot))
        };

        if let Err(e) = result.and_then(|_| stdout.flush()) {
            warn!("Failed to write dial: {}", e);
        }
    }
}
