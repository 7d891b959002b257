//! Line commands read from the terminal

use anyhow::{anyhow, bail, Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::{
    render::{status_line, DialCanvas},
    state::TimerState,
};

/// A control action typed by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Reset,
    /// Touch the drawn dial at a cell (column, row)
    Touch { column: u16, row: u16 },
    Set(u32),
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  t, toggle        start or stop the countdown
  r, reset         stop and refill the dial
  touch <x> <y>    set the time by touching a cell of the dial
  set <seconds>    set the time directly
  s, status        print the current state
  h, help          show this help
  q, quit          exit";

impl Command {
    /// Parse one input line
    pub fn parse(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or_else(|| anyhow!("empty command"))?;

        let command = match name.to_ascii_lowercase().as_str() {
            "t" | "toggle" | "start" | "stop" => Self::Toggle,
            "r" | "reset" => Self::Reset,
            "touch" => {
                let column = parse_arg(words.next(), "x")?;
                let row = parse_arg(words.next(), "y")?;
                Self::Touch { column, row }
            }
            "set" => Self::Set(parse_arg(words.next(), "seconds")?),
            "s" | "status" => Self::Status,
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            other => bail!("unknown command '{}', try 'help'", other),
        };

        if let Some(extra) = words.next() {
            bail!("unexpected argument '{}'", extra);
        }
        Ok(command)
    }

    /// Apply a control command to the timer. Display-only commands do nothing.
    pub fn apply(&self, timer: &TimerState, canvas: &DialCanvas) {
        match *self {
            Self::Toggle => timer.toggle(),
            Self::Reset => timer.reset(),
            Self::Touch { column, row } => {
                timer.set_time_by_touch(canvas.center(), canvas.cell_center(column, row))
            }
            Self::Set(seconds) => timer.set_time(seconds),
            Self::Status | Self::Help | Self::Quit => {}
        }
    }
}

/// Read commands line by line until end of input or `quit`
pub async fn read_commands<R>(
    input: R,
    timer: &TimerState,
    canvas: &DialCanvas,
    json: bool,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{}", HELP),
            Ok(Command::Status) => {
                let snapshot = timer.snapshot();
                if json {
                    println!("{}", serde_json::to_string(&snapshot)?);
                } else {
                    println!("{}", status_line(&snapshot));
                    if let (Some(action), Some(at)) = timer.last_action() {
                        println!("last action: {} at {}", action, at.format("%H:%M:%S"));
                    }
                }
            }
            Ok(command) => {
                debug!("Applying {:?}", command);
                command.apply(timer, canvas);
            }
            Err(e) => {
                warn!("Rejected input: {}", line.trim());
                eprintln!("{:#}", e);
            }
        }
    }

    Ok(())
}

fn parse_arg<T>(word: Option<&str>, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let word = word.ok_or_else(|| anyhow!("missing <{}>", name))?;
    word.parse()
        .with_context(|| format!("invalid <{}>: '{}'", name, word))
}

#[cfg(test)]
mod tests {
    use tokio::io::BufReader;

    use super::*;

    #[test]
    fn parses_controls_and_aliases() {
        assert_eq!(Command::parse("t").unwrap(), Command::Toggle);
        assert_eq!(Command::parse("  STOP ").unwrap(), Command::Toggle);
        assert_eq!(Command::parse("reset").unwrap(), Command::Reset);
        assert_eq!(Command::parse("q").unwrap(), Command::Quit);
        assert_eq!(Command::parse("set 30").unwrap(), Command::Set(30));
        assert_eq!(
            Command::parse("touch 20 10").unwrap(),
            Command::Touch { column: 20, row: 10 }
        );
    }

    #[test]
    fn reports_bad_input() {
        assert!(Command::parse("").is_err());
        assert!(Command::parse("jump").is_err());
        assert!(Command::parse("touch 3").is_err());
        assert!(Command::parse("set -1").is_err());
        assert!(Command::parse("reset now").is_err());

        let message = Command::parse("set abc").unwrap_err().to_string();
        assert!(message.contains("seconds"), "{}", message);
    }

    #[test]
    fn touch_command_drives_dial() {
        let timer = TimerState::default();
        let canvas = DialCanvas::new(21);

        Command::Touch { column: 10, row: 20 }.apply(&timer, &canvas);
        assert_eq!(timer.time_remaining(), 30);

        Command::Status.apply(&timer, &canvas);
        assert_eq!(timer.time_remaining(), 30);

        Command::Reset.apply(&timer, &canvas);
        assert_eq!(timer.time_remaining(), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn quit_stops_reading_input() {
        let timer = TimerState::default();
        let canvas = DialCanvas::new(21);
        let input = BufReader::new(&b"t\nq\nr\n"[..]);

        read_commands(input, &timer, &canvas, true).await.unwrap();

        // The reset after quit was never read
        assert!(timer.is_running());
        timer.reset();
    }

    #[tokio::test(start_paused = true)]
    async fn end_of_input_applies_every_valid_line() {
        let timer = TimerState::default();
        let canvas = DialCanvas::new(21);
        let input = BufReader::new(&b"set 20\n\nbogus\nstatus\ntouch 20 10\n"[..]);

        read_commands(input, &timer, &canvas, false).await.unwrap();

        assert_eq!(timer.time_remaining(), 15);
        assert!(!timer.is_running());
    }
}
