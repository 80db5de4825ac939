//! Parsing of console lines into controller inputs.

use snakebot_core::Direction;
use thiserror::Error;

/// One console command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// Blank line.
    Empty,
    /// Open a channel, falling back to configured host and port.
    Connect {
        /// Host override.
        host: Option<String>,
        /// Port override.
        port: Option<u16>,
    },
    /// Close the channel.
    Disconnect,
    /// Drive at the current speed.
    Drive(Direction),
    /// Halt the motors.
    Stop,
    /// Set the speed (clamped by the console).
    Speed(i32),
    /// Raise the speed by one step.
    Faster,
    /// Lower the speed by one step.
    Slower,
    /// Print the connection badge and telemetry.
    Status,
    /// Print the heat map.
    Heat,
    /// Print the debug log.
    Logs,
    /// Empty the debug log.
    Clear,
    /// Print the command summary.
    Help,
    /// Leave the console.
    Quit,
}

/// A line that could not be understood.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command: {0} (type `help`)")]
    Unknown(String),
    #[error("`{command}` needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
    #[error("invalid {what}: {value}")]
    Invalid { what: &'static str, value: String },
    #[error("too many arguments for `{0}`")]
    TooManyArguments(&'static str),
}

/// Parse one line of console input.
pub fn parse_line(line: &str) -> Result<Input, InputError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Input::Empty);
    };
    let head = head.to_ascii_lowercase();
    let args: Vec<&str> = words.collect();

    let input = match head.as_str() {
        "connect" | "c" => {
            if args.len() > 2 {
                return Err(InputError::TooManyArguments("connect"));
            }
            let port = args.get(1).map(|p| parse_port(p)).transpose()?;
            Input::Connect {
                host: args.first().map(|h| (*h).to_string()),
                port,
            }
        }
        "speed" => {
            let Some(value) = args.first() else {
                return Err(InputError::MissingArgument {
                    command: "speed",
                    what: "a value between 50 and 255",
                });
            };
            let speed = value.parse::<i32>().map_err(|_| InputError::Invalid {
                what: "speed",
                value: (*value).to_string(),
            })?;
            Input::Speed(speed)
        }
        other => {
            let input = match other {
                "disconnect" => Input::Disconnect,
                "w" => Input::Drive(Direction::Forward),
                "s" => Input::Drive(Direction::Backward),
                "a" => Input::Drive(Direction::Left),
                "d" => Input::Drive(Direction::Right),
                "x" | "stop" => Input::Stop,
                "+" | "faster" => Input::Faster,
                "-" | "slower" => Input::Slower,
                "status" => Input::Status,
                "heat" => Input::Heat,
                "logs" => Input::Logs,
                "clear" => Input::Clear,
                "help" | "?" => Input::Help,
                "quit" | "exit" | "q" => Input::Quit,
                word => match word.parse::<Direction>() {
                    Ok(direction) => Input::Drive(direction),
                    Err(_) => return Err(InputError::Unknown(word.to_string())),
                },
            };
            if !args.is_empty() {
                return Err(InputError::TooManyArguments(keyword(&input)));
            }
            input
        }
    };
    Ok(input)
}

fn parse_port(value: &str) -> Result<u16, InputError> {
    match value.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(InputError::Invalid {
            what: "port",
            value: value.to_string(),
        }),
    }
}

fn keyword(input: &Input) -> &'static str {
    match input {
        Input::Empty => "",
        Input::Connect { .. } => "connect",
        Input::Disconnect => "disconnect",
        Input::Drive(direction) => direction.as_str(),
        Input::Stop => "stop",
        Input::Speed(_) => "speed",
        Input::Faster => "faster",
        Input::Slower => "slower",
        Input::Status => "status",
        Input::Heat => "heat",
        Input::Logs => "logs",
        Input::Clear => "clear",
        Input::Help => "help",
        Input::Quit => "quit",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
