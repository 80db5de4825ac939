//! The driving console: turns parsed inputs into session operations.

use snakebot_core::telemetry::clamp_speed;
use snakebot_core::{Command, Direction};
use snakebot_session::{SessionHandle, Target};
use snakebot_settings::ControllerSettings;

use crate::input::Input;
use crate::render;

/// What the caller should do after an input.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading; print the text if any.
    Continue(Option<String>),
    /// Leave the console.
    Quit,
}

impl Outcome {
    fn print(text: impl Into<String>) -> Self {
        Self::Continue(Some(text.into()))
    }

    fn silent() -> Self {
        Self::Continue(None)
    }
}

/// Console state layered over a session handle.
pub struct Console {
    session: SessionHandle,
    default_target: Target,
    speed: u8,
    speed_step: u8,
}

impl Console {
    /// Console with defaults taken from `settings`.
    pub fn new(session: SessionHandle, settings: &ControllerSettings) -> Self {
        Self {
            session,
            default_target: Target::new(settings.device.host.clone(), settings.device.port),
            speed: clamp_speed(i32::from(settings.drive.default_speed)),
            speed_step: settings.drive.speed_step.max(1),
        }
    }

    /// Current drive speed.
    pub fn speed(&self) -> u8 {
        self.speed
    }

    /// Apply one input.
    pub fn execute(&mut self, input: Input) -> Outcome {
        match input {
            Input::Empty => Outcome::silent(),
            Input::Connect { host, port } => {
                let target = Target::new(
                    host.unwrap_or_else(|| self.default_target.host.clone()),
                    port.unwrap_or(self.default_target.port),
                );
                let text = format!("Connecting to {}", target.url());
                self.session.connect_to(target);
                Outcome::print(text)
            }
            Input::Disconnect => {
                self.session.disconnect();
                Outcome::silent()
            }
            Input::Drive(direction) => {
                self.drive(direction);
                Outcome::silent()
            }
            Input::Stop => {
                self.session.send(Command::stop());
                Outcome::silent()
            }
            Input::Speed(requested) => self.set_speed(requested),
            Input::Faster => self.set_speed(i32::from(self.speed) + i32::from(self.speed_step)),
            Input::Slower => self.set_speed(i32::from(self.speed) - i32::from(self.speed_step)),
            Input::Status => Outcome::print(render::status_report(
                &self.session.snapshot(),
                self.speed,
            )),
            Input::Heat => {
                let snapshot = self.session.snapshot();
                Outcome::print(render::heat_map(snapshot.last_status.as_ref()))
            }
            Input::Logs => Outcome::print(render::log_report(&self.session.snapshot().logs)),
            Input::Clear => {
                self.session.clear_logs();
                Outcome::print("Logs cleared")
            }
            Input::Help => Outcome::print(render::HELP),
            Input::Quit => Outcome::Quit,
        }
    }

    fn drive(&self, direction: Direction) {
        self.session.send(Command::move_to(direction, self.speed));
    }

    fn set_speed(&mut self, requested: i32) -> Outcome {
        self.speed = clamp_speed(requested);
        Outcome::print(format!("Speed: {}", self.speed))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
