//! Wire protocol between the controller and the robot.
//!
//! Frames are JSON text objects discriminated by a `type` field:
//!
//! ```text
//! client → device   {"type":"move","direction":"forward","speed":200}
//!                   {"type":"stop"}
//!                   {"type":"ping"}
//! device → client   {"type":"status", ...telemetry...}
//!                   {"type":"error","message":"..."}
//!                   {"type":"pong"}
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::telemetry::ThermalGrid;

// ─────────────────────────────────────────────────────────────────────────────
// Client → device
// ─────────────────────────────────────────────────────────────────────────────

/// Drive direction understood by the motor controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Both tracks forward.
    Forward,
    /// Both tracks in reverse.
    Backward,
    /// Spin left.
    Left,
    /// Spin right.
    Right,
    /// Halt via the move channel.
    Stop,
}

impl Direction {
    /// All directions, in wire-name order.
    pub const ALL: [Self; 5] = [
        Self::Forward,
        Self::Backward,
        Self::Left,
        Self::Right,
        Self::Stop,
    ];

    /// Wire name of the direction.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::Left => "left",
            Self::Right => "right",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no [`Direction`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction: {0}")]
pub struct UnknownDirection(pub String);

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownDirection(s.to_string()))
    }
}

/// A command sent from the controller to the robot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Command {
    /// Drive in a direction, optionally at a given PWM speed.
    Move {
        /// Where to go.
        direction: Direction,
        /// PWM duty in `[50, 255]`; omitted from the frame when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        speed: Option<u8>,
    },
    /// Halt both motors.
    Stop,
    /// Liveness check.
    Ping,
}

impl Command {
    /// `Move` at an explicit speed.
    pub fn move_to(direction: Direction, speed: u8) -> Self {
        Self::Move {
            direction,
            speed: Some(speed),
        }
    }

    /// `Move` letting the firmware pick its default speed.
    pub fn move_default(direction: Direction) -> Self {
        Self::Move {
            direction,
            speed: None,
        }
    }

    /// `Stop`.
    pub fn stop() -> Self {
        Self::Stop
    }

    /// `Ping`.
    pub fn ping() -> Self {
        Self::Ping
    }

    /// Wire tag of the command.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Stop => "stop",
            Self::Ping => "ping",
        }
    }

    /// Whether this is a heartbeat ping.
    pub fn is_ping(&self) -> bool {
        matches!(self, Self::Ping)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Device → client
// ─────────────────────────────────────────────────────────────────────────────

/// Telemetry snapshot pushed by the robot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotStatus {
    /// Whether the device considers a client attached.
    pub connected: bool,
    /// Left motor duty.
    pub motor_a: f64,
    /// Right motor duty.
    pub motor_b: f64,
    /// Heat-based presence detection result.
    pub presence: bool,
    /// Pixels above the presence threshold.
    pub hot_pixels: f64,
    /// Hottest pixel, °C.
    pub max_temp: f64,
    /// Calibrated ambient temperature, °C.
    pub ambient_temp: f64,
    /// Raw 8×8 frame in row-major order. May be absent or malformed;
    /// use [`RobotStatus::thermal_grid`] to get a validated view.
    #[serde(
        default,
        deserialize_with = "lenient_pixels",
        skip_serializing_if = "Option::is_none"
    )]
    pub pixels: Option<Vec<f64>>,
}

/// Anything other than an array of numbers reads as "no frame".
fn lenient_pixels<'de, D>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.iter().map(Value::as_f64).collect(),
        _ => None,
    })
}

impl RobotStatus {
    /// The thermal frame, or `None` when the device sent no usable grid.
    pub fn thermal_grid(&self) -> Option<ThermalGrid> {
        self.pixels.as_deref().and_then(ThermalGrid::from_pixels)
    }
}

/// A message received from the robot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Periodic telemetry.
    Status(RobotStatus),
    /// Device-side application error.
    Error {
        /// Human-readable description.
        message: String,
    },
    /// Heartbeat reply.
    Pong,
}

impl ServerMessage {
    /// Wire tag of the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status(_) => "status",
            Self::Error { .. } => "error",
            Self::Pong => "pong",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
