//! # snakebot-core
//!
//! Foundation types shared by every snake-bot controller crate:
//!
//! - **Protocol**: [`Command`] (client → device) and [`ServerMessage`]
//!   (device → client) tagged unions with their JSON wire shapes
//! - **Codec**: [`encode_command`] / [`decode_message`] with a typed
//!   [`CodecError`] that never escapes as a panic
//! - **Telemetry**: the validated 8×8 [`ThermalGrid`] and heat-map colouring
//! - **Constants**: default port, timeouts, speed range

#![deny(unsafe_code)]

pub mod codec;
pub mod constants;
pub mod protocol;
pub mod telemetry;

pub use codec::{CodecError, decode_message, encode_command};
pub use protocol::{Command, Direction, RobotStatus, ServerMessage};
pub use telemetry::{Rgb, ThermalGrid, heat_color};
