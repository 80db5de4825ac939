//! Frame encoding and decoding.
//!
//! Outbound commands always serialize. Inbound frames are validated in
//! stages so that a failure names what was wrong with the frame: not JSON,
//! not an object, no `type` tag, an unknown tag, or a known tag with a bad
//! payload. Decoding never panics; callers log the error and drop the frame.

use serde_json::Value;
use thiserror::Error;

use crate::protocol::{Command, ServerMessage};

/// Message tags the device is allowed to send.
pub const INBOUND_TYPES: [&str; 3] = ["status", "error", "pong"];

/// Reasons a frame could not be encoded or decoded.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The frame is not valid JSON.
    #[error("invalid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The frame is JSON but not an object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
    /// The object has no string `type` field.
    #[error("missing \"type\" field")]
    MissingType,
    /// The `type` tag is not one the device may send.
    #[error("unknown message type: {0}")]
    UnknownType(String),
    /// The tag is known but the payload does not match its shape.
    #[error("invalid {kind} payload: {source}")]
    InvalidPayload {
        /// Message tag.
        kind: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// A command could not be serialized.
    #[error("failed to encode command: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Serialize a command into its canonical text frame.
pub fn encode_command(command: &Command) -> Result<String> {
    serde_json::to_string(command).map_err(CodecError::Encode)
}

/// Parse a text frame from the device.
pub fn decode_message(frame: &str) -> Result<ServerMessage> {
    let value: Value = serde_json::from_str(frame).map_err(CodecError::Malformed)?;
    let kind = match &value {
        Value::Object(map) => match map.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            _ => return Err(CodecError::MissingType),
        },
        other => return Err(CodecError::NotAnObject(json_type_name(other))),
    };
    if !INBOUND_TYPES.contains(&kind.as_str()) {
        return Err(CodecError::UnknownType(kind));
    }
    serde_json::from_value(value).map_err(|source| CodecError::InvalidPayload { kind, source })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
