//! Observable session state.

use std::fmt;

use serde::Serialize;
use snakebot_core::RobotStatus;
use snakebot_core::constants::DEFAULT_PORT;
use snakebot_logging::LogBuffer;

/// Lifecycle state of the session's channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No channel. Initial and terminal state.
    #[default]
    Disconnected,
    /// Channel opening, establishment timeout armed.
    Connecting,
    /// Channel open, heartbeat running.
    Connected,
    /// The last channel failed; a new `connect` is required.
    Error,
}

impl ConnectionState {
    /// Wire-style lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        }
    }

    /// Badge text for status displays.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network address of the robot.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Target {
    /// Host name or IP.
    pub host: String,
    /// WebSocket port.
    pub port: u16,
}

impl Target {
    /// Target at `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Target at the firmware's default port.
    pub fn with_default_port(host: impl Into<String>) -> Self {
        Self::new(host, DEFAULT_PORT)
    }

    /// `ws://host:port`.
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Everything the presentation layer may read about the session.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Channel lifecycle state.
    pub state: ConnectionState,
    /// Target of the most recent `connect`.
    pub target: Option<Target>,
    /// User-facing description of the last failure.
    pub last_error: Option<String>,
    /// Latest telemetry from the robot.
    pub last_status: Option<RobotStatus>,
    /// Session debug log.
    pub logs: LogBuffer,
}

impl SessionSnapshot {
    /// Empty snapshot with a log of the given capacity.
    pub fn with_log_capacity(capacity: usize) -> Self {
        Self {
            logs: LogBuffer::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Whether commands can currently be sent.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_target_port_is_81() {
        let target = Target::with_default_port("192.168.4.1");
        assert_eq!(target.url(), "ws://192.168.4.1:81");
        assert_eq!(target.to_string(), "192.168.4.1:81");
    }

    #[test]
    fn state_names_and_labels() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
        assert_eq!(ConnectionState::Connecting.to_string(), "connecting");
        assert_eq!(ConnectionState::Connecting.label(), "Connecting...");
        assert_eq!(
            serde_json::to_string(&ConnectionState::Error).unwrap(),
            "\"error\""
        );
    }

    #[test]
    fn snapshot_starts_disconnected_and_empty() {
        let snapshot = SessionSnapshot::with_log_capacity(10);
        assert!(!snapshot.is_connected());
        assert!(snapshot.last_status.is_none());
        assert!(snapshot.logs.is_empty());
        assert_eq!(snapshot.logs.capacity(), 10);
    }
}
