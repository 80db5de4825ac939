//! Settings schema.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use snakebot_core::constants::{
    CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_LOG_CAPACITY, DEFAULT_PORT, DEFAULT_SPEED,
    HEARTBEAT_INTERVAL, MIN_SPEED, SPEED_STEP,
};

use crate::errors::{Result, SettingsError};

/// Root settings object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControllerSettings {
    /// Where the robot lives.
    pub device: DeviceSettings,
    /// Session timing and log sizing.
    pub session: SessionSettings,
    /// Drive control defaults.
    pub drive: DriveSettings,
    /// Diagnostic output.
    pub logging: LoggingSettings,
}

impl ControllerSettings {
    /// Reject values the session or drive controls cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.device.host.trim().is_empty() {
            return Err(SettingsError::invalid("device.host", "must not be empty"));
        }
        if self.device.port == 0 {
            return Err(SettingsError::invalid("device.port", "must be non-zero"));
        }
        if self.session.connect_timeout_ms == 0 {
            return Err(SettingsError::invalid("session.connectTimeoutMs", "must be non-zero"));
        }
        if self.session.heartbeat_interval_ms == 0 {
            return Err(SettingsError::invalid(
                "session.heartbeatIntervalMs",
                "must be non-zero",
            ));
        }
        if self.session.log_capacity == 0 {
            return Err(SettingsError::invalid("session.logCapacity", "must be at least 1"));
        }
        if self.drive.default_speed < MIN_SPEED {
            return Err(SettingsError::invalid(
                "drive.defaultSpeed",
                format!("{} is below {MIN_SPEED}", self.drive.default_speed),
            ));
        }
        if self.drive.speed_step == 0 {
            return Err(SettingsError::invalid("drive.speedStep", "must be non-zero"));
        }
        Ok(())
    }
}

/// Robot network address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceSettings {
    /// Host name or IP of the robot.
    pub host: String,
    /// WebSocket port.
    pub port: u16,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Session timing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
    /// Channel establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Heartbeat period in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// Debug log capacity.
    pub log_capacity: usize,
}

impl SessionSettings {
    /// Establishment timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Heartbeat period as a [`Duration`].
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }
}

impl Default for SessionSettings {
    #[allow(clippy::cast_possible_truncation)]
    fn default() -> Self {
        Self {
            connect_timeout_ms: CONNECT_TIMEOUT.as_millis() as u64,
            heartbeat_interval_ms: HEARTBEAT_INTERVAL.as_millis() as u64,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

/// Drive control defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriveSettings {
    /// Speed used for `move` until changed.
    pub default_speed: u8,
    /// Increment for speed adjustments.
    pub speed_step: u8,
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            default_speed: DEFAULT_SPEED,
            speed_step: SPEED_STEP,
        }
    }
}

/// Diagnostic output settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
