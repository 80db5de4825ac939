//! Session runtime configuration.

use std::time::Duration;

use snakebot_core::constants::{CONNECT_TIMEOUT, DEFAULT_LOG_CAPACITY, HEARTBEAT_INTERVAL};
use snakebot_settings::SessionSettings;

/// Timers and sizing for a [`Session`](crate::Session).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long a channel may stay `connecting`.
    pub connect_timeout: Duration,
    /// Period of the heartbeat ping.
    pub heartbeat_interval: Duration,
    /// Capacity of the debug log.
    pub log_capacity: usize,
}

/// Shortest timer period a session will arm.
pub const MIN_TIMER_PERIOD: Duration = Duration::from_millis(1);

impl SessionConfig {
    /// Copy with zero timer periods raised to [`MIN_TIMER_PERIOD`] and the
    /// log capacity raised to one.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            connect_timeout: self.connect_timeout.max(MIN_TIMER_PERIOD),
            heartbeat_interval: self.heartbeat_interval.max(MIN_TIMER_PERIOD),
            log_capacity: self.log_capacity.max(1),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
            heartbeat_interval: HEARTBEAT_INTERVAL,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl From<&SessionSettings> for SessionConfig {
    fn from(settings: &SessionSettings) -> Self {
        Self {
            connect_timeout: settings.connect_timeout(),
            heartbeat_interval: settings.heartbeat_interval(),
            log_capacity: settings.log_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.heartbeat_interval, Duration::from_secs(5));
        assert_eq!(config.log_capacity, 100);
    }

    #[test]
    fn from_settings() {
        let settings = SessionSettings {
            connect_timeout_ms: 2_500,
            heartbeat_interval_ms: 750,
            log_capacity: 20,
        };
        let config = SessionConfig::from(&settings);
        assert_eq!(config.connect_timeout, Duration::from_millis(2_500));
        assert_eq!(config.heartbeat_interval, Duration::from_millis(750));
        assert_eq!(config.log_capacity, 20);
    }

    #[test]
    fn sanitized_raises_zero_values() {
        let config = SessionConfig {
            connect_timeout: Duration::ZERO,
            heartbeat_interval: Duration::ZERO,
            log_capacity: 0,
        }
        .sanitized();
        assert_eq!(config.connect_timeout, MIN_TIMER_PERIOD);
        assert_eq!(config.heartbeat_interval, MIN_TIMER_PERIOD);
        assert_eq!(config.log_capacity, 1);
    }

    #[test]
    fn sanitized_keeps_valid_values() {
        assert_eq!(SessionConfig::default().sanitized(), SessionConfig::default());
    }
}
