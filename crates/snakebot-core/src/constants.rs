//! Protocol and controller constants.

use std::time::Duration;

/// Current version of the controller (sourced from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WebSocket port the device firmware listens on.
pub const DEFAULT_PORT: u16 = 81;

/// Address the device takes on its own access point.
pub const DEFAULT_HOST: &str = "192.168.4.1";

/// How long a channel may stay in `connecting` before it is abandoned.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Liveness check period while connected.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// Capacity of the session debug log.
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Slowest speed the drive controls offer.
pub const MIN_SPEED: u8 = 50;

/// Full PWM duty.
pub const MAX_SPEED: u8 = 255;

/// Granularity of the speed control.
pub const SPEED_STEP: u8 = 5;

/// Speed used until the operator picks another.
pub const DEFAULT_SPEED: u8 = 200;

/// Thermal sensor grid edge (AMG8833 is 8×8).
pub const GRID_SIZE: usize = 8;

/// Number of pixels in a full thermal frame.
pub const PIXEL_COUNT: usize = GRID_SIZE * GRID_SIZE;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_semver() {
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert_eq!(parts.len(), 3, "VERSION must be semver (MAJOR.MINOR.PATCH)");
    }

    #[test]
    fn speed_range_is_consistent() {
        assert!(MIN_SPEED < DEFAULT_SPEED);
        assert!(DEFAULT_SPEED <= MAX_SPEED);
        assert_eq!((DEFAULT_SPEED - MIN_SPEED) % SPEED_STEP, 0);
    }

    #[test]
    fn pixel_count_is_full_grid() {
        assert_eq!(PIXEL_COUNT, 64);
    }
}
