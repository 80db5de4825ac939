//! # snakebot-settings
//!
//! Controller configuration loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`ControllerSettings::default()`]
//! 2. **User file**: `~/.snakebot/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `SNAKEBOT_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_firmware() {
        let settings = ControllerSettings::default();
        assert_eq!(settings.device.host, "192.168.4.1");
        assert_eq!(settings.device.port, 81);
        assert_eq!(settings.session.connect_timeout_ms, 10_000);
        assert_eq!(settings.session.heartbeat_interval_ms, 5_000);
        assert_eq!(settings.session.log_capacity, 100);
        assert_eq!(settings.drive.default_speed, 200);
        assert_eq!(settings.logging.level, "warn");
    }

    #[test]
    fn settings_path_is_under_home() {
        let path = settings_path();
        assert!(path.ends_with(".snakebot/settings.json"));
    }
}
