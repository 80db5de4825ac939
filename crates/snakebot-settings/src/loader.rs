//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ControllerSettings::default()`]
//! 2. If `~/.snakebot/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use snakebot_core::constants::{MAX_SPEED, MIN_SPEED};
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::ControllerSettings;

/// Resolve the path to the settings file (`~/.snakebot/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".snakebot").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ControllerSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<ControllerSettings> {
    let mut settings = read_settings_file(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Read and merge the settings file without consulting the environment.
pub fn read_settings_file(path: &Path) -> Result<ControllerSettings> {
    let defaults = serde_json::to_value(ControllerSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let user: Value = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `SNAKEBOT_*` environment variable overrides.
///
/// Invalid values are ignored with a warning (fall back to file/default).
pub fn apply_env_overrides(settings: &mut ControllerSettings) {
    if let Some(v) = read_env_string("SNAKEBOT_HOST") {
        settings.device.host = v;
    }
    if let Some(v) = read_env_u64("SNAKEBOT_PORT", 1, 65_535) {
        settings.device.port = narrow(v);
    }
    if let Some(v) = read_env_u64("SNAKEBOT_CONNECT_TIMEOUT_MS", 100, 600_000) {
        settings.session.connect_timeout_ms = v;
    }
    if let Some(v) = read_env_u64("SNAKEBOT_HEARTBEAT_INTERVAL_MS", 100, 600_000) {
        settings.session.heartbeat_interval_ms = v;
    }
    if let Some(v) = read_env_u64("SNAKEBOT_LOG_CAPACITY", 1, 10_000) {
        settings.session.log_capacity = narrow(v);
    }
    if let Some(v) = read_env_u64(
        "SNAKEBOT_DEFAULT_SPEED",
        u64::from(MIN_SPEED),
        u64::from(MAX_SPEED),
    ) {
        settings.drive.default_speed = narrow(v);
    }
    if let Some(v) = read_env_string("SNAKEBOT_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// Range-checked before narrowing, so the conversion cannot fail.
fn narrow<T: TryFrom<u64> + Default>(v: u64) -> T {
    T::try_from(v).unwrap_or_default()
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid numeric env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"device": {"port": 81, "host": "192.168.4.1"}});
        let source = serde_json::json!({"device": {"port": 8081}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["device"]["port"], 8081);
        assert_eq!(merged["device"]["host"], "192.168.4.1");
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"items": [1, 2, 3]});
        let source = serde_json::json!({"items": [4]});
        assert_eq!(deep_merge(target, source)["items"], serde_json::json!([4]));
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let target = serde_json::json!({"a": {"nested": true}});
        let source = serde_json::json!({"a": 42});
        assert_eq!(deep_merge(target, source)["a"], 42);
    }

    // ── parsing ─────────────────────────────────────────────────────

    #[test]
    fn parse_u64_range_bounds() {
        assert_eq!(parse_u64_range("81", 1, 65_535), Some(81));
        assert_eq!(parse_u64_range(" 50 ", 50, 255), Some(50));
        assert_eq!(parse_u64_range("0", 1, 65_535), None);
        assert_eq!(parse_u64_range("256", 50, 255), None);
        assert_eq!(parse_u64_range("fast", 50, 255), None);
    }

    #[test]
    fn narrow_fits_target_type() {
        let port: u16 = narrow(8081);
        assert_eq!(port, 8081);
        let speed: u8 = narrow(300);
        assert_eq!(speed, 0);
    }

    // ── read_settings_file ──────────────────────────────────────────

    #[test]
    fn missing_file_returns_defaults() {
        let settings = read_settings_file(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings, ControllerSettings::default());
    }

    #[test]
    fn partial_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"device": {"host": "10.0.0.7"}, "session": {"heartbeatIntervalMs": 2000}}"#,
        )
        .unwrap();

        let settings = read_settings_file(&path).unwrap();
        assert_eq!(settings.device.host, "10.0.0.7");
        assert_eq!(settings.device.port, 81);
        assert_eq!(settings.session.heartbeat_interval_ms, 2000);
        assert_eq!(settings.session.connect_timeout_ms, 10_000);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        let result = read_settings_file(&path);
        assert!(matches!(
            result.unwrap_err(),
            SettingsError::Parse { path: p, .. } if p == path
        ));
    }

    #[test]
    fn out_of_range_file_value_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"drive": {"defaultSpeed": 20}}"#).unwrap();

        let settings = read_settings_file(&path).unwrap();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidValue { field: "drive.defaultSpeed", .. })
        ));
    }
}
