//! # snakebot-logging
//!
//! Two logging surfaces:
//!
//! - Process diagnostics via `tracing`, set up once by [`init_subscriber`].
//! - The session's observability sink: a bounded [`LogBuffer`] of
//!   [`LogEntry`] values that a debug panel renders. Every entry appended to
//!   the buffer is mirrored to `tracing` at the matching level.

#![deny(unsafe_code)]

pub mod buffer;
pub mod types;

pub use buffer::LogBuffer;
pub use types::{LogEntry, LogSeverity};

/// Level applied to dependencies when a bare level is configured.
const DEPENDENCY_LEVEL: &str = "warn";

/// Target prefix shared by every controller crate and the session log.
const OWN_TARGETS: &str = "snakebot";

/// `EnvFilter` directive for a configured log level.
///
/// A bare level such as `debug` applies to the controller's own targets
/// while dependencies (`tungstenite`, `tokio`) stay at `warn`. Anything else
/// is taken as a full directive.
pub fn filter_directive(level: &str) -> String {
    let level = level.trim();
    if level.is_empty() {
        return DEPENDENCY_LEVEL.to_string();
    }
    if level.eq_ignore_ascii_case("off") {
        return "off".to_string();
    }
    match level.parse::<tracing::Level>() {
        Ok(parsed) => {
            let parsed = parsed.as_str().to_ascii_lowercase();
            format!("{DEPENDENCY_LEVEL},{OWN_TARGETS}={parsed}")
        }
        Err(_) => level.to_string(),
    }
}

/// Install the global stderr subscriber.
///
/// `RUST_LOG` wins over `level`. Returns `false` when a subscriber was
/// already installed, in which case nothing changes.
pub fn init_subscriber(level: &str) -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .is_ok()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
