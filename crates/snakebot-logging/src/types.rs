//! Debug log entry types.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Severity of a session log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogSeverity {
    /// Routine progress.
    Info,
    /// A step completed (channel opened).
    Success,
    /// Something worth a look, not a failure.
    Warn,
    /// A failure.
    Error,
}

impl LogSeverity {
    /// Upper-case label used in rendered entries.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    /// Whether the entry reports a failure.
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the session debug log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Wall-clock time the entry was recorded.
    pub timestamp: DateTime<Local>,
    /// Severity.
    pub severity: LogSeverity,
    /// Human-readable message.
    pub message: String,
}

impl LogEntry {
    /// Entry stamped with the current local time.
    pub fn new(severity: LogSeverity, message: impl Into<String>) -> Self {
        Self::at(Local::now(), severity, message)
    }

    /// Entry with an explicit timestamp.
    pub fn at(timestamp: DateTime<Local>, severity: LogSeverity, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            severity,
            message: message.into(),
        }
    }

    /// Emit the entry through `tracing`.
    pub fn trace(&self) {
        match self.severity {
            LogSeverity::Info => tracing::info!(target: "snakebot::session", "{}", self.message),
            LogSeverity::Success => {
                tracing::info!(target: "snakebot::session", success = true, "{}", self.message);
            }
            LogSeverity::Warn => tracing::warn!(target: "snakebot::session", "{}", self.message),
            LogSeverity::Error => tracing::error!(target: "snakebot::session", "{}", self.message),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.format("%H:%M:%S"),
            self.severity,
            self.message
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
