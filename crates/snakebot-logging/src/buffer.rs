//! Bounded, append-only session log.

use std::collections::VecDeque;

use serde::Serialize;
use snakebot_core::constants::DEFAULT_LOG_CAPACITY;

use crate::types::{LogEntry, LogSeverity};

/// Keeps the most recent `capacity` entries in arrival order; the oldest
/// entry is evicted when a new one would exceed the capacity.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    #[serde(skip)]
    capacity: usize,
}

impl LogBuffer {
    /// Empty buffer holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest if full. Returns the evicted entry.
    pub fn push(&mut self, entry: LogEntry) -> Option<LogEntry> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Record a message: stamp it, mirror it to `tracing`, append it.
    pub fn record(&mut self, severity: LogSeverity, message: impl Into<String>) {
        let entry = LogEntry::new(severity, message);
        entry.trace();
        let _ = self.push(entry);
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Count of entries at the given severity.
    pub fn count(&self, severity: LogSeverity) -> usize {
        self.entries.iter().filter(|e| e.severity == severity).count()
    }

    /// Rendered lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
