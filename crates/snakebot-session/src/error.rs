//! Transport error types.

use thiserror::Error;

/// Failures that prevent a channel from being created at all.
///
/// Errors that happen after creation (refused connection, dropped socket)
/// are reported asynchronously as [`ChannelEvent`](crate::ChannelEvent)s.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The target does not form a usable WebSocket URL.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// No tokio runtime is available to drive the channel.
    #[error("no async runtime available to drive the channel")]
    NoRuntime,
    /// The connector refused to open a channel.
    #[error("connector refused: {0}")]
    Refused(String),
}
