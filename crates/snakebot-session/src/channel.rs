//! Channel abstraction between the session and a transport.
//!
//! Every channel a session opens gets a fresh [`Generation`]. Transports
//! report progress through an [`EventSink`] bound to that generation, so the
//! session can tell events of its live channel from late events of a
//! channel it already replaced.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;

/// Identity of one channel instance within a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// Wrap a raw counter value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The generation after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw counter value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Something that happened on a channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Handshake completed; the channel can carry frames.
    Opened,
    /// A text frame arrived.
    Frame(String),
    /// The transport reported a failure.
    Error(String),
    /// The channel is gone.
    Closed {
        /// WebSocket close code, if one was received.
        code: Option<u16>,
        /// Close reason, possibly empty.
        reason: String,
    },
}

/// Transport-side view of a channel's lifecycle, as tracked by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadyState {
    /// Handshake in progress.
    Connecting,
    /// Frames can flow.
    Open,
    /// Close requested or failure reported.
    Closing,
    /// Gone.
    Closed,
}

impl ReadyState {
    /// Numeric code in WebSocket `readyState` order.
    pub const fn code(self) -> u8 {
        match self {
            Self::Connecting => 0,
            Self::Open => 1,
            Self::Closing => 2,
            Self::Closed => 3,
        }
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "CONNECTING",
            Self::Open => "OPEN",
            Self::Closing => "CLOSING",
            Self::Closed => "CLOSED",
        };
        write!(f, "{} ({name})", self.code())
    }
}

type Deliver = dyn Fn(Generation, ChannelEvent) -> bool + Send + Sync;

/// Where a transport reports the events of one channel.
#[derive(Clone)]
pub struct EventSink {
    generation: Generation,
    deliver: Arc<Deliver>,
}

impl EventSink {
    /// Sink that hands each event, tagged with `generation`, to `deliver`.
    /// `deliver` returns `false` once nobody is listening.
    pub fn new<F>(generation: Generation, deliver: F) -> Self
    where
        F: Fn(Generation, ChannelEvent) -> bool + Send + Sync + 'static,
    {
        Self {
            generation,
            deliver: Arc::new(deliver),
        }
    }

    /// Sink paired with a receiver, for driving a transport directly.
    pub fn channel(
        generation: Generation,
    ) -> (Self, mpsc::UnboundedReceiver<(Generation, ChannelEvent)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self::new(generation, move |g, event| tx.send((g, event)).is_ok());
        (sink, rx)
    }

    /// Generation this sink tags events with.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Report an event. Returns `false` if the receiving side is gone.
    pub fn emit(&self, event: ChannelEvent) -> bool {
        (self.deliver)(self.generation, event)
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// The session's exclusive handle on an open or opening channel.
///
/// Dropping the handle closes the channel.
#[derive(Debug)]
pub struct ChannelHandle {
    outbound: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

impl ChannelHandle {
    /// Handle writing frames into `outbound`; `cancel` is fired on close.
    pub fn new(outbound: mpsc::UnboundedSender<String>, cancel: CancellationToken) -> Self {
        Self { outbound, cancel }
    }

    /// Queue a text frame for transmission. Returns `false` if the channel
    /// can no longer carry frames.
    pub fn send_text(&self, frame: String) -> bool {
        !self.cancel.is_cancelled() && self.outbound.send(frame).is_ok()
    }

    /// Whether frames can still be queued.
    pub fn is_ready(&self) -> bool {
        !self.cancel.is_cancelled() && !self.outbound.is_closed()
    }

    /// Ask the transport to close the channel. Repeated calls are no-ops.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Opens channels to the robot.
pub trait Connector: Send + Sync {
    /// Start opening a channel to `url`. Must not block: the outcome is
    /// reported through `events`.
    fn open(&self, url: &str, events: EventSink) -> Result<ChannelHandle, TransportError>;
}

/// Human-readable cause for well-known WebSocket close codes.
pub fn describe_close_code(code: u16) -> Option<&'static str> {
    match code {
        1000 => Some("Normal closure"),
        1001 => Some("Going away - the device is shutting down or restarting"),
        1005 => Some("No status code received"),
        1006 => Some("Abnormal closure - connection failed or was interrupted"),
        1011 => Some("Internal error on the device"),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
