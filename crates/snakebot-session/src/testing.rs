//! In-memory [`Connector`] for driving a session without a network.
//!
//! Every `open` records a [`MockChannel`]; tests then play the device's
//! side by emitting events and inspecting the frames the session wrote.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::channel::{ChannelEvent, ChannelHandle, Connector, EventSink, Generation};
use crate::error::TransportError;

/// The device end of one channel opened through a [`MockConnector`].
#[derive(Clone, Debug)]
pub struct MockChannel {
    url: String,
    events: EventSink,
    outbound: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
    cancel: CancellationToken,
}

impl MockChannel {
    /// URL the session asked for.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Generation the session assigned to this channel.
    pub fn generation(&self) -> Generation {
        self.events.generation()
    }

    /// Report the channel as open.
    pub fn open(&self) {
        let _ = self.events.emit(ChannelEvent::Opened);
    }

    /// Deliver an inbound text frame.
    pub fn frame(&self, text: impl Into<String>) {
        let _ = self.events.emit(ChannelEvent::Frame(text.into()));
    }

    /// Report a transport error.
    pub fn error(&self, message: impl Into<String>) {
        let _ = self.events.emit(ChannelEvent::Error(message.into()));
    }

    /// Report the channel as closed.
    pub fn close(&self, code: Option<u16>, reason: impl Into<String>) {
        let _ = self.events.emit(ChannelEvent::Closed {
            code,
            reason: reason.into(),
        });
    }

    /// Frames written by the session since the last call.
    pub fn sent(&self) -> Vec<String> {
        let mut outbound = self.outbound.lock();
        let mut frames = Vec::new();
        while let Ok(frame) = outbound.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// Whether the session has closed or dropped its handle.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[derive(Debug, Default)]
struct MockState {
    channels: Vec<MockChannel>,
    fail_next: Option<String>,
}

/// A [`Connector`] that records every channel it opens.
#[derive(Clone, Debug, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    /// Empty connector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every channel opened so far, oldest first.
    pub fn channels(&self) -> Vec<MockChannel> {
        self.state.lock().channels.clone()
    }

    /// Most recently opened channel.
    pub fn last(&self) -> Option<MockChannel> {
        self.state.lock().channels.last().cloned()
    }

    /// Number of `open` calls that produced a channel.
    pub fn open_count(&self) -> usize {
        self.state.lock().channels.len()
    }

    /// Channels the session has not closed.
    pub fn live_count(&self) -> usize {
        self.state
            .lock()
            .channels
            .iter()
            .filter(|c| !c.is_closed())
            .count()
    }

    /// Make the next `open` fail with `reason`.
    pub fn fail_next(&self, reason: impl Into<String>) {
        self.state.lock().fail_next = Some(reason.into());
    }
}

impl Connector for MockConnector {
    fn open(&self, url: &str, events: EventSink) -> Result<ChannelHandle, TransportError> {
        let mut state = self.state.lock();
        if let Some(reason) = state.fail_next.take() {
            return Err(TransportError::Refused(reason));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        state.channels.push(MockChannel {
            url: url.to_string(),
            events,
            outbound: Arc::new(Mutex::new(rx)),
            cancel: cancel.clone(),
        });
        Ok(ChannelHandle::new(tx, cancel))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn records_channels_and_frames() {
        let connector = MockConnector::new();
        let (sink, mut events) = EventSink::channel(Generation::new(3));
        let handle = connector.open("ws://robot:81", sink).unwrap();

        let channel = connector.last().unwrap();
        assert_eq!(channel.url(), "ws://robot:81");
        assert_eq!(channel.generation(), Generation::new(3));

        assert!(handle.send_text("a".into()));
        assert!(handle.send_text("b".into()));
        assert_eq!(channel.sent(), vec!["a", "b"]);
        assert!(channel.sent().is_empty());

        channel.open();
        assert_matches!(events.try_recv(), Ok((g, ChannelEvent::Opened)) if g == Generation::new(3));
    }

    #[test]
    fn dropping_handle_closes_channel() {
        let connector = MockConnector::new();
        let (sink, _events) = EventSink::channel(Generation::new(1));
        let handle = connector.open("ws://robot:81", sink).unwrap();
        assert_eq!(connector.live_count(), 1);
        drop(handle);
        assert!(connector.last().unwrap().is_closed());
        assert_eq!(connector.live_count(), 0);
    }

    #[test]
    fn fail_next_applies_once() {
        let connector = MockConnector::new();
        connector.fail_next("no route");
        let (sink, _events) = EventSink::channel(Generation::new(1));
        assert_matches!(
            connector.open("ws://robot:81", sink.clone()),
            Err(TransportError::Refused(reason)) if reason == "no route"
        );
        assert!(connector.open("ws://robot:81", sink).is_ok());
        assert_eq!(connector.open_count(), 1);
    }
}
