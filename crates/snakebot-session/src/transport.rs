//! WebSocket transport over `tokio-tungstenite`.
//!
//! One task per channel: it performs the handshake, forwards inbound text
//! frames to the session, writes queued outbound frames, and sends a normal
//! close frame when the session closes the handle. Failures follow browser
//! semantics: an `Error` event followed by `Closed` with code 1006.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::channel::{ChannelEvent, ChannelHandle, Connector, EventSink};
use crate::error::TransportError;

/// Close code reported when the connection dropped without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Close code reported when the peer's close frame carried no status.
pub const NO_STATUS_RECEIVED: u16 = 1005;

/// Opens real WebSocket channels.
#[derive(Clone, Copy, Debug, Default)]
pub struct WsConnector;

impl WsConnector {
    /// Create a connector.
    pub fn new() -> Self {
        Self
    }
}

impl Connector for WsConnector {
    fn open(&self, url: &str, events: EventSink) -> Result<ChannelHandle, TransportError> {
        validate_url(url)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TransportError::NoRuntime)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let _task = runtime.spawn(drive_channel(url.to_string(), events, rx, cancel.clone()));
        Ok(ChannelHandle::new(tx, cancel))
    }
}

fn validate_url(url: &str) -> Result<(), TransportError> {
    let invalid = |reason: String| TransportError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let request = url.into_client_request().map_err(|e| invalid(e.to_string()))?;
    match request.uri().host() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(invalid("missing host".into())),
    }
}

async fn drive_channel(
    url: String,
    events: EventSink,
    mut outbound: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
) {
    let generation = events.generation();
    debug!(%url, %generation, "opening channel");

    let connected = tokio::select! {
        () = cancel.cancelled() => {
            debug!(%generation, "channel closed before handshake completed");
            return;
        }
        result = connect_async(url.as_str()) => result,
    };
    let (ws, _response) = match connected {
        Ok(ok) => ok,
        Err(e) => {
            let _ = events.emit(ChannelEvent::Error(e.to_string()));
            let _ = events.emit(abnormal_close());
            return;
        }
    };
    if !events.emit(ChannelEvent::Opened) {
        return;
    }

    let (mut sink, mut stream) = ws.split();
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                let frame = CloseFrame {
                    code: CloseCode::Normal,
                    reason: "client disconnect".into(),
                };
                let _ = sink.send(Message::Close(Some(frame))).await;
                // No `Closed` event: the session already dropped this channel.
                debug!(%generation, "channel closed by session");
                break;
            }
            Some(text) = outbound.recv() => {
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    let _ = events.emit(ChannelEvent::Error(e.to_string()));
                    let _ = events.emit(abnormal_close());
                    break;
                }
            }
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    if !events.emit(ChannelEvent::Frame(text.as_str().to_owned())) {
                        break;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = frame.map_or((NO_STATUS_RECEIVED, String::new()), |f| {
                        (u16::from(f.code), f.reason.as_str().to_owned())
                    });
                    let _ = events.emit(ChannelEvent::Closed { code: Some(code), reason });
                    break;
                }
                Some(Ok(other)) => {
                    trace!(%generation, kind = ?other, "ignoring non-text frame");
                }
                Some(Err(e)) => {
                    let _ = events.emit(ChannelEvent::Error(e.to_string()));
                    let _ = events.emit(abnormal_close());
                    break;
                }
                None => {
                    let _ = events.emit(abnormal_close());
                    break;
                }
            }
        }
    }
}

fn abnormal_close() -> ChannelEvent {
    ChannelEvent::Closed {
        code: Some(ABNORMAL_CLOSURE),
        reason: String::new(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
