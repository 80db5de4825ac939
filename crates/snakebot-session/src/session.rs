//! The session actor and its handle.
//!
//! All session state lives in one task. Inputs arrive on two queues:
//! user requests from [`SessionHandle`]s, and internal events (channel
//! events, connect timeout, heartbeat ticks) tagged with the channel
//! [`Generation`] that produced them. Internal events are drained first, so
//! anything a channel reported before a request was issued is applied
//! before that request. Events whose generation is not the live channel's
//! are dropped.
//!
//! State is published through a `watch` channel; the actor mutates the
//! published [`SessionSnapshot`] in place and every subscriber is notified.

use std::sync::Arc;
use std::time::Duration;

use snakebot_core::{Command, ServerMessage, decode_message, encode_command};
use snakebot_logging::LogSeverity;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, trace};

use crate::channel::{
    ChannelEvent, ChannelHandle, Connector, EventSink, Generation, ReadyState, describe_close_code,
};
use crate::config::SessionConfig;
use crate::state::{ConnectionState, SessionSnapshot, Target};
use crate::supervisor::Supervisor;
use crate::transport::ABNORMAL_CLOSURE;

const POSSIBLE_CAUSES: &str =
    "Possible causes: 1) Not connected to the robot's WiFi, 2) Robot not running, 3) Wrong IP";

/// Returned by [`SessionHandle::wait_for`] when the session actor has exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("session has shut down")]
pub struct SessionClosed;

enum Request {
    Connect(Target),
    Disconnect,
    Send(Command),
    ClearLogs,
    Flush(oneshot::Sender<()>),
    Shutdown,
}

enum Internal {
    Channel(Generation, ChannelEvent),
    ConnectTimeout(Generation),
    HeartbeatTick(Generation),
}

// ─────────────────────────────────────────────────────────────────────────────
// Handle
// ─────────────────────────────────────────────────────────────────────────────

/// Cheap, cloneable access to a running [`Session`].
///
/// Every operation returns immediately; outcomes are observed through
/// [`snapshot`](Self::snapshot) or [`subscribe`](Self::subscribe). Requests
/// to a session that has shut down are silently dropped.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    requests: mpsc::UnboundedSender<Request>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Open a channel to `host:port`, replacing any existing channel.
    pub fn connect(&self, host: impl Into<String>, port: u16) {
        self.connect_to(Target::new(host, port));
    }

    /// Open a channel to `host` on the firmware's default port.
    pub fn connect_default(&self, host: impl Into<String>) {
        self.connect_to(Target::with_default_port(host));
    }

    /// Open a channel to `target`, replacing any existing channel.
    pub fn connect_to(&self, target: Target) {
        self.request(Request::Connect(target));
    }

    /// Tear down the channel and clear telemetry and error.
    pub fn disconnect(&self) {
        self.request(Request::Disconnect);
    }

    /// Transmit a command if connected; otherwise the rejection is logged.
    pub fn send(&self, command: Command) {
        self.request(Request::Send(command));
    }

    /// Empty the debug log.
    pub fn clear_logs(&self) {
        self.request(Request::ClearLogs);
    }

    /// Stop the session actor, closing any channel.
    pub fn shutdown(&self) {
        self.request(Request::Shutdown);
    }

    /// Resolves once everything queued before this call has been applied.
    pub async fn flush(&self) -> Result<(), SessionClosed> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(Request::Flush(tx))
            .map_err(|_| SessionClosed)?;
        rx.await.map_err(|_| SessionClosed)
    }

    /// Current state, cloned.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.snapshots.borrow().state
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until the published state satisfies `predicate`.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<SessionSnapshot, SessionClosed>
    where
        F: FnMut(&SessionSnapshot) -> bool,
    {
        let mut rx = self.snapshots.clone();
        let snapshot = rx.wait_for(|s| predicate(s)).await.map_err(|_| SessionClosed)?;
        Ok(snapshot.clone())
    }

    fn request(&self, request: Request) {
        if self.requests.send(request).is_err() {
            debug!("session has shut down, request dropped");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Actor
// ─────────────────────────────────────────────────────────────────────────────

struct LiveChannel {
    generation: Generation,
    target: Target,
    handle: ChannelHandle,
    ready: ReadyState,
    connect_timer: Option<Supervisor>,
    heartbeat: Option<Supervisor>,
}

impl LiveChannel {
    fn stop_timers(&mut self) {
        if let Some(mut timer) = self.connect_timer.take() {
            let _ = timer.stop();
        }
        if let Some(mut heartbeat) = self.heartbeat.take() {
            let _ = heartbeat.stop();
        }
    }

    fn teardown(mut self) {
        self.stop_timers();
        self.ready = ReadyState::Closed;
        self.handle.close();
    }
}

/// The session: owner of the one channel to the robot.
///
/// Construct with [`Session::new`] and drive with [`Session::run`], or use
/// [`Session::spawn`] to do both. The session stops when every
/// [`SessionHandle`] is dropped or [`SessionHandle::shutdown`] is called.
pub struct Session {
    config: SessionConfig,
    connector: Arc<dyn Connector>,
    requests: mpsc::UnboundedReceiver<Request>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    snapshot: watch::Sender<SessionSnapshot>,
    generation: Generation,
    live: Option<LiveChannel>,
}

impl Session {
    /// Build a session and its first handle.
    pub fn new(config: SessionConfig, connector: Arc<dyn Connector>) -> (Self, SessionHandle) {
        let config = config.sanitized();
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) =
            watch::channel(SessionSnapshot::with_log_capacity(config.log_capacity));

        let session = Self {
            config,
            connector,
            requests: request_rx,
            internal_tx,
            internal_rx,
            snapshot: snapshot_tx,
            generation: Generation::default(),
            live: None,
        };
        let handle = SessionHandle {
            requests: request_tx,
            snapshots: snapshot_rx,
        };
        (session, handle)
    }

    /// Build a session and run it on the current tokio runtime.
    pub fn spawn(config: SessionConfig, connector: Arc<dyn Connector>) -> SessionHandle {
        let (session, handle) = Self::new(config, connector);
        let _task = tokio::spawn(session.run());
        handle
    }

    /// Process events until shut down.
    pub async fn run(mut self) {
        debug!("session started");
        loop {
            tokio::select! {
                biased;
                Some(event) = self.internal_rx.recv() => self.on_internal(event),
                request = self.requests.recv() => match request {
                    Some(Request::Shutdown) | None => break,
                    Some(request) => self.on_request(request),
                },
            }
        }
        if let Some(live) = self.live.take() {
            live.teardown();
        }
        debug!("session stopped");
    }

    // ── Requests ────────────────────────────────────────────────────

    fn on_request(&mut self, request: Request) {
        match request {
            Request::Connect(target) => self.connect(target),
            Request::Disconnect => self.disconnect(),
            Request::Send(command) => self.send(&command),
            Request::ClearLogs => self.snapshot.send_modify(|s| s.logs.clear()),
            Request::Flush(done) => {
                let _ = done.send(());
            }
            Request::Shutdown => {}
        }
    }

    fn connect(&mut self, target: Target) {
        self.teardown();
        self.generation = self.generation.next();
        let generation = self.generation;
        let url = target.url();

        self.snapshot.send_modify(|s| {
            s.state = ConnectionState::Connecting;
            s.target = Some(target.clone());
            s.last_error = None;
            s.last_status = None;
        });
        self.log(LogSeverity::Info, format!("Attempting connection to {url}"));

        let internal = self.internal_tx.clone();
        let sink = EventSink::new(generation, move |g, event| {
            internal.send(Internal::Channel(g, event)).is_ok()
        });
        let handle = match self.connector.open(&url, sink) {
            Ok(handle) => handle,
            Err(e) => {
                self.log(LogSeverity::Error, format!("Failed to create channel: {e}"));
                self.snapshot.send_modify(|s| {
                    s.state = ConnectionState::Error;
                    s.last_error = Some(format!("Failed to create connection: {e}"));
                });
                return;
            }
        };
        self.log(LogSeverity::Info, "Channel created");

        let internal = self.internal_tx.clone();
        let connect_timer = Supervisor::deadline(self.config.connect_timeout, move || {
            let _ = internal.send(Internal::ConnectTimeout(generation));
        });

        self.live = Some(LiveChannel {
            generation,
            target,
            handle,
            ready: ReadyState::Connecting,
            connect_timer: Some(connect_timer),
            heartbeat: None,
        });
    }

    fn disconnect(&mut self) {
        self.log(LogSeverity::Info, "Disconnecting...");
        self.teardown();
        self.snapshot.send_modify(|s| {
            s.state = ConnectionState::Disconnected;
            s.last_status = None;
            s.last_error = None;
        });
        self.log(LogSeverity::Info, "Disconnected");
    }

    fn send(&self, command: &Command) {
        let state = self.snapshot.borrow().state;
        let channel = self
            .live
            .as_ref()
            .filter(|live| live.ready == ReadyState::Open && live.handle.is_ready());

        let Some(live) = channel.filter(|_| state == ConnectionState::Connected) else {
            let ready = self
                .live
                .as_ref()
                .map_or_else(|| "no channel".to_string(), |live| live.ready.to_string());
            self.log(
                LogSeverity::Error,
                format!("Cannot send command - channel not open. State: {ready}"),
            );
            return;
        };

        let frame = match encode_command(command) {
            Ok(frame) => frame,
            Err(e) => {
                self.log(LogSeverity::Error, e.to_string());
                return;
            }
        };
        let log_line = (!command.is_ping()).then(|| format!("Sent: {frame}"));
        if !live.handle.send_text(frame) {
            self.log(
                LogSeverity::Error,
                format!("Failed to transmit {} command: channel closed", command.kind()),
            );
            return;
        }
        match log_line {
            Some(line) => self.log(LogSeverity::Info, line),
            None => trace!(generation = %live.generation, "ping sent"),
        }
    }

    // ── Internal events ─────────────────────────────────────────────

    fn on_internal(&mut self, event: Internal) {
        match event {
            Internal::Channel(generation, event) if self.is_live(generation) => {
                self.on_channel_event(event);
            }
            Internal::ConnectTimeout(generation) if self.is_live(generation) => {
                self.on_connect_timeout();
            }
            Internal::HeartbeatTick(generation) if self.is_live(generation) => {
                if self.snapshot.borrow().state == ConnectionState::Connected {
                    self.send(&Command::Ping);
                }
            }
            Internal::Channel(generation, _)
            | Internal::ConnectTimeout(generation)
            | Internal::HeartbeatTick(generation) => {
                debug!(%generation, live = %self.generation, "ignoring event from superseded channel");
            }
        }
    }

    fn is_live(&self, generation: Generation) -> bool {
        self.live.as_ref().is_some_and(|live| live.generation == generation)
    }

    fn on_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Opened => self.on_opened(),
            ChannelEvent::Frame(text) => self.on_frame(&text),
            ChannelEvent::Error(message) => self.on_error(&message),
            ChannelEvent::Closed { code, reason } => self.on_closed(code, &reason),
        }
    }

    fn on_opened(&mut self) {
        let Some(live) = self.live.as_mut() else {
            return;
        };
        if live.ready != ReadyState::Connecting {
            debug!(generation = %live.generation, ready = %live.ready, "open event in unexpected state");
            return;
        }
        if let Some(mut timer) = live.connect_timer.take() {
            let _ = timer.stop();
        }
        live.ready = ReadyState::Open;

        let generation = live.generation;
        let internal = self.internal_tx.clone();
        live.heartbeat = Some(Supervisor::heartbeat(self.config.heartbeat_interval, move || {
            internal.send(Internal::HeartbeatTick(generation)).is_ok()
        }));
        let url = live.target.url();

        self.snapshot.send_modify(|s| {
            s.state = ConnectionState::Connected;
            s.last_error = None;
        });
        self.log(LogSeverity::Success, format!("Connected to {url}"));
    }

    fn on_frame(&mut self, text: &str) {
        match decode_message(text) {
            Ok(ServerMessage::Status(status)) => {
                self.snapshot.send_modify(|s| s.last_status = Some(status));
            }
            Ok(ServerMessage::Error { message }) => {
                self.log(LogSeverity::Error, format!("Robot error: {message}"));
                self.snapshot.send_modify(|s| s.last_error = Some(message));
            }
            Ok(ServerMessage::Pong) => self.log(LogSeverity::Info, "Pong received"),
            Err(e) => self.log(LogSeverity::Error, format!("Failed to parse message: {e}")),
        }
    }

    fn on_error(&mut self, message: &str) {
        let Some(live) = self.live.as_mut() else {
            return;
        };
        live.stop_timers();
        let ready = live.ready;
        if ready == ReadyState::Connecting {
            live.handle.close();
        }
        live.ready = ReadyState::Closing;

        self.log(
            LogSeverity::Error,
            format!("Channel error: {message}. ReadyState: {ready}"),
        );
        self.log(LogSeverity::Warn, POSSIBLE_CAUSES);
        self.snapshot.send_modify(|s| {
            s.state = ConnectionState::Error;
            s.last_error = Some("Connection error - check debug logs".to_string());
        });
    }

    fn on_closed(&mut self, code: Option<u16>, reason: &str) {
        if let Some(live) = self.live.take() {
            live.teardown();
        }
        let code_text = code.map_or_else(|| "none".to_string(), |c| c.to_string());
        let reason = if reason.is_empty() {
            "No reason provided"
        } else {
            reason
        };
        self.log(
            LogSeverity::Warn,
            format!("Channel closed. Code: {code_text}, Reason: {reason}"),
        );
        if let Some((code, cause)) = code.and_then(|c| describe_close_code(c).map(|d| (c, d))) {
            let severity = if code == ABNORMAL_CLOSURE {
                LogSeverity::Error
            } else {
                LogSeverity::Info
            };
            self.log(severity, format!("Code {code}: {cause}"));
        }
        self.snapshot.send_modify(|s| {
            s.state = ConnectionState::Disconnected;
            s.last_status = None;
        });
    }

    fn on_connect_timeout(&mut self) {
        let still_connecting = self
            .live
            .as_ref()
            .is_some_and(|live| live.ready == ReadyState::Connecting);
        if !still_connecting {
            return;
        }
        // Retire the generation so any closure we provoke cannot move the
        // session out of `error`. `WsConnector` emits no `Closed` after a
        // session-initiated close; other connectors may.
        if let Some(live) = self.live.take() {
            live.teardown();
        }
        self.log(
            LogSeverity::Error,
            format!(
                "Connection timeout after {}",
                format_duration(self.config.connect_timeout)
            ),
        );
        self.snapshot.send_modify(|s| {
            s.state = ConnectionState::Error;
            s.last_error = Some("Connection timeout".to_string());
        });
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn teardown(&mut self) {
        if let Some(live) = self.live.take() {
            debug!(generation = %live.generation, "tearing down channel");
            live.teardown();
        }
    }

    fn log(&self, severity: LogSeverity, message: impl Into<String>) {
        let message = message.into();
        self.snapshot.send_modify(|s| s.logs.record(severity, message));
    }
}

fn format_duration(duration: Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
