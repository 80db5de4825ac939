//! # snakebot-session
//!
//! The controller's connection manager. A [`Session`] owns the single
//! channel to the robot and runs as one actor task: user requests, channel
//! events and timer firings are all processed there, in order, so session
//! state needs no locks.
//!
//! - [`SessionHandle`]: non-blocking `connect` / `disconnect` / `send` and a
//!   `watch`-based subscription to [`SessionSnapshot`]s
//! - [`channel`]: the [`Connector`] seam, generation-tagged [`ChannelEvent`]s
//! - [`transport`]: the `tokio-tungstenite` implementation of [`Connector`]
//! - [`supervisor`]: cancellable heartbeat and connect-timeout timers
//! - [`testing`]: an in-memory [`Connector`] for driving sessions in tests

#![deny(unsafe_code)]

pub mod channel;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod supervisor;
pub mod testing;
pub mod transport;

pub use channel::{ChannelEvent, ChannelHandle, Connector, EventSink, Generation, ReadyState};
pub use config::{MIN_TIMER_PERIOD, SessionConfig};
pub use error::TransportError;
pub use session::{Session, SessionClosed, SessionHandle};
pub use state::{ConnectionState, SessionSnapshot, Target};
pub use transport::WsConnector;
