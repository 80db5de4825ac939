//! Cancellable session timers: the heartbeat and the connect timeout.
//!
//! Each timer runs as its own task and reports through a callback; the
//! returned [`Supervisor`] owns the task's [`CancellationToken`]. A
//! supervisor belongs to exactly one channel generation and is stopped when
//! the session leaves the state that armed it.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::MIN_TIMER_PERIOD;

/// Outcome of the heartbeat loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatResult {
    /// The heartbeat was cancelled externally.
    Cancelled,
    /// The tick callback reported that the session is gone.
    SessionGone,
}

/// Outcome of a one-shot deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineResult {
    /// The deadline elapsed and the callback ran.
    Fired,
    /// Cancelled before elapsing.
    Cancelled,
}

/// Run heartbeat ticks until cancelled.
///
/// The first tick fires one full `interval` after the call, then every
/// `interval` (never shorter than [`MIN_TIMER_PERIOD`]). `on_tick` returns `false` when nobody is listening anymore,
/// which ends the loop.
pub async fn run_heartbeat<F>(
    interval: Duration,
    cancel: CancellationToken,
    mut on_tick: F,
) -> HeartbeatResult
where
    F: FnMut() -> bool,
{
    let interval = interval.max(MIN_TIMER_PERIOD);
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return HeartbeatResult::Cancelled,
            _ = ticker.tick() => {
                if !on_tick() {
                    return HeartbeatResult::SessionGone;
                }
            }
        }
    }
}

/// Wait for `after`, then run `on_fire` once, unless cancelled first.
pub async fn run_deadline<F>(after: Duration, cancel: CancellationToken, on_fire: F) -> DeadlineResult
where
    F: FnOnce(),
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => DeadlineResult::Cancelled,
        () = time::sleep(after) => {
            on_fire();
            DeadlineResult::Fired
        }
    }
}

/// Owner of one running timer task.
///
/// [`stop`](Self::stop) cancels the task exactly once; further calls and the
/// implicit stop on drop are no-ops.
#[derive(Debug)]
pub struct Supervisor {
    name: &'static str,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Supervisor {
    /// Spawn a heartbeat task.
    pub fn heartbeat<F>(interval: Duration, on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let result = run_heartbeat(interval, token, on_tick).await;
            tracing::trace!(?result, "heartbeat stopped");
        });
        Self {
            name: "heartbeat",
            cancel,
            task: Some(task),
        }
    }

    /// Spawn a one-shot deadline task.
    pub fn deadline<F>(after: Duration, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let result = run_deadline(after, token, on_fire).await;
            tracing::trace!(?result, "deadline finished");
        });
        Self {
            name: "deadline",
            cancel,
            task: Some(task),
        }
    }

    /// Stop the timer. Returns `true` only for the call that actually
    /// stopped it.
    pub fn stop(&mut self) -> bool {
        let Some(_task) = self.task.take() else {
            return false;
        };
        self.cancel.cancel();
        tracing::trace!(timer = self.name, "timer stopped");
        true
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.task.is_none()
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
