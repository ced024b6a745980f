//! # Cancellable one-shot delayed action.
//!
//! [`IdleTimer`] arranges for an action to run once after a delay and hands
//! back a [`TimerHandle`] that can disarm it. Cancellation is **best
//! effort**: once the delay has elapsed and the action has begun, cancelling
//! does not stop it.
//!
//! ```text
//! schedule(delay, action) ──► spawned task:
//!                               select! {
//!                                 cancelled ──► exit silently
//!                                 sleep(delay) elapsed ──► action.await
//!                               }
//! ```
//!
//! The timer carries no invariant checks of its own; deciding whether a
//! schedule or cancel is *legal* belongs to the supervisor. Cancelling an
//! already-fired or already-cancelled timer is a silent no-op here, never an
//! error.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// One-shot scheduler for delayed actions.
///
/// Owned by the supervisor; at most one scheduled action is outstanding per
/// owner at any time (enforced by the owner, not by the timer).
#[derive(Debug, Default)]
pub struct IdleTimer;

impl IdleTimer {
    /// Creates a new timer.
    pub fn new() -> Self {
        Self
    }

    /// Arranges for `action` to run once, `delay` from now.
    ///
    /// The action runs on a spawned task, concurrently with any caller
    /// thread. Dropping the returned handle does **not** cancel the action;
    /// call [`TimerHandle::cancel`] explicitly.
    ///
    /// Must be called within a Tokio runtime.
    pub fn schedule<F>(&self, delay: Duration, action: F) -> TimerHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let armed = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = armed.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    action.await;
                }
            }
        });
        TimerHandle { token }
    }
}

/// Handle to a scheduled, not-yet-fired action.
#[derive(Debug)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    /// Attempts to prevent the scheduled action from running.
    ///
    /// Best effort: if the delay has already elapsed and the action has
    /// begun, it still completes. Cancelling twice, or cancelling after the
    /// action fired, is a no-op.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}
