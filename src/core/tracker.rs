//! # Lock-free counter of outstanding calls.
//!
//! [`CallTracker`] tracks how many tracked requests are currently in
//! flight. Both mutation paths return the resulting count so the caller can
//! observe the 0↔1 transitions that drive timer arming and disarming.
//!
//! The tracker is deliberately dumb: it owns the count and nothing else.
//! Keeping the count consistent with the pending-timer state is the
//! supervisor's job, which holds both behind a single critical section.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Atomic counter of outstanding tracked calls.
///
/// `increment`/`decrement` are lock-free, never block, and are safe under
/// arbitrary concurrent invocation.
///
/// ## Caller protocol
/// Every `increment()` must eventually be paired with exactly one
/// `decrement()`. Decrementing below zero is a protocol violation and
/// wraps; it cannot occur while the pairing is respected.
#[derive(Debug, Default)]
pub struct CallTracker {
    outstanding: AtomicUsize,
}

impl CallTracker {
    /// Creates a tracker with a count of zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically adds one and returns the resulting count.
    #[inline]
    pub fn increment(&self) -> usize {
        self.outstanding.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Atomically subtracts one and returns the resulting count.
    #[inline]
    pub fn decrement(&self) -> usize {
        self.outstanding.fetch_sub(1, Ordering::SeqCst) - 1
    }

    /// Current count (a snapshot; may be stale by the time it is read).
    #[inline]
    pub fn get(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}
