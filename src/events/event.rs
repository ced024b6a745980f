//! # Lifecycle events emitted by the idle supervisor.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Call events**: tracked calls entering and leaving the supervisor.
//! - **Timer events**: the idle timer being armed and disarmed.
//! - **Terminal events**: the idle timeout expiring, or an explicit shutdown.
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! outstanding call count, timer delays, and the shutdown reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! observed out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use idlevisor::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::TimerScheduled).with_delay(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::TimerScheduled);
//! assert_eq!(ev.delay, Some(Duration::from_secs(5)));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervisor lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Call events ===
    /// A tracked call entered the supervisor.
    ///
    /// Sets:
    /// - `outstanding`: call count after the increment
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CallStarted,

    /// A tracked call left the supervisor (success **or** failure).
    ///
    /// Sets:
    /// - `outstanding`: call count after the decrement
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CallCompleted,

    // === Timer events ===
    /// The idle timer was armed (call count reached zero).
    ///
    /// Sets:
    /// - `delay`: the configured idle timeout
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TimerScheduled,

    /// The pending idle timer was disarmed (a call arrived, or an
    /// explicit shutdown cancelled it).
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TimerCanceled,

    // === Terminal events ===
    /// The idle timeout elapsed; the shutdown target is about to be invoked.
    ///
    /// Sets:
    /// - `reason`: human-readable idle reason handed to the target
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TimeoutExpired,

    /// An explicit `shutdown()` was requested on the supervisor.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ShutdownRequested,

    /// An idle-tracking invariant was breached on a path that has no
    /// caller to return the error to (an abandoned tracked call).
    ///
    /// Sets:
    /// - `reason`: the breached invariant, rendered as text
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    InvariantBreached,
}

/// A single supervisor lifecycle event with metadata.
///
/// Construct with [`Event::now`] and attach payload fields with the
/// `with_*` builders. Which fields are set depends on [`EventKind`];
/// see the variant docs.
#[derive(Debug, Clone)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Wall-clock timestamp taken at construction.
    pub at: SystemTime,
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Outstanding call count after the transition (call events).
    pub outstanding: Option<usize>,
    /// Timer delay (timer events).
    pub delay: Option<Duration>,
    /// Human-readable reason (terminal events).
    pub reason: Option<String>,
}

impl Event {
    /// Creates an event stamped with the current time and the next
    /// global sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            kind,
            at: SystemTime::now(),
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            outstanding: None,
            delay: None,
            reason: None,
        }
    }

    /// Attaches the outstanding call count observed after a transition.
    pub fn with_outstanding(mut self, outstanding: usize) -> Self {
        self.outstanding = Some(outstanding);
        self
    }

    /// Attaches a timer delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Attaches a human-readable reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
