//! Supervision core: idle tracking and shutdown scheduling.
//!
//! This module contains the moving parts behind the decorator:
//! - [`tracker`]: lock-free counter of outstanding tracked calls;
//! - [`timer`]: cancellable one-shot delayed action;
//! - [`supervisor`]: routes tracked calls, arms/disarms the idle timer,
//!   and invokes the shutdown target when the idle window closes.

mod supervisor;
mod timer;
mod tracker;

pub use supervisor::IdleSupervisor;
pub use timer::{IdleTimer, TimerHandle};
pub use tracker::CallTracker;
