//! # Supervisor configuration.
//!
//! Provides [`Config`], the settings fixed at supervisor construction.
//!
//! ## Field semantics
//! - `idle_timeout`: how long the service may sit with zero outstanding
//!   calls before the shutdown target is invoked.
//! - `bus_capacity`: event bus ring buffer size (min 1; clamped by the Bus).

use std::time::Duration;

/// Configuration for an [`IdleSupervisor`](crate::IdleSupervisor).
///
/// All fields are public for flexibility. Prefer the helper accessors to
/// avoid sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Idle window after the last outstanding call completes.
    ///
    /// The window is armed at construction (the call count starts at zero)
    /// and re-armed on every 1→0 transition of the call count. A new call
    /// arriving before it elapses disarms it.
    pub idle_timeout: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// will skip older items. Minimum value is 1 (enforced by the Bus).
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    ///
    /// The `Bus` should use this value to avoid constructing an invalid
    /// channel.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `idle_timeout = 60s` (a reasonable window for a compile server)
    /// - `bus_capacity = 1024` (good baseline)
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(60),
            bus_capacity: 1024,
        }
    }
}
