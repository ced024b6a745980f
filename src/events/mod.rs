//! Lifecycle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the idle supervisor.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `IdleSupervisor` (call tracking, timer arming,
//!   explicit shutdown) and the spawned timer task (timeout expiry).
//! - **Consumers**: `IdleSupervisor`'s subscriber listener (fans out to the
//!   `SubscriberSet`), plus any receiver obtained from the public bus.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
