//! # Event subscribers for the idle supervisor.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used by the supervisor's listener task.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   IdleSupervisor ── publish(Event) ──► Bus ──► listener task
//!                                                    │
//!                                         SubscriberSet::emit(&Event)
//!                                              ┌─────┴─────┬────────┐
//!                                              ▼           ▼        ▼
//!                                          LogWriter    Metrics   Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use async_trait::async_trait;
//! use idlevisor::{Event, EventKind, Subscribe};
//!
//! struct Metrics;
//!
//! #[async_trait]
//! impl Subscribe for Metrics {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::TimeoutExpired {
//!             // increment an idle-shutdown counter
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
