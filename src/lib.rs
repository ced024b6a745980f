//! # idlevisor
//!
//! **Idlevisor** is an idle-shutdown supervision library for long-lived
//! request-serving components.
//!
//! It provides a decorator, [`IdleSupervisor`], that wraps a compile
//! service, counts the tracked calls in flight, and shuts the hosting
//! environment down once the service has been quiescent for a configured
//! idle window.
//!
//! ## Architecture
//! ```text
//!             ┌────────────────────────────────────────────────────┐
//!  caller ──► │ IdleSupervisor (decorator, same capability set)    │
//!             │  - CallTracker  (lock-free outstanding-call count) │
//!             │  - IdleTimer    (one-shot, cancellable)            │
//!             │  - TimerSlot    (count+handle, one critical sect.) │
//!             │  - Bus          (lifecycle events, broadcast)      │
//!             └───────┬──────────────────────────┬─────────────────┘
//!                     │ tracked calls            │ idle timeout
//!                     ▼                          ▼
//!             ┌───────────────┐          ┌───────────────┐
//!             │ CompileService│          │ ShutdownTarget│
//!             │  (delegate)   │          │  (terminator) │
//!             └───────────────┘          └───────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! new(delegate, target, cfg, subs)
//!   └─► arm idle timer                       (count starts at 0: Idle)
//!
//! tracked call (sys_info / compile):
//!   ├─► start_call(): count 0→1 ⇒ disarm timer            (Idle → Active)
//!   ├─► delegate method (result passes through unchanged)
//!   └─► end_call():   count 1→0 ⇒ re-arm timer            (Active → Idle)
//!
//! idle window closes:
//!   └─► commit under lock ─► target.shutdown(reason)      (Idle → Terminated)
//!
//! shutdown():
//!   └─► disarm timer, forward to delegate                 (any → Terminated)
//! ```
//!
//! ## Features
//! | Area              | Description                                             | Key types / traits                    |
//! |-------------------|---------------------------------------------------------|---------------------------------------|
//! | **Supervision**   | Wrap a service; shut it down after an idle window.      | [`IdleSupervisor`], [`Config`]        |
//! | **Service API**   | The shared capability set and its value types.          | [`CompileService`], [`CompileRequest`]|
//! | **Shutdown**      | The collaborator invoked when idleness elapses.         | [`ShutdownTarget`], [`ShutdownFn`]    |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, custom).  | [`Subscribe`], [`Event`]              |
//! | **Primitives**    | Reusable counter and one-shot timer.                    | [`CallTracker`], [`IdleTimer`]        |
//! | **Errors**        | Typed errors for invariants and service failures.       | [`SupervisorError`], [`ServiceError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use idlevisor::{
//!     CompilationResult, CompileRequest, CompileService, Config, IdleSupervisor,
//!     ServiceError, ShutdownFn, SysInfo,
//! };
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl CompileService for Echo {
//!     async fn sys_info(&self) -> Result<SysInfo, ServiceError> {
//!         Ok(SysInfo::new(4, 1 << 30))
//!     }
//!     async fn compile(&self, _req: CompileRequest) -> Result<CompilationResult, ServiceError> {
//!         Ok(CompilationResult::new(0))
//!     }
//!     async fn shutdown(&self) -> Result<(), ServiceError> {
//!         Ok(())
//!     }
//!     async fn server_settings(&self) -> Result<String, ServiceError> {
//!         Ok("defaults".into())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), ServiceError> {
//!     let mut cfg = Config::default();
//!     cfg.idle_timeout = Duration::from_secs(30);
//!
//!     let target = ShutdownFn::arc(|reason: String| async move {
//!         println!("terminating: {reason}");
//!     });
//!
//!     let sup = IdleSupervisor::new(Arc::new(Echo), target, cfg, Vec::new());
//!
//!     let result = sup.compile(CompileRequest::default()).await?;
//!     assert!(result.is_success());
//!
//!     // Explicit shutdown disarms the idle timer and forwards to Echo.
//!     sup.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod service;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use crate::core::{CallTracker, IdleSupervisor, IdleTimer, TimerHandle};
pub use error::{ServiceError, SupervisorError};
pub use events::{Bus, Event, EventKind};
pub use service::{
    CompilationResult, CompileRequest, CompileService, ServiceRef, ShutdownFn, ShutdownTarget,
    SourceUri, SysInfo, TargetRef,
};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
