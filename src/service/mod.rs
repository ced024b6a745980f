//! Service boundary: the wrapped capability set and its collaborators.
//!
//! This module defines everything the supervisor needs to know about the
//! component it wraps:
//! - [`CompileService`]: the abstract capability set shared by the delegate
//!   and the decorator;
//! - [`ShutdownTarget`] / [`ShutdownFn`]: the collaborator invoked when the
//!   idle timeout elapses;
//! - request/response value types ([`CompileRequest`], [`CompilationResult`],
//!   [`SysInfo`]).

mod service;
mod target;
mod types;

pub use service::{CompileService, ServiceRef};
pub use target::{ShutdownFn, ShutdownTarget, TargetRef};
pub use types::{CompilationResult, CompileRequest, SourceUri, SysInfo};
