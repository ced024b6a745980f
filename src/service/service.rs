//! # The compile service capability set.
//!
//! [`CompileService`] is the abstract surface shared by the real service and
//! any decorator placed in front of it. Holding the capability set as an
//! explicit trait object (rather than leaning on inheritance) is what lets
//! [`IdleSupervisor`](crate::IdleSupervisor) wrap a delegate and expose the
//! identical surface to callers.
//!
//! The common handle type is [`ServiceRef`], an `Arc<dyn CompileService>`
//! suitable for sharing across tasks.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::service::types::{CompilationResult, CompileRequest, SysInfo};

/// Shared handle to a compile service implementation.
pub type ServiceRef = Arc<dyn CompileService>;

/// # The capability set of a long-lived compile service.
///
/// Implemented by the real service (the delegate) and by decorators such as
/// [`IdleSupervisor`](crate::IdleSupervisor). All methods are safely
/// callable under concurrency.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use idlevisor::{
///     CompilationResult, CompileRequest, CompileService, ServiceError, SysInfo,
/// };
///
/// struct Echo;
///
/// #[async_trait]
/// impl CompileService for Echo {
///     async fn sys_info(&self) -> Result<SysInfo, ServiceError> {
///         Ok(SysInfo::new(1, 0))
///     }
///
///     async fn compile(&self, _req: CompileRequest) -> Result<CompilationResult, ServiceError> {
///         Ok(CompilationResult::new(0))
///     }
///
///     async fn shutdown(&self) -> Result<(), ServiceError> {
///         Ok(())
///     }
///
///     async fn server_settings(&self) -> Result<String, ServiceError> {
///         Ok("defaults".into())
///     }
/// }
/// ```
#[async_trait]
pub trait CompileService: Send + Sync + 'static {
    /// Reports static facts about the host the service runs on.
    async fn sys_info(&self) -> Result<SysInfo, ServiceError>;

    /// Performs one compilation round trip.
    async fn compile(&self, req: CompileRequest) -> Result<CompilationResult, ServiceError>;

    /// Stops the service. Does not wait for outstanding work.
    async fn shutdown(&self) -> Result<(), ServiceError>;

    /// Returns the settings string the server was started with.
    ///
    /// This is a metadata query: decorators are expected to forward it
    /// without treating it as service activity.
    async fn server_settings(&self) -> Result<String, ServiceError>;
}
