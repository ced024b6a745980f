//! # Shutdown target abstraction and function-backed implementation.
//!
//! This module defines the [`ShutdownTarget`] trait and a convenient
//! function-backed implementation [`ShutdownFn`]. The common handle type is
//! [`TargetRef`], an `Arc<dyn ShutdownTarget>` suitable for sharing with the
//! timer task.
//!
//! The shutdown target is the collaborator invoked when the idle timeout
//! elapses. It is deliberately distinct from the delegate's own shutdown
//! path: the target typically tears down the hosting process or transport,
//! while the delegate's `shutdown()` stops the service itself.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

/// Shared handle to a shutdown target.
pub type TargetRef = Arc<dyn ShutdownTarget>;

/// # A capability invoked when the idle timeout elapses.
///
/// Implementations must tolerate being invoked while tracked calls are
/// racing in: the supervisor commits the shutdown decision before invoking
/// the target, and a call that arrives after the commit is the delegate
/// layer's concern.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use idlevisor::ShutdownTarget;
///
/// struct Exit;
///
/// #[async_trait]
/// impl ShutdownTarget for Exit {
///     async fn shutdown(&self, reason: &str) {
///         println!("terminating: {reason}");
///     }
/// }
/// ```
#[async_trait]
pub trait ShutdownTarget: Send + Sync + 'static {
    /// Shuts the hosting environment down.
    ///
    /// `reason` is a human-readable description of why (e.g. the elapsed
    /// idle duration).
    async fn shutdown(&self, reason: &str);
}

/// Function-backed shutdown target.
///
/// Wraps a closure that *creates* a new future per invocation, which avoids
/// shared mutable state in the closure itself. If shared state is needed,
/// move an `Arc<...>` into the closure explicitly.
#[derive(Debug)]
pub struct ShutdownFn<F> {
    f: F,
}

impl<F> ShutdownFn<F> {
    /// Creates a new function-backed shutdown target.
    ///
    /// Prefer [`ShutdownFn::arc`] when you immediately need a [`TargetRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the target and returns it as a shared handle.
    ///
    /// ## Example
    /// ```rust
    /// use idlevisor::{ShutdownFn, TargetRef};
    ///
    /// let target: TargetRef = ShutdownFn::arc(|reason: String| async move {
    ///     println!("terminating: {reason}");
    /// });
    /// ```
    pub fn arc(f: F) -> Arc<Self>
    where
        Self: ShutdownTarget,
    {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> ShutdownTarget for ShutdownFn<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn shutdown(&self, reason: &str) {
        (self.f)(reason.to_string()).await;
    }
}
