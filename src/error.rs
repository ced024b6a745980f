//! Error types used by the idlevisor supervisor and the wrapped service.
//!
//! This module defines two main error enums:
//!
//! - [`SupervisorError`] — invariant violations raised by the idle-tracking
//!   machinery itself.
//! - [`ServiceError`] — failures raised by the wrapped compile service.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics. Supervisor errors indicate a concurrency bug in the
//! caller protocol and are never expected in correct operation; service
//! errors are the delegate's own failures, passed through to callers
//! unchanged.

use thiserror::Error;

/// # Invariant violations raised by the idle supervisor.
///
/// These represent programming/concurrency bugs in the pairing of call
/// tracking and timer scheduling, not recoverable runtime conditions.
/// In a correct execution neither variant is reachable.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupervisorError {
    /// A call started while idle, but no idle timer was pending to cancel.
    #[error("idle timer expected to be pending, but none was scheduled")]
    TimerNotScheduled,

    /// The last call completed, but an idle timer was already pending.
    #[error("idle timer already scheduled")]
    TimerAlreadyScheduled,
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use idlevisor::SupervisorError;
    ///
    /// assert_eq!(SupervisorError::TimerNotScheduled.as_label(), "timer_not_scheduled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::TimerNotScheduled => "timer_not_scheduled",
            SupervisorError::TimerAlreadyScheduled => "timer_already_scheduled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SupervisorError::TimerNotScheduled => {
                "call started while idle but no timer was pending".to_string()
            }
            SupervisorError::TimerAlreadyScheduled => {
                "last call completed but a timer was already pending".to_string()
            }
        }
    }
}

/// # Errors produced by the compile service capability set.
///
/// These flow through the shared [`CompileService`](crate::CompileService)
/// signatures: the delegate raises [`ServiceError::Failed`] or
/// [`ServiceError::Rejected`] and the supervisor passes them through
/// unchanged. [`ServiceError::Supervisor`] is the one addition the
/// decorator can make, surfacing an invariant breach instead of silently
/// absorbing it.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The request was accepted but execution failed.
    #[error("service request failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The service refused the request (e.g. it is shutting down).
    #[error("service rejected request: {reason}")]
    Rejected {
        /// Why the request was refused.
        reason: String,
    },

    /// The idle-tracking invariant was violated while routing the call.
    #[error("idle supervision failed: {0}")]
    Supervisor(#[from] SupervisorError),
}

impl ServiceError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use idlevisor::ServiceError;
    ///
    /// let err = ServiceError::Failed { error: "boom".into() };
    /// assert_eq!(err.as_label(), "service_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::Failed { .. } => "service_failed",
            ServiceError::Rejected { .. } => "service_rejected",
            ServiceError::Supervisor(_) => "supervisor_invariant",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ServiceError::Failed { error } => format!("failed: {error}"),
            ServiceError::Rejected { reason } => format!("rejected: {reason}"),
            ServiceError::Supervisor(inner) => inner.as_message(),
        }
    }

    /// Indicates whether the error is an idle-tracking invariant breach.
    ///
    /// Invariant breaches are programmer errors, distinct from the
    /// delegate's own recoverable failures.
    ///
    /// # Example
    /// ```
    /// use idlevisor::{ServiceError, SupervisorError};
    ///
    /// let err = ServiceError::from(SupervisorError::TimerNotScheduled);
    /// assert!(err.is_invariant());
    ///
    /// let err = ServiceError::Failed { error: "boom".into() };
    /// assert!(!err.is_invariant());
    /// ```
    pub fn is_invariant(&self) -> bool {
        matches!(self, ServiceError::Supervisor(_))
    }
}
