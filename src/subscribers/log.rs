//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [call-started] outstanding=1
//! [call-completed] outstanding=0
//! [timer-scheduled] delay=60s
//! [timer-canceled]
//! [timeout-expired] reason="server has been idle for 60 seconds"
//! [shutdown-requested]
//! [invariant-breached] reason="idle timer already scheduled"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::CallStarted => {
                println!("[call-started] outstanding={:?}", e.outstanding);
            }
            EventKind::CallCompleted => {
                println!("[call-completed] outstanding={:?}", e.outstanding);
            }
            EventKind::TimerScheduled => {
                println!("[timer-scheduled] delay={:?}", e.delay);
            }
            EventKind::TimerCanceled => {
                println!("[timer-canceled]");
            }
            EventKind::TimeoutExpired => {
                println!("[timeout-expired] reason={:?}", e.reason);
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::InvariantBreached => {
                println!("[invariant-breached] reason={:?}", e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
