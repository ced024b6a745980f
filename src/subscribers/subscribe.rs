//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers
//! into the supervisor. Subscribers are driven by the supervisor's listener
//! task, which forwards every bus event to each subscriber in turn.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from the supervisor's listener task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits);
/// a slow subscriber delays delivery to the subscribers after it, not the
/// publishers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
