//! # Fan-out container for subscribers.
//!
//! [`SubscriberSet`] holds the subscribers registered at supervisor
//! construction and delivers each event to all of them, in registration
//! order.

use std::sync::Arc;

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Ordered collection of subscribers sharing one event stream.
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a set from the given subscribers.
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subs }
    }

    /// Delivers one event to every subscriber, in registration order.
    pub async fn emit(&self, ev: &Event) {
        for sub in &self.subs {
            sub.on_event(ev).await;
        }
    }
}
