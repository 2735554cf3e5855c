//! In-process fan-out of state-change events to tracing spans, per
//! SPEC_FULL.md §4.10.
//!
//! Grounded on the teacher's `services::event_bus::EventBus` (a subscriber
//! list behind a lock, dispatch wrapped in a bounded timeout so one slow
//! handler can't stall a mutation) — generalized to a plain `RwLock` over a
//! `Vec` rather than a lock-free structure, matching the spec's note that
//! low churn doesn't justify `arc-swap`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::models::OrchestrationEvent;

const HANDLER_TIMEOUT: Duration = Duration::from_millis(500);

pub type Handler = Arc<dyn Fn(&OrchestrationEvent) + Send + Sync>;

#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<RwLock<Vec<Handler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, handler: Handler) {
        self.handlers.write().await.push(handler);
    }

    /// Fan out to every subscriber and emit a `tracing` event regardless of
    /// whether any subscriber is registered. Each handler invocation is
    /// bounded so a misbehaving subscriber can't stall the caller.
    pub async fn publish(&self, event: OrchestrationEvent) {
        info!(
            swarm_id = %event.swarm_id,
            task_id = ?event.task_id,
            event_type = event.event_type.as_str(),
            "orchestration event"
        );

        let handlers = self.handlers.read().await;
        for handler in handlers.iter() {
            let handler = handler.clone();
            let event = event.clone();
            let result = tokio::time::timeout(HANDLER_TIMEOUT, async move {
                handler(&event);
            })
            .await;
            if result.is_err() {
                warn!("event bus subscriber exceeded its dispatch deadline");
            }
        }
    }
}
