//! Event emission seam used by the orchestrator.

use bulkline_events::{EventBus, PlatformEvent};
use uuid::Uuid;

/// Fire-and-forget publication of run events.
///
/// Implementations must not block and must not fail the caller; an event
/// nobody is listening for is simply lost.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, kind: &str, run_id: Uuid, payload: serde_json::Value);
}

impl EventEmitter for EventBus {
    fn emit(&self, kind: &str, run_id: Uuid, payload: serde_json::Value) {
        self.publish(
            PlatformEvent::new(kind)
                .with_run(run_id)
                .with_payload(payload),
        );
    }
}
