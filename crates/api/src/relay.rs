//! Forwards dispatch events from the event bus to WebSocket clients.
//!
//! [`EventRelay`] subscribes to the [`EventBus`](bulkline_events::EventBus)
//! and broadcasts every `send_progress`, `send_result` and `send_complete`
//! event to all connected dashboards as a flat JSON text frame:
//!
//! ```text
//! {"type": "send_progress", "run_id": "...", "current": 3, "total": 10, ...}
//! ```

use std::sync::Arc;

use axum::extract::ws::Message;
use bulkline_core::dispatch_events::is_dispatch_event;
use bulkline_events::PlatformEvent;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Relays bus events to WebSocket clients.
pub struct EventRelay {
    ws_manager: Arc<WsManager>,
}

impl EventRelay {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the relay loop.
    ///
    /// Exits when the channel is closed (every `EventBus` handle dropped).
    /// Lagging only loses the skipped events; the relay keeps going.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let Some(frame) = to_frame(&event) else {
                        continue;
                    };
                    let delivered = self.ws_manager.broadcast(Message::Text(frame.into())).await;
                    tracing::trace!(
                        event_type = %event.event_type,
                        delivered,
                        "Relayed dispatch event"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event relay lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, event relay shutting down");
                    break;
                }
            }
        }
    }
}

/// Render a dispatch event as a WebSocket text frame.
///
/// The payload's fields are lifted to the top level next to `type`. Returns
/// `None` for events that are not dispatch events.
pub fn to_frame(event: &PlatformEvent) -> Option<String> {
    if !is_dispatch_event(&event.event_type) {
        return None;
    }

    let mut frame = serde_json::Map::new();
    frame.insert("type".into(), Value::String(event.event_type.clone()));
    if let Value::Object(fields) = &event.payload {
        for (key, value) in fields {
            frame.insert(key.clone(), value.clone());
        }
    }

    Some(Value::Object(frame).to_string())
}
